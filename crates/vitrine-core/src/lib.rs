use thiserror::Error;

pub mod app_config;
pub mod auth;
pub mod brands;
pub mod catalog;
mod config;
pub mod posts;

pub use app_config::{AppConfig, Environment, ShopifyConfig};
pub use auth::Role;
pub use brands::canonical_key;
pub use catalog::{ClickKind, PriceBlock, SyncedProduct};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{MediaType, PostStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
