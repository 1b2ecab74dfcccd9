pub mod client;
pub mod error;
pub mod sync;
pub mod types;

pub use client::ShopifyClient;
pub use error::{ShopifyError, SyncError};
pub use sync::{sync_products, SyncReport, MAX_PAGES};
pub use types::{ProductNode, ProductsPage};
