use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Shop domain of the upstream Shopify store, e.g. `"acme.myshopify.com"`.
    /// Sync is unavailable when unset; the server still boots.
    pub shopify_shop_domain: Option<String>,
    /// Admin API access token for the shop. Sync is unavailable when unset.
    pub shopify_access_token: Option<String>,
    pub shopify_api_version: String,
    pub sync_page_size: u32,
    pub sync_request_timeout_secs: u64,
}

/// Everything the sync client needs to talk to the Admin API.
///
/// Produced by [`AppConfig::shopify_config`] only when both the shop domain
/// and the access token are configured.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub shop_domain: String,
    pub access_token: String,
    pub api_version: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Returns the sync client configuration, or `None` when the shop domain
    /// or access token is not configured.
    #[must_use]
    pub fn shopify_config(&self) -> Option<ShopifyConfig> {
        let shop_domain = self.shopify_shop_domain.clone()?;
        let access_token = self.shopify_access_token.clone()?;
        Some(ShopifyConfig {
            shop_domain,
            access_token,
            api_version: self.shopify_api_version.clone(),
            page_size: self.sync_page_size,
            request_timeout_secs: self.sync_request_timeout_secs,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("shopify_shop_domain", &self.shopify_shop_domain)
            .field(
                "shopify_access_token",
                &self.shopify_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("shopify_api_version", &self.shopify_api_version)
            .field("sync_page_size", &self.sync_page_size)
            .field(
                "sync_request_timeout_secs",
                &self.sync_request_timeout_secs,
            )
            .finish()
    }
}
