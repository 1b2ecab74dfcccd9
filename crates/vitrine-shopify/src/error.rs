use thiserror::Error;

/// Errors from a single Admin API request.
#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by the Admin API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Admin API rejected the access token (status {status})")]
    Unauthorized { status: u16 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("GraphQL error: {message}")]
    Api { message: String },
}

/// Errors from a sync pass. Every variant carries the number of items
/// already upserted: partial progress is retained (the upsert is idempotent
/// per external id), and the operator re-runs the sync after a failure.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("vendor API failure after {synced} items: {source}")]
    Upstream {
        synced: u64,
        #[source]
        source: ShopifyError,
    },

    #[error("store failure after {synced} items: {source}")]
    Store {
        synced: u64,
        #[source]
        source: vitrine_db::DbError,
    },

    #[error("pagination limit reached after {synced} items: exceeded {max_pages} pages")]
    PageLimit { synced: u64, max_pages: usize },
}

impl SyncError {
    /// Items upserted before the failure.
    #[must_use]
    pub fn synced(&self) -> u64 {
        match self {
            SyncError::Upstream { synced, .. }
            | SyncError::Store { synced, .. }
            | SyncError::PageLimit { synced, .. } => *synced,
        }
    }
}
