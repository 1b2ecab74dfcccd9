//! The sync pass: sequential page loop, translate, upsert.
//!
//! Pages are fetched one at a time — one request in flight, cursors
//! consumed in order — and every item is upserted as its page streams in.
//! A failure on any page aborts the remaining pages but keeps what was
//! already written; the error carries the count so the caller can log
//! progress-so-far. Re-running is safe: the upsert is keyed by external id
//! and never touches click counters.

use sqlx::PgPool;

use crate::client::ShopifyClient;
use crate::error::SyncError;

/// Maximum number of pages before the pass is aborted. Prevents infinite
/// loops on cycling cursors.
pub const MAX_PAGES: usize = 200;

/// Outcome of a completed sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Items upserted into the Catalog Store.
    pub synced: u64,
}

/// Runs a full sync pass against the configured shop.
///
/// With `vendor_filter` set, the vendor query is scoped server-side to that
/// brand; otherwise every product in the shop is synced.
///
/// # Errors
///
/// Returns [`SyncError`] when a page fetch, the GraphQL layer, or an upsert
/// fails, or when the page cap is exceeded. Partial progress is retained in
/// all cases and reported via [`SyncError::synced`].
pub async fn sync_products(
    pool: &PgPool,
    client: &ShopifyClient,
    vendor_filter: Option<&str>,
) -> Result<SyncReport, SyncError> {
    let mut synced = 0u64;
    let mut cursor: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_PAGES {
            return Err(SyncError::PageLimit {
                synced,
                max_pages: MAX_PAGES,
            });
        }

        let page = client
            .fetch_products_page(cursor.as_deref(), vendor_filter)
            .await
            .map_err(|source| SyncError::Upstream { synced, source })?;

        let page_len = page.products.len();
        for node in page.products {
            let product = node.into_synced(client.origin());
            vitrine_db::upsert_product(pool, &product)
                .await
                .map_err(|source| SyncError::Store { synced, source })?;
            synced += 1;
        }

        tracing::debug!(
            page = page_count,
            items = page_len,
            total = synced,
            "processed vendor product page"
        );

        if !page.has_next_page {
            break;
        }
        match page.end_cursor {
            Some(next) => cursor = Some(next),
            // hasNextPage without a cursor would refetch page 1 forever.
            None => break,
        }
    }

    tracing::info!(
        synced,
        pages = page_count,
        vendor = vendor_filter.unwrap_or("<all>"),
        "vendor sync complete"
    );

    Ok(SyncReport { synced })
}
