//! Catalog Store operations over the `products` table.
//!
//! Products are owned by the sync pipeline: each pass replaces the payload
//! columns wholesale, keyed by the vendor-assigned `external_id`. The two
//! click counters are owned by the interaction endpoints and are never part
//! of the upsert payload, so they survive resyncs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use vitrine_core::{canonical_key, ClickKind, SyncedProduct};

use crate::{escape_like, DbError};

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    /// Vendor-assigned identifier (Shopify product gid); unique upsert key.
    pub external_id: String,
    pub name: String,
    pub vendor: String,
    pub vendor_key: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub product_url: String,
    pub price_current: Decimal,
    pub price_original: Decimal,
    pub discount_percentage: i32,
    pub quick_view_clicks: i64,
    pub website_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, external_id, name, vendor, vendor_key, tags, image_url, \
     product_url, price_current, price_original, discount_percentage, \
     quick_view_clicks, website_clicks, created_at, updated_at";

/// Upserts a product keyed by `external_id`.
///
/// Conflicts replace every payload column in place. `quick_view_clicks` and
/// `website_clicks` are not in the update list: counters accumulated between
/// syncs are preserved across resyncs.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(pool: &PgPool, product: &SyncedProduct) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (external_id, name, vendor, vendor_key, tags, image_url, product_url, \
              price_current, price_original, discount_percentage) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (external_id) DO UPDATE SET \
             name                = EXCLUDED.name, \
             vendor              = EXCLUDED.vendor, \
             vendor_key          = EXCLUDED.vendor_key, \
             tags                = EXCLUDED.tags, \
             image_url           = EXCLUDED.image_url, \
             product_url         = EXCLUDED.product_url, \
             price_current       = EXCLUDED.price_current, \
             price_original      = EXCLUDED.price_original, \
             discount_percentage = EXCLUDED.discount_percentage, \
             updated_at          = NOW() \
         RETURNING id",
    )
    .bind(&product.external_id)
    .bind(&product.name)
    .bind(&product.vendor)
    .bind(canonical_key(&product.vendor))
    .bind(&product.tags)
    .bind(&product.image_url)
    .bind(&product.product_url)
    .bind(product.price.current)
    .bind(product.price.original)
    .bind(product.price.discount_percentage)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns all products for a brand, matched on its canonical key, ordered
/// by name. `search` restricts results to names containing the term
/// (case-insensitive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_by_brand(
    pool: &PgPool,
    brand: &str,
    search: Option<&str>,
) -> Result<Vec<ProductRow>, DbError> {
    let pattern = search.map(escape_like);
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products \
         WHERE vendor_key = $1 \
           AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%') \
         ORDER BY name"
    ))
    .bind(canonical_key(brand))
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Atomically increments one of a product's click counters.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has the given id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn increment_click(
    pool: &PgPool,
    product_id: i64,
    kind: ClickKind,
) -> Result<(), DbError> {
    let column = match kind {
        ClickKind::QuickView => "quick_view_clicks",
        ClickKind::Website => "website_clicks",
    };

    let rows_affected = sqlx::query(&format!(
        "UPDATE products SET {column} = {column} + 1, updated_at = NOW() WHERE id = $1"
    ))
    .bind(product_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns every distinct vendor value currently present in the catalog,
/// ordered alphabetically. Used to surface vendors with synced products but
/// no registered brand.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn distinct_vendors(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let vendors = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT vendor FROM products ORDER BY vendor",
    )
    .fetch_all(pool)
    .await?;

    Ok(vendors)
}
