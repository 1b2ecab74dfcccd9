//! Brand registry operations.
//!
//! `vendor_name` is the join key against `products.vendor`: it must match
//! the vendor value configured in the brand's Shopify store. Both sides are
//! compared through their canonical keys.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vitrine_core::canonical_key;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub name: String,
    pub logo_url: String,
    /// Square variant used as the feed avatar; falls back to `logo_url`
    /// client-side when absent.
    pub avatar_url: Option<String>,
    pub vendor_name: String,
    pub vendor_key: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const BRAND_COLUMNS: &str =
    "id, name, logo_url, avatar_url, vendor_name, vendor_key, is_active, created_at, updated_at";

/// Creates a brand and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including unique
/// violations on `name`, `vendor_name`, or `vendor_key`).
pub async fn create_brand(
    pool: &PgPool,
    name: &str,
    logo_url: &str,
    avatar_url: Option<&str>,
    vendor_name: &str,
) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "INSERT INTO brands (name, logo_url, avatar_url, vendor_name, vendor_key, is_active) \
         VALUES ($1, $2, $3, $4, $5, true) \
         RETURNING {BRAND_COLUMNS}"
    ))
    .bind(name)
    .bind(logo_url)
    .bind(avatar_url)
    .bind(vendor_name)
    .bind(canonical_key(vendor_name))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all brands, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Looks up the brand whose vendor name matches `vendor` case-insensitively.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand_by_vendor(
    pool: &PgPool,
    vendor: &str,
) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE vendor_key = $1"
    ))
    .bind(canonical_key(vendor))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Updates brand metadata. `None` fields keep their current value; supplying
/// `vendor_name` recomputes the canonical key in the same statement.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand has the given id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_brand(
    pool: &PgPool,
    brand_id: i64,
    name: Option<&str>,
    logo_url: Option<&str>,
    avatar_url: Option<&str>,
    vendor_name: Option<&str>,
) -> Result<BrandRow, DbError> {
    let vendor_key = vendor_name.map(canonical_key);

    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "UPDATE brands \
         SET name        = COALESCE($2, name), \
             logo_url    = COALESCE($3, logo_url), \
             avatar_url  = COALESCE($4, avatar_url), \
             vendor_name = COALESCE($5, vendor_name), \
             vendor_key  = COALESCE($6, vendor_key), \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING {BRAND_COLUMNS}"
    ))
    .bind(brand_id)
    .bind(name)
    .bind(logo_url)
    .bind(avatar_url)
    .bind(vendor_name)
    .bind(vendor_key)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}
