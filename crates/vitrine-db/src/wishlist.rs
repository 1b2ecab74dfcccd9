//! Customer wishlist: a (customer, product) set with toggle semantics.
//!
//! Customer ids are opaque subjects issued by the credential service; there
//! is no local customer table to join against.

use sqlx::PgPool;

use crate::{DbError, ProductRow};

/// Adds the product to the customer's wishlist, or removes it when already
/// present. Returns `(added, product_ids)` where `added` is `true` when this
/// call inserted the item, and `product_ids` is the wishlist after the
/// toggle, oldest first.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product does not exist, or
/// [`DbError::Sqlx`] if a statement fails.
pub async fn toggle_wishlist(
    pool: &PgPool,
    customer_id: &str,
    product_id: i64,
) -> Result<(bool, Vec<i64>), DbError> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound);
    }

    let removed = sqlx::query(
        "DELETE FROM wishlist_items WHERE customer_id = $1 AND product_id = $2",
    )
    .bind(customer_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let added = removed == 0;
    if added {
        sqlx::query(
            "INSERT INTO wishlist_items (customer_id, product_id) VALUES ($1, $2) \
             ON CONFLICT (customer_id, product_id) DO NOTHING",
        )
        .bind(customer_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    }

    let product_ids = sqlx::query_scalar::<_, i64>(
        "SELECT product_id FROM wishlist_items \
         WHERE customer_id = $1 \
         ORDER BY created_at, product_id",
    )
    .bind(customer_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((added, product_ids))
}

/// Returns the customer's wishlist resolved to full product snapshots,
/// oldest first. Items whose product has been removed from the catalog are
/// absent (the foreign key cascades).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_wishlist(pool: &PgPool, customer_id: &str) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT p.id, p.external_id, p.name, p.vendor, p.vendor_key, p.tags, p.image_url, \
                p.product_url, p.price_current, p.price_original, p.discount_percentage, \
                p.quick_view_clicks, p.website_clicks, p.created_at, p.updated_at \
         FROM wishlist_items w \
         JOIN products p ON p.id = w.product_id \
         WHERE w.customer_id = $1 \
         ORDER BY w.created_at, p.id",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
