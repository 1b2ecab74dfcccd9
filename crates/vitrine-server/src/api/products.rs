//! Product routes: brand-scoped catalog listing, the manual sync trigger,
//! and the public click trackers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrine_core::ClickKind;
use vitrine_db::ProductRow;

use crate::middleware::AuthedUser;

use super::{map_db_error, ApiError, AppState, MessageBody};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductResponse {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    /// Vendor name; the brand the product belongs to.
    pub brand: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub product_url: String,
    pub price: PriceResponse,
    pub quick_view_clicks: i64,
    pub website_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PriceResponse {
    pub current: Decimal,
    pub original: Decimal,
    pub discount_percentage: i32,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            brand: row.vendor,
            tags: row.tags,
            image_url: row.image_url,
            product_url: row.product_url,
            price: PriceResponse {
                current: row.price_current,
                original: row.price_original,
                discount_percentage: row.discount_percentage,
            },
            quick_view_clicks: row.quick_view_clicks,
            website_clicks: row.website_clicks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub search: Option<String>,
}

/// GET /api/products — the caller's brand catalog, optionally name-searched.
pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let Some(brand) = user.brand.as_deref() else {
        return Err(ApiError::validation("Brand information not found for user"));
    };

    let rows = vitrine_db::find_by_brand(&state.pool, brand, query.search.as_deref())
        .await
        .map_err(|e| map_db_error(&state, &e, "Product not found"))?;

    Ok(Json(rows.into_iter().map(ProductResponse::from).collect()))
}

#[derive(Debug, Serialize)]
pub(super) struct SyncResponse {
    pub message: String,
    pub count: u64,
}

/// POST /api/products/sync — brand-scoped sync against the configured shop.
///
/// Aborts on the first upstream failure; items already upserted stay. The
/// operator re-runs the sync, which is idempotent per external id.
pub(super) async fn sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<SyncResponse>, ApiError> {
    let Some(brand) = user.brand.clone() else {
        return Err(ApiError::validation("Brand information not found for user"));
    };

    let Some(shopify) = state.shopify.as_ref() else {
        tracing::error!("sync requested but no Shopify credentials are configured");
        return Err(ApiError::internal("Server Error during sync"));
    };

    let client = vitrine_shopify::ShopifyClient::new(shopify).map_err(|e| {
        tracing::error!(error = %e, "failed to build sync client");
        ApiError::internal("Server Error during sync")
    })?;

    tracing::info!(brand = %brand, "starting vendor product sync");
    match vitrine_shopify::sync_products(&state.pool, &client, Some(&brand)).await {
        Ok(report) => Ok(Json(SyncResponse {
            message: "Sync complete".to_string(),
            count: report.synced,
        })),
        Err(e) => {
            tracing::error!(brand = %brand, synced = e.synced(), error = %e, "vendor sync aborted");
            if state.expose_detail() {
                Err(ApiError::internal(format!("Server Error during sync: {e}")))
            } else {
                Err(ApiError::internal("Server Error during sync"))
            }
        }
    }
}

/// PUT /api/products/{id}/click/quickview — public quick-view tracker.
pub(super) async fn track_quick_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageBody>, ApiError> {
    track_click(&state, id, ClickKind::QuickView, "Quick view click tracked").await
}

/// PUT /api/products/{id}/click/website — public outbound-click tracker.
pub(super) async fn track_website(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageBody>, ApiError> {
    track_click(&state, id, ClickKind::Website, "Website click tracked").await
}

async fn track_click(
    state: &AppState,
    id: i64,
    kind: ClickKind,
    message: &str,
) -> Result<Json<MessageBody>, ApiError> {
    vitrine_db::increment_click(&state.pool, id, kind)
        .await
        .map_err(|e| map_db_error(state, &e, "Product not found"))?;

    Ok(Json(MessageBody {
        message: message.to_string(),
    }))
}
