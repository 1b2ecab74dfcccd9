//! Customer wishlist routes.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::AuthedCustomer;

use super::products::ProductResponse;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ToggleWishlistRequest {
    pub product_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct ToggleWishlistResponse {
    pub message: String,
    pub wishlist: Vec<i64>,
}

/// PUT /api/wishlist — add or remove a product.
pub(super) async fn toggle(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthedCustomer>,
    Json(body): Json<ToggleWishlistRequest>,
) -> Result<Json<ToggleWishlistResponse>, ApiError> {
    let (added, wishlist) =
        vitrine_db::toggle_wishlist(&state.pool, &customer.id, body.product_id)
            .await
            .map_err(|e| map_db_error(&state, &e, "Product not found"))?;

    let message = if added {
        "Added to wishlist"
    } else {
        "Removed from wishlist"
    };

    Ok(Json(ToggleWishlistResponse {
        message: message.to_string(),
        wishlist,
    }))
}

/// GET /api/wishlist — resolved product snapshots, oldest first.
pub(super) async fn list(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthedCustomer>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = vitrine_db::list_wishlist(&state.pool, &customer.id)
        .await
        .map_err(|e| map_db_error(&state, &e, "Product not found"))?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}
