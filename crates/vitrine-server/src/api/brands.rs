//! Brand registry routes. Registration and updates are platform-admin
//! operations; `mine` resolves the caller's own brand record.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_core::{canonical_key, Role};
use vitrine_db::BrandRow;

use crate::middleware::AuthedUser;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BrandResponse {
    pub id: i64,
    pub name: String,
    pub logo_url: String,
    pub avatar_url: Option<String>,
    pub vendor_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BrandRow> for BrandResponse {
    fn from(row: BrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            logo_url: row.logo_url,
            avatar_url: row.avatar_url,
            vendor_name: row.vendor_name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn require_platform_admin(user: &AuthedUser) -> Result<(), ApiError> {
    if user.role == Role::PlatformAdmin {
        Ok(())
    } else {
        Err(ApiError::unauthorized("Not authorized"))
    }
}

fn map_unique_violation(state: &AppState, e: vitrine_db::DbError) -> ApiError {
    if let vitrine_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = &e {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::validation(
                "Brand with this name or vendor name already exists",
            );
        }
    }
    map_db_error(state, &e, "Brand not found")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterBrandRequest {
    pub name: String,
    pub logo_url: String,
    pub avatar_url: Option<String>,
    /// Must exactly match the vendor field in the brand's Shopify store.
    pub vendor_name: String,
}

/// POST /api/admin/brands
pub(super) async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<RegisterBrandRequest>,
) -> Result<(StatusCode, Json<BrandResponse>), ApiError> {
    require_platform_admin(&user)?;

    let name = body.name.trim();
    let vendor_name = body.vendor_name.trim();
    if name.is_empty() || vendor_name.is_empty() || body.logo_url.trim().is_empty() {
        return Err(ApiError::validation(
            "name, logoUrl, and vendorName are required",
        ));
    }

    let brand = vitrine_db::create_brand(
        &state.pool,
        name,
        body.logo_url.trim(),
        body.avatar_url.as_deref(),
        vendor_name,
    )
    .await
    .map_err(|e| map_unique_violation(&state, e))?;

    Ok((StatusCode::CREATED, Json(BrandResponse::from(brand))))
}

/// GET /api/admin/brands
pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<BrandResponse>>, ApiError> {
    require_platform_admin(&user)?;

    let brands = vitrine_db::list_brands(&state.pool)
        .await
        .map_err(|e| map_db_error(&state, &e, "Brand not found"))?;

    Ok(Json(brands.into_iter().map(BrandResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateBrandRequest {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub avatar_url: Option<String>,
    pub vendor_name: Option<String>,
}

/// PUT /api/admin/brands/{id}
pub(super) async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBrandRequest>,
) -> Result<Json<BrandResponse>, ApiError> {
    require_platform_admin(&user)?;

    let brand = vitrine_db::update_brand(
        &state.pool,
        id,
        body.name.as_deref(),
        body.logo_url.as_deref(),
        body.avatar_url.as_deref(),
        body.vendor_name.as_deref(),
    )
    .await
    .map_err(|e| map_unique_violation(&state, e))?;

    Ok(Json(BrandResponse::from(brand)))
}

/// GET /api/admin/unregistered-vendors — catalog vendors with synced
/// products but no registered brand record.
pub(super) async fn unregistered_vendors(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<String>>, ApiError> {
    require_platform_admin(&user)?;

    let vendors = vitrine_db::distinct_vendors(&state.pool)
        .await
        .map_err(|e| map_db_error(&state, &e, "Brand not found"))?;
    let brands = vitrine_db::list_brands(&state.pool)
        .await
        .map_err(|e| map_db_error(&state, &e, "Brand not found"))?;

    let registered: std::collections::HashSet<String> =
        brands.iter().map(|b| b.vendor_key.clone()).collect();

    Ok(Json(
        vendors
            .into_iter()
            .filter(|vendor| !registered.contains(&canonical_key(vendor)))
            .collect(),
    ))
}

/// GET /api/brands/mine — the caller's brand record.
pub(super) async fn my_brand(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<BrandResponse>, ApiError> {
    let Some(vendor) = user.brand.as_deref() else {
        return Err(ApiError::validation("Brand information not found for user"));
    };

    let brand = vitrine_db::get_brand_by_vendor(&state.pool, vendor)
        .await
        .map_err(|e| map_db_error(&state, &e, "Brand not found"))?
        .ok_or_else(|| ApiError::not_found("Brand details not found for this user"))?;

    Ok(Json(BrandResponse::from(brand)))
}
