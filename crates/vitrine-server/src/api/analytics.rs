//! Analytics routes: the KPI summary, the chart payloads, and per-product
//! click totals, all scoped to the caller's brand.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::AuthedUser;

use super::{map_db_error, ApiError, AppState};

const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub(super) struct WindowQuery {
    pub days: Option<i64>,
}

impl WindowQuery {
    fn days(&self) -> i64 {
        match self.days {
            Some(d) if d > 0 => d,
            _ => DEFAULT_WINDOW_DAYS,
        }
    }
}

fn require_brand(user: &AuthedUser) -> Result<&str, ApiError> {
    user.brand
        .as_deref()
        .ok_or_else(|| ApiError::validation("Brand information not found for user"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PeriodTotals {
    pub total_posts: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    /// Only present for the current period; two-decimal text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_rate: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SummaryResponse {
    pub current_period: PeriodTotals,
    pub previous_period: PeriodTotals,
}

/// GET /api/analytics/summary?days= — current window vs. the immediately
/// preceding window of equal length.
pub(super) async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let brand = require_brand(&user)?;
    let days = query.days();

    let end = Utc::now();
    let start = end - Duration::days(days);
    let prev_end = start - Duration::days(1);
    let prev_start = prev_end - Duration::days(days);

    let current = vitrine_db::window_totals(&state.pool, brand, start, end)
        .await
        .map_err(|e| map_db_error(&state, &e, "Not found"))?;
    let previous = vitrine_db::window_totals(&state.pool, brand, prev_start, prev_end)
        .await
        .map_err(|e| map_db_error(&state, &e, "Not found"))?;

    Ok(Json(SummaryResponse {
        current_period: PeriodTotals {
            total_posts: current.total_posts,
            total_likes: current.total_likes,
            total_comments: current.total_comments,
            total_shares: current.total_shares,
            engagement_rate: Some(format!("{:.2}", current.engagement_rate())),
        },
        previous_period: PeriodTotals {
            total_posts: previous.total_posts,
            total_likes: previous.total_likes,
            total_comments: previous.total_comments,
            total_shares: previous.total_shares,
            engagement_rate: None,
        },
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct TrendPointResponse {
    pub date: String,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MediaTypeCountResponse {
    pub media_type: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TopPostResponse {
    pub id: i64,
    pub caption: String,
    pub media_urls: Vec<String>,
    pub analytics: TopPostAnalytics,
}

#[derive(Debug, Serialize)]
pub(super) struct TopPostAnalytics {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChartsResponse {
    pub trend_data: Vec<TrendPointResponse>,
    pub content_type_data: Vec<MediaTypeCountResponse>,
    pub top_posts: Vec<TopPostResponse>,
}

/// GET /api/analytics/charts?days= — trend, media-type split, top posts.
pub(super) async fn charts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ChartsResponse>, ApiError> {
    let brand = require_brand(&user)?;
    let days = query.days();

    let end = Utc::now();
    let start = end - Duration::days(days);

    let trend = vitrine_db::trend_by_day(&state.pool, brand, start, end)
        .await
        .map_err(|e| map_db_error(&state, &e, "Not found"))?;
    let media = vitrine_db::media_type_counts(&state.pool, brand, start, end)
        .await
        .map_err(|e| map_db_error(&state, &e, "Not found"))?;
    let top = vitrine_db::top_posts(&state.pool, brand, start, end)
        .await
        .map_err(|e| map_db_error(&state, &e, "Not found"))?;

    Ok(Json(ChartsResponse {
        trend_data: trend
            .into_iter()
            .map(|p| TrendPointResponse {
                date: p.day,
                likes: p.likes,
                comments: p.comments,
                shares: p.shares,
            })
            .collect(),
        content_type_data: media
            .into_iter()
            .map(|m| MediaTypeCountResponse {
                media_type: m.media_type,
                count: m.count,
            })
            .collect(),
        top_posts: top
            .into_iter()
            .map(|p| TopPostResponse {
                id: p.id,
                caption: p.caption,
                media_urls: p.media_urls,
                analytics: TopPostAnalytics {
                    likes: p.likes_count,
                    comments: p.comments_count,
                    shares: p.shares_count,
                },
            })
            .collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductAnalyticsResponse {
    pub product_id: i64,
    pub name: String,
    pub image_url: String,
    pub quick_view_clicks: i64,
    pub website_clicks: i64,
}

/// GET /api/analytics/products — per-product click totals across all of
/// the brand's post links, most website clicks first.
pub(super) async fn products(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<ProductAnalyticsResponse>>, ApiError> {
    let brand = require_brand(&user)?;

    let rows = vitrine_db::product_click_totals(&state.pool, brand)
        .await
        .map_err(|e| map_db_error(&state, &e, "Not found"))?;

    Ok(Json(
        rows.into_iter()
            .map(|r| ProductAnalyticsResponse {
                product_id: r.product_id,
                name: r.name,
                image_url: r.image_url,
                quick_view_clicks: r.quick_view_clicks,
                website_clicks: r.website_clicks,
            })
            .collect(),
    ))
}
