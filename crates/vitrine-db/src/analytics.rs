//! Analytics Aggregator: read-only summaries over the Engagement Store.
//!
//! All queries are single-pass aggregations scoped to a brand's canonical
//! key. Window arithmetic (current vs. previous period) is the caller's
//! concern; these functions take explicit bounds.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vitrine_core::canonical_key;

use crate::DbError;

/// Engagement totals for one time window of published posts.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EngagementTotals {
    pub total_posts: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
}

impl EngagementTotals {
    /// Engagement rate over the window: `(likes + comments + shares) /
    /// posts / 100`, `0.0` when the window has no posts.
    #[must_use]
    pub fn engagement_rate(&self) -> f64 {
        if self.total_posts == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)] // counters are far below 2^52
        let engagement = (self.total_likes + self.total_comments + self.total_shares) as f64;
        #[allow(clippy::cast_precision_loss)]
        let posts = self.total_posts as f64;
        engagement / posts / 100.0
    }
}

/// One day bucket of the engagement trend chart.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendPoint {
    /// Bucket key, `YYYY-MM-DD`.
    pub day: String,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

/// Published-post count for one media type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaTypeCount {
    pub media_type: String,
    pub count: i64,
}

/// Projection of a top-performing post: caption, media, and counters only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopPostRow {
    pub id: i64,
    pub caption: String,
    pub media_urls: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub shares_count: i64,
}

/// Summed clicks for one product across all of a brand's post links.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductClickTotals {
    pub product_id: i64,
    pub name: String,
    pub image_url: String,
    pub quick_view_clicks: i64,
    pub website_clicks: i64,
}

/// Sums posts/likes/comments/shares for a brand's published posts created
/// within `[start, end]`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn window_totals(
    pool: &PgPool,
    brand: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<EngagementTotals, DbError> {
    let totals = sqlx::query_as::<_, EngagementTotals>(
        "SELECT COUNT(*) AS total_posts, \
                COALESCE(SUM(likes_count), 0)::BIGINT AS total_likes, \
                COALESCE(SUM(comments_count), 0)::BIGINT AS total_comments, \
                COALESCE(SUM(shares_count), 0)::BIGINT AS total_shares \
         FROM posts \
         WHERE brand_key = $1 \
           AND status = 'published' \
           AND created_at >= $2 AND created_at <= $3",
    )
    .bind(canonical_key(brand))
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(totals)
}

/// Day-bucketed likes/comments/shares trend for the window, ascending by
/// bucket key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn trend_by_day(
    pool: &PgPool,
    brand: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<TrendPoint>, DbError> {
    let rows = sqlx::query_as::<_, TrendPoint>(
        "SELECT to_char(created_at, 'YYYY-MM-DD') AS day, \
                COALESCE(SUM(likes_count), 0)::BIGINT AS likes, \
                COALESCE(SUM(comments_count), 0)::BIGINT AS comments, \
                COALESCE(SUM(shares_count), 0)::BIGINT AS shares \
         FROM posts \
         WHERE brand_key = $1 \
           AND status = 'published' \
           AND created_at >= $2 AND created_at <= $3 \
         GROUP BY 1 \
         ORDER BY 1",
    )
    .bind(canonical_key(brand))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Published-post counts grouped by media type for the window.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn media_type_counts(
    pool: &PgPool,
    brand: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<MediaTypeCount>, DbError> {
    let rows = sqlx::query_as::<_, MediaTypeCount>(
        "SELECT media_type, COUNT(*) AS count \
         FROM posts \
         WHERE brand_key = $1 \
           AND status = 'published' \
           AND created_at >= $2 AND created_at <= $3 \
         GROUP BY media_type \
         ORDER BY media_type",
    )
    .bind(canonical_key(brand))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The five most-liked published posts in the window, most likes first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_posts(
    pool: &PgPool,
    brand: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<TopPostRow>, DbError> {
    let rows = sqlx::query_as::<_, TopPostRow>(
        "SELECT id, caption, media_urls, likes_count, comments_count, shares_count \
         FROM posts \
         WHERE brand_key = $1 \
           AND status = 'published' \
           AND created_at >= $2 AND created_at <= $3 \
         ORDER BY likes_count DESC, id DESC \
         LIMIT 5",
    )
    .bind(canonical_key(brand))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Flattens every linked-product entry across all of a brand's posts, sums
/// both click counters per distinct product, and joins the catalog for
/// display fields. Most website clicks first. Products never linked from a
/// post are absent — this view is driven by post linkage, not the catalog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn product_click_totals(
    pool: &PgPool,
    brand: &str,
) -> Result<Vec<ProductClickTotals>, DbError> {
    let rows = sqlx::query_as::<_, ProductClickTotals>(
        "SELECT p.id AS product_id, p.name, p.image_url, \
                COALESCE(SUM(lp.quick_view_clicks), 0)::BIGINT AS quick_view_clicks, \
                COALESCE(SUM(lp.website_clicks), 0)::BIGINT AS website_clicks \
         FROM post_linked_products lp \
         JOIN posts po ON po.id = lp.post_id \
         JOIN products p ON p.id = lp.product_id \
         WHERE po.brand_key = $1 \
         GROUP BY p.id, p.name, p.image_url \
         ORDER BY website_clicks DESC, p.id",
    )
    .bind(canonical_key(brand))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_rate_zero_without_posts() {
        let totals = EngagementTotals {
            total_posts: 0,
            total_likes: 10,
            total_comments: 5,
            total_shares: 1,
        };
        assert!((totals.engagement_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn engagement_rate_formula() {
        // (40 + 8 + 2) / 10 / 100 = 0.05
        let totals = EngagementTotals {
            total_posts: 10,
            total_likes: 40,
            total_comments: 8,
            total_shares: 2,
        };
        assert!((totals.engagement_rate() - 0.05).abs() < 1e-9);
    }
}
