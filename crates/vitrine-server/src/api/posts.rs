//! Post routes: the public feed, admin CRUD with brand ownership, and the
//! customer/public engagement endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_core::{ClickKind, MediaType, PostStatus, Role};
use vitrine_db::{CommentRow, FeedPost, NewPost, PostListFilters, PostRow};

use crate::middleware::{AuthedCustomer, AuthedUser};

use super::products::ProductResponse;
use super::{map_db_error, ApiError, AppState, MessageBody};

const PAGE_SIZE: i64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyticsSnapshot {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PostResponse {
    pub id: i64,
    pub author_id: String,
    pub brand: String,
    pub media_type: String,
    pub media_urls: Vec<String>,
    pub caption: String,
    pub status: String,
    pub analytics: AnalyticsSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostRow> for PostResponse {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            brand: row.brand,
            media_type: row.media_type,
            media_urls: row.media_urls,
            caption: row.caption,
            status: row.status,
            analytics: AnalyticsSnapshot {
                likes: row.likes_count,
                comments: row.comments_count,
                shares: row.shares_count,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FeedPostResponse {
    pub id: i64,
    pub brand: String,
    pub brand_logo_url: String,
    pub media_type: String,
    pub media_urls: Vec<String>,
    pub caption: String,
    pub likes: Vec<String>,
    pub linked_products: Vec<ProductResponse>,
    pub analytics: AnalyticsSnapshot,
    pub created_at: DateTime<Utc>,
}

impl From<FeedPost> for FeedPostResponse {
    fn from(feed: FeedPost) -> Self {
        Self {
            id: feed.post.id,
            brand: feed.post.brand,
            brand_logo_url: feed.brand_logo_url,
            media_type: feed.post.media_type,
            media_urls: feed.post.media_urls,
            caption: feed.post.caption,
            likes: feed.likes,
            linked_products: feed
                .linked_products
                .into_iter()
                .map(ProductResponse::from)
                .collect(),
            analytics: AnalyticsSnapshot {
                likes: feed.post.likes_count,
                comments: feed.post.comments_count,
                shares: feed.post.shares_count,
            },
            created_at: feed.post.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Public routes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct FeedQuery {
    pub keyword: Option<String>,
}

/// GET /api/posts/feed — published posts with logos and resolved products.
pub(super) async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<FeedPostResponse>>, ApiError> {
    let posts = vitrine_db::list_published(&state.pool, query.keyword.as_deref())
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(posts.into_iter().map(FeedPostResponse::from).collect()))
}

#[derive(Debug, Serialize)]
pub(super) struct ShareResponse {
    pub shares: i64,
}

/// PUT /api/posts/{id}/share — public share counter.
pub(super) async fn share(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShareResponse>, ApiError> {
    let shares = vitrine_db::increment_share(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(ShareResponse { shares }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommentResponse {
    pub id: i64,
    pub customer: String,
    pub name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentResponse {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            customer: row.customer_id,
            name: row.customer_name,
            text: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CommentsResponse {
    pub comments: Vec<CommentResponse>,
}

/// GET /api/posts/{id}/comments — newest first.
pub(super) async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let comments = vitrine_db::list_comments(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(CommentsResponse {
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

/// PUT /api/posts/{post_id}/products/{product_id}/quickview
pub(super) async fn track_linked_quick_view(
    State(state): State<AppState>,
    Path((post_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<MessageBody>, ApiError> {
    track_linked_click(&state, post_id, product_id, ClickKind::QuickView, "Quick view click tracked").await
}

/// PUT /api/posts/{post_id}/products/{product_id}/website
pub(super) async fn track_linked_website(
    State(state): State<AppState>,
    Path((post_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<MessageBody>, ApiError> {
    track_linked_click(&state, post_id, product_id, ClickKind::Website, "Website click tracked").await
}

async fn track_linked_click(
    state: &AppState,
    post_id: i64,
    product_id: i64,
    kind: ClickKind,
    message: &str,
) -> Result<Json<MessageBody>, ApiError> {
    vitrine_db::increment_linked_click(&state.pool, post_id, product_id, kind)
        .await
        .map_err(|e| map_db_error(state, &e, "Post or product link not found"))?;

    Ok(Json(MessageBody {
        message: message.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Customer routes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct LikeResponse {
    pub message: String,
    pub likes: i64,
}

/// PUT /api/posts/{id}/like — toggle the caller's like.
pub(super) async fn like(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthedCustomer>,
    Path(id): Path<i64>,
) -> Result<Json<LikeResponse>, ApiError> {
    let likes = vitrine_db::toggle_like(&state.pool, id, &customer.id)
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(LikeResponse {
        message: "Post like status updated".to_string(),
        likes,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateCommentRequest {
    pub text: String,
    /// Display name snapshot stored with the comment.
    pub name: String,
}

/// POST /api/posts/{id}/comments
pub(super) async fn create_comment(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthedCustomer>,
    Path(id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError::validation("Comment text is required"));
    }
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Comment author name is required"));
    }

    vitrine_db::add_comment(&state.pool, id, &customer.id, name, text)
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageBody {
            message: "Comment added".to_string(),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Admin routes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreatePostRequest {
    pub media_type: MediaType,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub caption: String,
    /// Defaults to draft; publishing later is one-directional.
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub linked_products: Vec<i64>,
}

/// POST /api/posts
pub(super) async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let Some(brand) = user.brand.clone() else {
        return Err(ApiError::unauthorized("Not authorized, user data missing"));
    };
    if body.media_urls.is_empty() {
        return Err(ApiError::validation("Media URL is required"));
    }

    let new_post = NewPost {
        author_id: user.id,
        brand,
        media_type: body.media_type,
        media_urls: body.media_urls,
        caption: body.caption,
        status: body.status.unwrap_or(PostStatus::Draft),
        linked_product_ids: body.linked_products,
    };

    let post = vitrine_db::create_post(&state.pool, &new_post)
        .await
        .map_err(|e| match &e {
            vitrine_db::DbError::Sqlx(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23503") =>
            {
                ApiError::validation("A linked product does not exist")
            }
            _ => map_db_error(&state, &e, "Post not found"),
        })?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// GET /api/posts/{id} — ownership-checked single post.
pub(super) async fn get_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = fetch_owned_post(&state, &user, id).await?;
    Ok(Json(PostResponse::from(post)))
}

/// PUT /api/posts/{id}/publish — draft → published; no un-publish path.
pub(super) async fn publish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    fetch_owned_post(&state, &user, id).await?;

    let post = vitrine_db::publish_post(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(PostResponse::from(post)))
}

/// DELETE /api/posts/{id}
pub(super) async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageBody>, ApiError> {
    fetch_owned_post(&state, &user, id).await?;

    vitrine_db::delete_post(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(MessageBody {
        message: "Post removed".to_string(),
    }))
}

/// Loads the post and enforces brand ownership: brand admins act only on
/// their own brand's posts, platform admins on any.
async fn fetch_owned_post(
    state: &AppState,
    user: &AuthedUser,
    post_id: i64,
) -> Result<PostRow, ApiError> {
    let post = vitrine_db::get_post(&state.pool, post_id)
        .await
        .map_err(|e| map_db_error(state, &e, "Post not found"))?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if !user.may_act_on(&post.brand) {
        return Err(ApiError::unauthorized("Not authorized"));
    }
    Ok(post)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListPostsQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub page_number: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PaginatedPostsResponse {
    pub posts: Vec<PostResponse>,
    pub page: i64,
    pub pages: i64,
}

/// GET /api/posts — paginated admin listing. Brand admins are pinned to
/// their own brand; platform admins may filter by any brand (or `all`).
pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PaginatedPostsResponse>, ApiError> {
    let brand_filter = match user.role {
        Role::BrandAdmin => user.brand.clone(),
        _ => query.brand.clone().filter(|b| b != "all"),
    };

    let status_filter = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<PostStatus>()
                .map_err(|_| ApiError::validation("status must be 'draft', 'published', or 'all'"))?,
        ),
    };

    let filters = PostListFilters {
        brand: brand_filter.as_deref(),
        status: status_filter,
        keyword: query.keyword.as_deref(),
    };

    let page = vitrine_db::paginated_list(
        &state.pool,
        &filters,
        query.page_number.unwrap_or(1),
        PAGE_SIZE,
    )
    .await
    .map_err(|e| map_db_error(&state, &e, "Post not found"))?;

    Ok(Json(PaginatedPostsResponse {
        posts: page.items.into_iter().map(PostResponse::from).collect(),
        page: page.page,
        pages: page.total_pages,
    }))
}
