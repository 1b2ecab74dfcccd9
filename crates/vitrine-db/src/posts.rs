//! Engagement Store operations over `posts` and its fact tables.
//!
//! The embedded lists of the dashboard's document model become fact tables
//! here: `post_likes` (one row per customer per post), `post_comments`, and
//! `post_linked_products` (per-(post, product) click counters). The
//! denormalized counters on `posts` are recomputed inside the same
//! transaction as every list mutation, so `likes_count == |post_likes|` and
//! `comments_count == |post_comments|` hold after every operation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use vitrine_core::{canonical_key, ClickKind, MediaType, PostStatus};

use crate::{escape_like, DbError, ProductRow};

/// Logo used for feed posts whose brand has no registered record.
pub const DEFAULT_BRAND_LOGO: &str = "assets/images/brand-logo.png";

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    /// Subject id of the authoring admin.
    pub author_id: String,
    pub brand: String,
    pub brand_key: String,
    pub media_type: String,
    pub media_urls: Vec<String>,
    pub caption: String,
    pub status: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub shares_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `post_comments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub customer_id: String,
    pub customer_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`create_post`].
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: String,
    pub brand: String,
    pub media_type: MediaType,
    pub media_urls: Vec<String>,
    pub caption: String,
    pub status: PostStatus,
    /// Catalog ids to link; duplicates are collapsed to one row.
    pub linked_product_ids: Vec<i64>,
}

/// A published post enriched for the public feed.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub post: PostRow,
    pub brand_logo_url: String,
    /// Customer ids that currently like the post, oldest first.
    pub likes: Vec<String>,
    /// Full catalog snapshots of the linked products still present in the
    /// Catalog Store; dangling links are dropped.
    pub linked_products: Vec<ProductRow>,
}

/// One page of the admin post listing.
#[derive(Debug, Clone)]
pub struct PaginatedPosts {
    pub items: Vec<PostRow>,
    pub page: i64,
    pub total_pages: i64,
}

/// Filters for [`paginated_list`]. All are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PostListFilters<'a> {
    /// Exact brand match through canonical keys.
    pub brand: Option<&'a str>,
    pub status: Option<PostStatus>,
    /// Case-insensitive substring match on the caption.
    pub keyword: Option<&'a str>,
}

const POST_COLUMNS: &str = "id, author_id, brand, brand_key, media_type, media_urls, caption, \
     status, likes_count, comments_count, shares_count, created_at, updated_at";

/// Creates a post together with its linked-product rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a foreign-key violation on
/// `post_linked_products.product_id` means a linked product id is unknown.
pub async fn create_post(pool: &PgPool, new_post: &NewPost) -> Result<PostRow, DbError> {
    let mut tx = pool.begin().await?;

    let post = sqlx::query_as::<_, PostRow>(&format!(
        "INSERT INTO posts (author_id, brand, brand_key, media_type, media_urls, caption, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(&new_post.author_id)
    .bind(&new_post.brand)
    .bind(canonical_key(&new_post.brand))
    .bind(new_post.media_type.as_str())
    .bind(&new_post.media_urls)
    .bind(&new_post.caption)
    .bind(new_post.status.as_str())
    .fetch_one(&mut *tx)
    .await?;

    for product_id in &new_post.linked_product_ids {
        sqlx::query(
            "INSERT INTO post_linked_products (post_id, product_id) \
             VALUES ($1, $2) \
             ON CONFLICT (post_id, product_id) DO NOTHING",
        )
        .bind(post.id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(post)
}

/// Fetches a single post by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_post(pool: &PgPool, post_id: i64) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
    ))
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Row shape for the feed query: a post plus its brand logo and like list.
#[derive(Debug, sqlx::FromRow)]
struct FeedPostRow {
    id: i64,
    author_id: String,
    brand: String,
    brand_key: String,
    media_type: String,
    media_urls: Vec<String>,
    caption: String,
    status: String,
    likes_count: i64,
    comments_count: i64,
    shares_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    brand_logo_url: String,
    likes: Vec<String>,
}

/// Row shape for feed linked-product resolution: the link's post id plus the
/// full product snapshot.
#[derive(Debug, sqlx::FromRow)]
struct FeedLinkedRow {
    post_id: i64,
    product_id: i64,
    external_id: String,
    name: String,
    vendor: String,
    vendor_key: String,
    tags: Vec<String>,
    image_url: String,
    product_url: String,
    price_current: Decimal,
    price_original: Decimal,
    discount_percentage: i32,
    quick_view_clicks: i64,
    website_clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Returns all published posts, newest first, enriched with the owning
/// brand's logo (default asset when the brand lookup misses) and with
/// linked products resolved to full catalog snapshots. Links whose product
/// no longer exists are silently dropped.
///
/// `keyword` restricts results to posts whose brand name or caption contains
/// the term (case-insensitive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_published(
    pool: &PgPool,
    keyword: Option<&str>,
) -> Result<Vec<FeedPost>, DbError> {
    let pattern = keyword.map(escape_like);

    let rows = sqlx::query_as::<_, FeedPostRow>(
        "SELECT po.id, po.author_id, po.brand, po.brand_key, po.media_type, po.media_urls, \
                po.caption, po.status, po.likes_count, po.comments_count, po.shares_count, \
                po.created_at, po.updated_at, \
                COALESCE(b.logo_url, $2) AS brand_logo_url, \
                ARRAY(SELECT pl.customer_id FROM post_likes pl \
                      WHERE pl.post_id = po.id ORDER BY pl.created_at) AS likes \
         FROM posts po \
         LEFT JOIN brands b ON b.vendor_key = po.brand_key AND b.is_active \
         WHERE po.status = 'published' \
           AND ($1::TEXT IS NULL \
                OR po.brand ILIKE '%' || $1 || '%' \
                OR po.caption ILIKE '%' || $1 || '%') \
         ORDER BY po.created_at DESC",
    )
    .bind(pattern)
    .bind(DEFAULT_BRAND_LOGO)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let links = sqlx::query_as::<_, FeedLinkedRow>(
        "SELECT lp.post_id, p.id AS product_id, p.external_id, p.name, p.vendor, \
                p.vendor_key, p.tags, p.image_url, p.product_url, p.price_current, \
                p.price_original, p.discount_percentage, p.quick_view_clicks, \
                p.website_clicks, p.created_at, p.updated_at \
         FROM post_linked_products lp \
         JOIN products p ON p.id = lp.product_id \
         WHERE lp.post_id = ANY($1) \
         ORDER BY lp.post_id, p.id",
    )
    .bind(&post_ids)
    .fetch_all(pool)
    .await?;

    let mut feed: Vec<FeedPost> = rows
        .into_iter()
        .map(|r| FeedPost {
            post: PostRow {
                id: r.id,
                author_id: r.author_id,
                brand: r.brand,
                brand_key: r.brand_key,
                media_type: r.media_type,
                media_urls: r.media_urls,
                caption: r.caption,
                status: r.status,
                likes_count: r.likes_count,
                comments_count: r.comments_count,
                shares_count: r.shares_count,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            brand_logo_url: r.brand_logo_url,
            likes: r.likes,
            linked_products: Vec::new(),
        })
        .collect();

    for link in links {
        if let Some(entry) = feed.iter_mut().find(|f| f.post.id == link.post_id) {
            entry.linked_products.push(ProductRow {
                id: link.product_id,
                external_id: link.external_id,
                name: link.name,
                vendor: link.vendor,
                vendor_key: link.vendor_key,
                tags: link.tags,
                image_url: link.image_url,
                product_url: link.product_url,
                price_current: link.price_current,
                price_original: link.price_original,
                discount_percentage: link.discount_percentage,
                quick_view_clicks: link.quick_view_clicks,
                website_clicks: link.website_clicks,
                created_at: link.created_at,
                updated_at: link.updated_at,
            });
        }
    }

    Ok(feed)
}

/// Toggles a customer's like on a post and recomputes the denormalized
/// count in the same transaction. Returns the new like count.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the post does not exist, or
/// [`DbError::Sqlx`] if a statement fails.
pub async fn toggle_like(
    pool: &PgPool,
    post_id: i64,
    customer_id: &str,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound);
    }

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND customer_id = $2")
        .bind(post_id)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if removed == 0 {
        sqlx::query(
            "INSERT INTO post_likes (post_id, customer_id) VALUES ($1, $2) \
             ON CONFLICT (post_id, customer_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;
    }

    let likes = sqlx::query_scalar::<_, i64>(
        "UPDATE posts \
         SET likes_count = (SELECT COUNT(*) FROM post_likes WHERE post_id = $1), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING likes_count",
    )
    .bind(post_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(likes)
}

/// Appends a comment (with a display-name snapshot) and recomputes the
/// denormalized count in the same transaction.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the post does not exist, or
/// [`DbError::Sqlx`] if a statement fails.
pub async fn add_comment(
    pool: &PgPool,
    post_id: i64,
    customer_id: &str,
    customer_name: &str,
    body: &str,
) -> Result<CommentRow, DbError> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound);
    }

    let comment = sqlx::query_as::<_, CommentRow>(
        "INSERT INTO post_comments (post_id, customer_id, customer_name, body) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, post_id, customer_id, customer_name, body, created_at",
    )
    .bind(post_id)
    .bind(customer_id)
    .bind(customer_name)
    .bind(body)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE posts \
         SET comments_count = (SELECT COUNT(*) FROM post_comments WHERE post_id = $1), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(post_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(comment)
}

/// Returns a post's comments, newest first.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the post does not exist, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn list_comments(pool: &PgPool, post_id: i64) -> Result<Vec<CommentRow>, DbError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound);
    }

    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT id, post_id, customer_id, customer_name, body, created_at \
         FROM post_comments \
         WHERE post_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Increments the share counter. Shares have no backing list; the counter
/// is monotonic. Returns the new value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the post does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn increment_share(pool: &PgPool, post_id: i64) -> Result<i64, DbError> {
    let shares = sqlx::query_scalar::<_, i64>(
        "UPDATE posts SET shares_count = shares_count + 1, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING shares_count",
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    shares.ok_or(DbError::NotFound)
}

/// Atomically increments one click counter of a post's linked-product entry.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the (post, product) link does not exist,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn increment_linked_click(
    pool: &PgPool,
    post_id: i64,
    product_id: i64,
    kind: ClickKind,
) -> Result<(), DbError> {
    let column = match kind {
        ClickKind::QuickView => "quick_view_clicks",
        ClickKind::Website => "website_clicks",
    };

    let rows_affected = sqlx::query(&format!(
        "UPDATE post_linked_products SET {column} = {column} + 1 \
         WHERE post_id = $1 AND product_id = $2"
    ))
    .bind(post_id)
    .bind(product_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Transitions a post to `published`. The transition is one-directional;
/// publishing an already-published post is a no-op.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the post does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn publish_post(pool: &PgPool, post_id: i64) -> Result<PostRow, DbError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "UPDATE posts SET status = 'published', updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Hard-deletes a post; fact-table rows cascade.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the post does not exist, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_post(pool: &PgPool, post_id: i64) -> Result<(), DbError> {
    let rows_affected = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns one page of posts, newest first, with
/// `total_pages = ceil(matches / page_size)`. `page` is 1-based and clamped
/// to at least 1.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn paginated_list(
    pool: &PgPool,
    filters: &PostListFilters<'_>,
    page: i64,
    page_size: i64,
) -> Result<PaginatedPosts, DbError> {
    let page = page.max(1);
    let brand_key = filters.brand.map(canonical_key);
    let status = filters.status.map(PostStatus::as_str);
    let pattern = filters.keyword.map(escape_like);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM posts \
         WHERE ($1::TEXT IS NULL OR brand_key = $1) \
           AND ($2::TEXT IS NULL OR status = $2) \
           AND ($3::TEXT IS NULL OR caption ILIKE '%' || $3 || '%')",
    )
    .bind(&brand_key)
    .bind(status)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts \
         WHERE ($1::TEXT IS NULL OR brand_key = $1) \
           AND ($2::TEXT IS NULL OR status = $2) \
           AND ($3::TEXT IS NULL OR caption ILIKE '%' || $3 || '%') \
         ORDER BY created_at DESC, id DESC \
         LIMIT $4 OFFSET $5"
    ))
    .bind(&brand_key)
    .bind(status)
    .bind(&pattern)
    .bind(page_size)
    .bind(page_size * (page - 1))
    .fetch_all(pool)
    .await?;

    let total_pages = if count == 0 {
        0
    } else {
        (count + page_size - 1) / page_size
    };

    Ok(PaginatedPosts {
        items,
        page,
        total_pages,
    })
}
