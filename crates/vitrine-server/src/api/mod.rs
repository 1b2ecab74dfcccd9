mod analytics;
mod brands;
mod posts;
mod products;
mod wishlist;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use vitrine_core::{Environment, ShopifyConfig};

use crate::middleware::{request_id, require_admin_auth, require_customer_auth, AuthState};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub env: Environment,
    /// Sync credentials; `None` disables the sync route and scheduler.
    pub shopify: Option<ShopifyConfig>,
}

impl AppState {
    fn expose_detail(&self) -> bool {
        self.env == Environment::Development
    }
}

/// Error body: a bare message, nothing else. Internal detail is logged,
/// and surfaced in the body only in development.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub(super) struct MessageBody {
    pub message: String,
}

/// Maps a store error: `NotFound` becomes 404 with the caller's message,
/// anything else a 500 whose detail stays in the logs outside development.
pub(super) fn map_db_error(
    state: &AppState,
    error: &vitrine_db::DbError,
    not_found_message: &str,
) -> ApiError {
    if matches!(error, vitrine_db::DbError::NotFound) {
        return ApiError::not_found(not_found_message);
    }
    tracing::error!(error = %error, "database query failed");
    if state.expose_detail() {
        ApiError::internal(format!("Server Error: {error}"))
    } else {
        ApiError::internal("Server Error")
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts/feed", get(posts::feed))
        .route("/api/posts/{id}/share", put(posts::share))
        .route("/api/posts/{id}/comments", get(posts::list_comments))
        .route(
            "/api/posts/{post_id}/products/{product_id}/quickview",
            put(posts::track_linked_quick_view),
        )
        .route(
            "/api/posts/{post_id}/products/{product_id}/website",
            put(posts::track_linked_website),
        )
        .route(
            "/api/products/{id}/click/quickview",
            put(products::track_quick_view),
        )
        .route(
            "/api/products/{id}/click/website",
            put(products::track_website),
        )
}

fn customer_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/posts/{id}/like", put(posts::like))
        .route("/api/posts/{id}/comments", post(posts::create_comment))
        .route(
            "/api/wishlist",
            get(wishlist::list).put(wishlist::toggle),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_customer_auth,
        ))
}

fn admin_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/sync", post(products::sync))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route(
            "/api/posts/{id}",
            get(posts::get_by_id).delete(posts::delete),
        )
        .route("/api/posts/{id}/publish", put(posts::publish))
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/analytics/charts", get(analytics::charts))
        .route("/api/analytics/products", get(analytics::products))
        .route("/api/brands/mine", get(brands::my_brand))
        .route(
            "/api/admin/brands",
            get(brands::list).post(brands::register),
        )
        .route("/api/admin/brands/{id}", put(brands::update))
        .route(
            "/api/admin/unregistered-vendors",
            get(brands::unregistered_vendors),
        )
        .layer(axum::middleware::from_fn_with_state(auth, require_admin_auth))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    Router::new()
        .merge(public_router())
        .merge(customer_router(auth.clone()))
        .merge(admin_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match vitrine_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use vitrine_core::{MediaType, PostStatus, PriceBlock, Role, SyncedProduct};
    use vitrine_db::NewPost;

    use crate::middleware::Claims;

    const TEST_SECRET: &str = "test-secret";

    fn test_state(pool: sqlx::PgPool) -> AppState {
        AppState {
            pool,
            env: Environment::Test,
            shopify: None,
        }
    }

    fn test_app(pool: sqlx::PgPool) -> Router {
        build_app(test_state(pool), AuthState::from_secret(TEST_SECRET))
    }

    fn token(sub: &str, brand: Option<&str>, role: Role) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            brand: brand.map(ToOwned::to_owned),
            role,
            exp: jsonwebtoken::get_current_timestamp() + 3600,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("encode token")
    }

    fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    async fn seed_post(pool: &sqlx::PgPool, brand: &str, caption: &str, status: PostStatus) -> i64 {
        vitrine_db::create_post(
            pool,
            &NewPost {
                author_id: "admin-1".to_string(),
                brand: brand.to_string(),
                media_type: MediaType::Image,
                media_urls: vec!["https://cdn.example.com/m.jpg".to_string()],
                caption: caption.to_string(),
                status,
                linked_product_ids: vec![],
            },
        )
        .await
        .expect("seed post")
        .id
    }

    async fn seed_product(pool: &sqlx::PgPool, external_id: &str, vendor: &str) -> i64 {
        vitrine_db::upsert_product(
            pool,
            &SyncedProduct {
                external_id: external_id.to_string(),
                name: format!("Product {external_id}"),
                vendor: vendor.to_string(),
                tags: vec![],
                image_url: "https://cdn.example.com/p.jpg".to_string(),
                product_url: "https://shop.example.com/p".to_string(),
                price: PriceBlock::from_raw(Some("80.00"), Some("100.00")),
            },
        )
        .await
        .expect("seed product")
    }

    // -----------------------------------------------------------------------
    // Health & auth gatekeeping
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok(pool: sqlx::PgPool) {
        let response = test_app(pool)
            .oneshot(request("GET", "/api/health", None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn admin_routes_reject_missing_token(pool: sqlx::PgPool) {
        let response = test_app(pool)
            .oneshot(request("GET", "/api/products", None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Not authorized, token failed");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn admin_routes_reject_customer_tokens(pool: sqlx::PgPool) {
        let customer = token("c1", None, Role::Customer);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/products", Some(&customer), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn customer_routes_reject_admin_tokens(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Levis", "hello", PostStatus::Published).await;
        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request(
                "PUT",
                &format!("/api/posts/{post_id}/like"),
                Some(&admin),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // -----------------------------------------------------------------------
    // Products
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn products_list_is_scoped_to_the_callers_brand(pool: sqlx::PgPool) {
        seed_product(&pool, "l1", "Levis").await;
        seed_product(&pool, "a1", "Acme").await;

        let admin = token("u1", Some("levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/products", Some(&admin), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let items = json.as_array().expect("array body");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["brand"], "Levis");
        assert_eq!(items[0]["price"]["discountPercentage"], 20);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn product_click_unknown_id_is_404(pool: sqlx::PgPool) {
        let response = test_app(pool)
            .oneshot(request("PUT", "/api/products/999999/click/quickview", None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Product not found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn product_click_increments_publicly(pool: sqlx::PgPool) {
        let id = seed_product(&pool, "l1", "Levis").await;
        let app = test_app(pool.clone());

        let response = app
            .oneshot(request(
                "PUT",
                &format!("/api/products/{id}/click/website"),
                None,
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let rows = vitrine_db::find_by_brand(&pool, "Levis", None).await.expect("find");
        assert_eq!(rows[0].website_clicks, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_route_without_configuration_is_500(pool: sqlx::PgPool) {
        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request("POST", "/api/products/sync", Some(&admin), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_post_without_media_is_400(pool: sqlx::PgPool) {
        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request(
                "POST",
                "/api/posts",
                Some(&admin),
                Some(serde_json::json!({
                    "mediaType": "image",
                    "mediaUrls": [],
                    "caption": "empty"
                })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Media URL is required");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_post_defaults_to_draft(pool: sqlx::PgPool) {
        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request(
                "POST",
                "/api/posts",
                Some(&admin),
                Some(serde_json::json!({
                    "mediaType": "image",
                    "mediaUrls": ["https://cdn.example.com/a.jpg"],
                    "caption": "first!"
                })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["status"], "draft");
        assert_eq!(json["brand"], "Levis");
        assert_eq!(json["analytics"]["likes"], 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn cross_brand_delete_is_unauthorized(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Acme", "not yours", PostStatus::Published).await;
        let levis_admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool.clone())
            .oneshot(request(
                "DELETE",
                &format!("/api/posts/{post_id}"),
                Some(&levis_admin),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Not authorized");

        // The post survives the rejected delete.
        assert!(vitrine_db::get_post(&pool, post_id).await.expect("get").is_some());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn platform_admin_deletes_any_brands_post(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Acme", "anyone's", PostStatus::Published).await;
        let platform = token("root", None, Role::PlatformAdmin);
        let response = test_app(pool.clone())
            .oneshot(request(
                "DELETE",
                &format!("/api/posts/{post_id}"),
                Some(&platform),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(vitrine_db::get_post(&pool, post_id).await.expect("get").is_none());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn publish_is_brand_scoped(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Levis", "draft", PostStatus::Draft).await;
        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool.clone())
            .oneshot(request(
                "PUT",
                &format!("/api/posts/{post_id}/publish"),
                Some(&admin),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "published");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn feed_is_public_and_filters_by_keyword(pool: sqlx::PgPool) {
        seed_post(&pool, "Levis", "summer denim", PostStatus::Published).await;
        seed_post(&pool, "Acme", "gadgets", PostStatus::Published).await;
        seed_post(&pool, "Levis", "hidden draft", PostStatus::Draft).await;

        let app = test_app(pool);
        let response = app
            .clone()
            .oneshot(request("GET", "/api/posts/feed", None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().expect("array").len(), 2);

        let response = app
            .oneshot(request("GET", "/api/posts/feed?keyword=denim", None, None))
            .await
            .expect("response");
        let json = body_json(response).await;
        let items = json.as_array().expect("array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["brand"], "Levis");
        assert_eq!(items[0]["brandLogoUrl"], vitrine_db::DEFAULT_BRAND_LOGO);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn like_toggles_and_reports_the_count(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Levis", "likeable", PostStatus::Published).await;
        let customer = token("C1", None, Role::Customer);
        let app = test_app(pool);

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/posts/{post_id}/like"),
                Some(&customer),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["likes"], 1);

        let response = app
            .oneshot(request(
                "PUT",
                &format!("/api/posts/{post_id}/like"),
                Some(&customer),
                None,
            ))
            .await
            .expect("response");
        let json = body_json(response).await;
        assert_eq!(json["likes"], 0, "second like from the same customer untoggles");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn comments_round_trip(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Levis", "discuss", PostStatus::Published).await;
        let customer = token("C1", None, Role::Customer);
        let app = test_app(pool);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/posts/{post_id}/comments"),
                Some(&customer),
                Some(serde_json::json!({"text": "love it", "name": "Ada"})),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(request(
                "GET",
                &format!("/api/posts/{post_id}/comments"),
                None,
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let comments = json["comments"].as_array().expect("comments");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["name"], "Ada");
        assert_eq!(comments[0]["text"], "love it");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn share_is_public_and_counts_up(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Levis", "viral", PostStatus::Published).await;
        let app = test_app(pool);

        let response = app
            .oneshot(request("PUT", &format!("/api/posts/{post_id}/share"), None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["shares"], 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn paginated_list_pins_brand_admins_to_their_brand(pool: sqlx::PgPool) {
        seed_post(&pool, "Levis", "mine", PostStatus::Published).await;
        seed_post(&pool, "Acme", "other", PostStatus::Published).await;

        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/posts?brand=Acme", Some(&admin), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let posts = json["posts"].as_array().expect("posts");
        assert_eq!(posts.len(), 1, "brand filter from the query is ignored for brand admins");
        assert_eq!(posts[0]["brand"], "Levis");
        assert_eq!(json["pages"], 1);
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn analytics_summary_has_both_periods(pool: sqlx::PgPool) {
        let post_id = seed_post(&pool, "Levis", "tracked", PostStatus::Published).await;
        vitrine_db::toggle_like(&pool, post_id, "C1").await.expect("like");
        vitrine_db::increment_share(&pool, post_id).await.expect("share");

        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/analytics/summary?days=30", Some(&admin), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["currentPeriod"]["totalPosts"], 1);
        assert_eq!(json["currentPeriod"]["totalLikes"], 1);
        assert_eq!(json["currentPeriod"]["totalShares"], 1);
        // (1 + 0 + 1) / 1 / 100 = 0.02, formatted to two decimals.
        assert_eq!(json["currentPeriod"]["engagementRate"], "0.02");
        assert_eq!(json["previousPeriod"]["totalPosts"], 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn analytics_products_aggregates_linked_clicks(pool: sqlx::PgPool) {
        let product_id = seed_product(&pool, "p1", "Levis").await;
        let post = vitrine_db::create_post(
            &pool,
            &NewPost {
                author_id: "u1".to_string(),
                brand: "Levis".to_string(),
                media_type: MediaType::Image,
                media_urls: vec!["https://cdn.example.com/m.jpg".to_string()],
                caption: "promo".to_string(),
                status: PostStatus::Published,
                linked_product_ids: vec![product_id],
            },
        )
        .await
        .expect("post");
        vitrine_db::increment_linked_click(&pool, post.id, product_id, vitrine_core::ClickKind::Website)
            .await
            .expect("click");

        let admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/analytics/products", Some(&admin), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["websiteClicks"], 1);
        assert_eq!(rows[0]["quickViewClicks"], 0);
    }

    // -----------------------------------------------------------------------
    // Brands & wishlist
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn brand_registration_requires_platform_role(pool: sqlx::PgPool) {
        let body = serde_json::json!({
            "name": "Levi Strauss",
            "logoUrl": "https://cdn.example.com/l.svg",
            "vendorName": "Levis"
        });

        let brand_admin = token("u1", Some("Levis"), Role::BrandAdmin);
        let response = test_app(pool.clone())
            .oneshot(request("POST", "/api/admin/brands", Some(&brand_admin), Some(body.clone())))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let platform = token("root", None, Role::PlatformAdmin);
        let response = test_app(pool)
            .oneshot(request("POST", "/api/admin/brands", Some(&platform), Some(body)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["vendorName"], "Levis");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unregistered_vendors_reports_catalog_orphans(pool: sqlx::PgPool) {
        seed_product(&pool, "l1", "Levis").await;
        seed_product(&pool, "a1", "Acme").await;
        vitrine_db::create_brand(&pool, "Levi Strauss", "https://cdn.example.com/l.svg", None, "LEVIS")
            .await
            .expect("brand");

        let platform = token("root", None, Role::PlatformAdmin);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/admin/unregistered-vendors", Some(&platform), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().expect("array"), &vec![serde_json::json!("Acme")]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn my_brand_resolves_through_the_vendor_key(pool: sqlx::PgPool) {
        vitrine_db::create_brand(&pool, "Levi Strauss", "https://cdn.example.com/l.svg", None, "Levis")
            .await
            .expect("brand");

        let admin = token("u1", Some("levis"), Role::BrandAdmin);
        let response = test_app(pool)
            .oneshot(request("GET", "/api/brands/mine", Some(&admin), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "Levi Strauss");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn wishlist_toggle_and_listing(pool: sqlx::PgPool) {
        let product_id = seed_product(&pool, "w1", "Levis").await;
        let customer = token("C1", None, Role::Customer);
        let app = test_app(pool);

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                "/api/wishlist",
                Some(&customer),
                Some(serde_json::json!({"productId": product_id})),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Added to wishlist");

        let response = app
            .oneshot(request("GET", "/api/wishlist", Some(&customer), None))
            .await
            .expect("response");
        let json = body_json(response).await;
        let items = json.as_array().expect("array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["brand"], "Levis");
    }
}
