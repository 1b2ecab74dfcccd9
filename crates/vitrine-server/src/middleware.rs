//! Request-id propagation and bearer-token authentication.
//!
//! Tokens are issued by the external credential service and verified here:
//! HS256 over a shared secret, claims carrying `{sub, brand?, role}`. The
//! server never signs tokens.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitrine_core::Role;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Claims carried by every bearer token the credential service issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id: admin user id or customer id.
    pub sub: String,
    /// Vendor name binding an admin to a brand; absent for platform admins
    /// and customers.
    #[serde(default)]
    pub brand: Option<String>,
    pub role: Role,
    /// Expiry, seconds since the epoch. Enforced during verification.
    pub exp: u64,
}

/// Verified admin identity, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    /// Vendor name the admin is scoped to; `None` for platform admins.
    pub brand: Option<String>,
    pub role: Role,
}

impl AuthedUser {
    /// `true` when the caller may act on a post owned by `brand`: platform
    /// admins act anywhere, brand admins only within their own brand.
    #[must_use]
    pub fn may_act_on(&self, brand: &str) -> bool {
        match self.role {
            Role::PlatformAdmin => true,
            Role::BrandAdmin => self
                .brand
                .as_deref()
                .is_some_and(|own| {
                    vitrine_core::canonical_key(own) == vitrine_core::canonical_key(brand)
                }),
            Role::Customer => false,
        }
    }
}

/// Verified customer identity, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthedCustomer {
    pub id: String,
}

/// Token verification settings used by the auth middlewares.
///
/// When no secret is configured in development, verification is disabled
/// and requests run as a platform admin / anonymous customer for local
/// iteration. Outside development a missing secret fails startup.
#[derive(Clone)]
pub struct AuthState {
    decoding: Option<Arc<DecodingKey>>,
}

impl AuthState {
    /// Builds auth config from `VITRINE_JWT_SECRET`.
    ///
    /// # Errors
    ///
    /// Fails when the secret is missing outside development.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        match std::env::var("VITRINE_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => Ok(Self::from_secret(&secret)),
            _ if is_development => {
                tracing::warn!(
                    "VITRINE_JWT_SECRET not set; bearer auth disabled in development environment"
                );
                Ok(Self { decoding: None })
            }
            _ => anyhow::bail!(
                "VITRINE_JWT_SECRET is required outside development; provide the credential service's shared secret"
            ),
        }
    }

    /// Builds auth config from an explicit shared secret.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding: Some(Arc::new(DecodingKey::from_secret(secret.as_bytes()))),
        }
    }

    /// `true` when token verification is active.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.decoding.is_some()
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        let decoding = self.decoding.as_ref()?;
        let validation = Validation::default();
        match jsonwebtoken::decode::<Claims>(token, decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "bearer token rejected");
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct UnauthorizedBody {
    message: &'static str,
}

fn unauthorized(message: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(UnauthorizedBody { message })).into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware admitting brand and platform admins; rejects everyone else
/// with 401. The verified identity is inserted as [`AuthedUser`].
pub async fn require_admin_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled() {
        req.extensions_mut().insert(AuthedUser {
            id: "dev-admin".to_string(),
            brand: None,
            role: Role::PlatformAdmin,
        });
        return next.run(req).await;
    }

    let Some(claims) = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|token| auth.verify(token))
    else {
        return unauthorized("Not authorized, token failed");
    };

    if !claims.role.is_admin() {
        return unauthorized("Not authorized");
    }
    if claims.role == Role::BrandAdmin && claims.brand.is_none() {
        return unauthorized("Not authorized, user data missing");
    }

    req.extensions_mut().insert(AuthedUser {
        id: claims.sub,
        brand: claims.brand,
        role: claims.role,
    });
    next.run(req).await
}

/// Middleware admitting customers; rejects everyone else with 401. The
/// verified identity is inserted as [`AuthedCustomer`].
pub async fn require_customer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled() {
        req.extensions_mut().insert(AuthedCustomer {
            id: "dev-customer".to_string(),
        });
        return next.run(req).await;
    }

    let Some(claims) = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|token| auth.verify(token))
    else {
        return unauthorized("Not authorized, token failed");
    };

    if claims.role != Role::Customer {
        return unauthorized("Not authorized");
    }

    req.extensions_mut().insert(AuthedCustomer { id: claims.sub });
    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
