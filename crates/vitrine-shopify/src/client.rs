//! HTTP client for the Shopify Admin GraphQL API.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use vitrine_core::ShopifyConfig;

use crate::error::ShopifyError;
use crate::types::{GraphQlResponse, ProductsPage};

/// The product sync query. One page per request; `$after` carries the
/// opaque cursor from the previous page's `pageInfo.endCursor`, and
/// `$query` optionally scopes the result server-side to a single vendor.
const PRODUCTS_QUERY: &str = "\
query Products($first: Int!, $after: String, $query: String) {
  products(first: $first, after: $after, query: $query) {
    pageInfo { hasNextPage endCursor }
    edges {
      node {
        id
        title
        vendor
        handle
        onlineStoreUrl
        tags
        images(first: 1) { edges { node { url } } }
        variants(first: 1) { edges { node { price compareAtPrice } } }
      }
    }
  }
}";

/// Authenticated client for a single shop's Admin GraphQL endpoint.
///
/// Handles rate limiting (429), auth rejection (401/403), and other non-2xx
/// responses as typed errors, and surfaces GraphQL-level `errors` the same
/// way as transport failures. Pagination cursors are returned to the caller,
/// which drives the page loop.
pub struct ShopifyClient {
    client: Client,
    endpoint: String,
    origin: String,
    access_token: String,
    page_size: u32,
}

impl ShopifyClient {
    /// Creates a client from the configured shop domain, credential, and
    /// API version.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let origin = shop_origin(&config.shop_domain);
        let endpoint = format!("{origin}/admin/api/{}/graphql.json", config.api_version);

        Ok(Self {
            client,
            endpoint,
            origin,
            access_token: config.access_token.clone(),
            page_size: config.page_size,
        })
    }

    /// The shop's URL origin, e.g. `"https://acme.myshopify.com"`. Used for
    /// canonical product URLs when a node has no online-store URL.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Fetches one page of products, optionally scoped server-side to a
    /// vendor.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`] — HTTP 429.
    /// - [`ShopifyError::Unauthorized`] — HTTP 401/403 (bad or expired token).
    /// - [`ShopifyError::NotFound`] — HTTP 404 (wrong shop domain or version).
    /// - [`ShopifyError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ShopifyError::Api`] — GraphQL `errors` in a 2xx response.
    /// - [`ShopifyError::Http`] / [`ShopifyError::Deserialize`] — transport
    ///   or body failures.
    pub async fn fetch_products_page(
        &self,
        cursor: Option<&str>,
        vendor_filter: Option<&str>,
    ) -> Result<ProductsPage, ShopifyError> {
        let variables = json!({
            "first": self.page_size,
            "after": cursor,
            "query": vendor_filter.map(|vendor| format!("vendor:'{vendor}'")),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": PRODUCTS_QUERY, "variables": variables }))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ShopifyError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound {
                url: self.endpoint.clone(),
            });
        }

        if !status.is_success() {
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<GraphQlResponse>(&body).map_err(|e| {
            ShopifyError::Deserialize {
                context: format!("products page from {}", self.endpoint),
                source: e,
            }
        })?;

        if !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ShopifyError::Api { message });
        }

        let connection = parsed
            .data
            .map(|d| d.products)
            .ok_or_else(|| ShopifyError::Api {
                message: "response carried neither data nor errors".to_string(),
            })?;

        Ok(ProductsPage {
            products: connection.edges.into_iter().map(|e| e.node).collect(),
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }
}

/// Resolves a configured shop domain to a URL origin. Plain domains get an
/// `https://` scheme; values that already carry a scheme are trimmed of any
/// trailing slash and used as-is (local test servers are `http://`).
fn shop_origin(shop_domain: &str) -> String {
    let trimmed = shop_domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
