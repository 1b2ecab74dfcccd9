//! Admin GraphQL API response types for the product sync query.
//!
//! ## Observed shape
//!
//! The Admin API wraps everything in the GraphQL envelope: `data` when the
//! query executed, `errors` when it did not (throttling, bad query, missing
//! scope). Both can technically appear together; any non-empty `errors`
//! aborts the sync.
//!
//! ### `id`
//! A gid string, e.g. `"gid://shopify/Product/6789012345678"`. Stored
//! verbatim as the external id — unique and immutable per product.
//!
//! ### `onlineStoreUrl`
//! Explicitly `null` when the product is not published to the Online Store
//! channel. The canonical URL then falls back to `{origin}/products/{handle}`.
//!
//! ### `compareAtPrice`
//! `null` when the variant is not on sale; a decimal string (e.g.
//! `"100.00"`) otherwise. `price` is always a decimal string.
//!
//! ### Connections
//! `images(first: 1)` and `variants(first: 1)` come back as edge lists with
//! zero or one entry; both default to empty for products with no image or
//! no variant.

use serde::Deserialize;
use vitrine_core::{PriceBlock, SyncedProduct};

/// Image used when a vendor product carries no image of its own.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/300x300?text=No+Image";

/// Top-level GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<ProductsData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ProductConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<ProductEdge>,
}

/// Cursor-pagination state returned with every page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Opaque cursor for the next request; `null` on an empty connection.
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductEdge {
    pub node: ProductNode,
}

/// A single product node from the sync query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    /// Product gid, e.g. `"gid://shopify/Product/123"`.
    pub id: String,
    pub title: String,
    /// Vendor name as configured in Shopify; the join key against
    /// registered brands.
    #[serde(default)]
    pub vendor: Option<String>,
    pub handle: String,
    #[serde(default)]
    pub online_store_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Connection<ImageNode>,
    #[serde(default)]
    pub variants: Connection<VariantNode>,
}

/// A GraphQL connection reduced to its edge list.
#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
pub struct ImageNode {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    /// Current price as a decimal string. Never null in practice; modeled
    /// optional for safety.
    #[serde(default)]
    pub price: Option<String>,
    /// Pre-discount price, or `null` when the variant is not on sale.
    #[serde(default)]
    pub compare_at_price: Option<String>,
}

/// One page of products plus the cursor state to fetch the next.
#[derive(Debug)]
pub struct ProductsPage {
    pub products: Vec<ProductNode>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl ProductNode {
    /// Translates the vendor node into the Catalog Store's upsert payload.
    ///
    /// `origin` is the shop's URL origin, used for the canonical product
    /// URL when the node is not published to the online store.
    #[must_use]
    pub fn into_synced(self, origin: &str) -> SyncedProduct {
        let first_variant = self.variants.edges.first().map(|e| &e.node);
        let price = PriceBlock::from_raw(
            first_variant.and_then(|v| v.price.as_deref()),
            first_variant.and_then(|v| v.compare_at_price.as_deref()),
        );

        let image_url = self
            .images
            .edges
            .first()
            .map_or_else(|| PLACEHOLDER_IMAGE_URL.to_string(), |e| e.node.url.clone());

        let product_url = self
            .online_store_url
            .unwrap_or_else(|| format!("{origin}/products/{}", self.handle));

        SyncedProduct {
            external_id: self.id,
            name: self.title,
            vendor: self.vendor.unwrap_or_default(),
            tags: self.tags,
            image_url,
            product_url,
            price,
        }
    }
}
