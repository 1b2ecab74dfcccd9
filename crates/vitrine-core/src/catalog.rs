//! Catalog value types shared between the sync client and the stores.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which product click counter an interaction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Opening the in-feed product modal.
    QuickView,
    /// Following the outbound link to the product page.
    Website,
}

/// Pricing fields derived from a vendor product's first variant.
///
/// Invariant: `discount_percentage` is `round((original - current) / original
/// * 100)` when `original > current > 0`, else `0`; always within `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBlock {
    pub current: Decimal,
    pub original: Decimal,
    pub discount_percentage: i32,
}

impl PriceBlock {
    /// Computes a price block from the raw decimal strings the vendor API
    /// returns.
    ///
    /// Unparseable or missing values become `0`; `compare_at` is the
    /// pre-discount price and is `None` when the variant is not on sale.
    /// The discount ratio is computed in floating point and rounded half
    /// away from zero, matching the dashboard's arithmetic.
    #[must_use]
    pub fn from_raw(price: Option<&str>, compare_at: Option<&str>) -> Self {
        let current = parse_amount(price);
        let original = parse_amount(compare_at);

        let discount_percentage = if original > current && current > Decimal::ZERO {
            let ratio = (original - current)
                .checked_div(original)
                .and_then(|d| d.to_f64())
                .unwrap_or(0.0);
            #[allow(clippy::cast_possible_truncation)] // bounded to 0..=100 below
            let pct = (ratio * 100.0).round() as i32;
            pct.clamp(0, 100)
        } else {
            0
        };

        Self {
            current,
            original,
            discount_percentage,
        }
    }
}

fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
        .filter(|d| *d >= Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

/// A vendor product translated into the Catalog Store's schema.
///
/// This is the full upsert payload: everything a sync pass replaces.
/// Click counters are deliberately absent — they belong to the store and
/// survive resyncs untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedProduct {
    /// Vendor-assigned identifier, unique and immutable (Shopify product gid).
    pub external_id: String,
    pub name: String,
    /// Vendor name as configured upstream; joined against registered brands
    /// through its canonical key.
    pub vendor: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub product_url: String,
    pub price: PriceBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_from_sale_price() {
        let price = PriceBlock::from_raw(Some("80.00"), Some("100.00"));
        assert_eq!(price.current, Decimal::new(8000, 2));
        assert_eq!(price.original, Decimal::new(10000, 2));
        assert_eq!(price.discount_percentage, 20);
    }

    #[test]
    fn discount_rounds_to_nearest_integer() {
        // (150 - 100) / 150 = 33.33…% → 33
        let price = PriceBlock::from_raw(Some("100.00"), Some("150.00"));
        assert_eq!(price.discount_percentage, 33);

        // (30 - 19.99) / 30 = 33.7% → 34
        let price = PriceBlock::from_raw(Some("19.99"), Some("30.00"));
        assert_eq!(price.discount_percentage, 34);
    }

    #[test]
    fn discount_rounds_half_up() {
        // (200 - 175) / 200 = 12.5% → 13
        let price = PriceBlock::from_raw(Some("175.00"), Some("200.00"));
        assert_eq!(price.discount_percentage, 13);
    }

    #[test]
    fn no_compare_at_price_means_no_discount() {
        let price = PriceBlock::from_raw(Some("25.00"), None);
        assert_eq!(price.current, Decimal::new(2500, 2));
        assert_eq!(price.original, Decimal::ZERO);
        assert_eq!(price.discount_percentage, 0);
    }

    #[test]
    fn compare_at_below_current_means_no_discount() {
        let price = PriceBlock::from_raw(Some("100.00"), Some("90.00"));
        assert_eq!(price.discount_percentage, 0);
    }

    #[test]
    fn compare_at_equal_to_current_means_no_discount() {
        let price = PriceBlock::from_raw(Some("50.00"), Some("50.00"));
        assert_eq!(price.discount_percentage, 0);
    }

    #[test]
    fn zero_current_price_means_no_discount() {
        let price = PriceBlock::from_raw(Some("0"), Some("100.00"));
        assert_eq!(price.discount_percentage, 0);
    }

    #[test]
    fn missing_price_parses_as_zero() {
        let price = PriceBlock::from_raw(None, None);
        assert_eq!(price.current, Decimal::ZERO);
        assert_eq!(price.original, Decimal::ZERO);
        assert_eq!(price.discount_percentage, 0);
    }

    #[test]
    fn garbage_price_parses_as_zero() {
        let price = PriceBlock::from_raw(Some("free!"), Some("-5.00"));
        assert_eq!(price.current, Decimal::ZERO);
        assert_eq!(price.original, Decimal::ZERO);
        assert_eq!(price.discount_percentage, 0);
    }

    #[test]
    fn synced_product_serde_roundtrip() {
        let product = SyncedProduct {
            external_id: "gid://shopify/Product/42".to_string(),
            name: "Denim Jacket".to_string(),
            vendor: "Levis".to_string(),
            tags: vec!["denim".to_string(), "outerwear".to_string()],
            image_url: "https://cdn.example.com/jacket.jpg".to_string(),
            product_url: "https://shop.example.com/products/denim-jacket".to_string(),
            price: PriceBlock::from_raw(Some("80.00"), Some("100.00")),
        };
        let json = serde_json::to_string(&product).expect("serialize");
        let decoded: SyncedProduct = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.external_id, product.external_id);
        assert_eq!(decoded.price.discount_percentage, 20);
    }
}
