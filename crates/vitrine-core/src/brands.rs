//! Canonical brand-name keys.
//!
//! Brand names are free text at write time ("Levis", "LEVIS", " levis ")
//! but must match case-insensitively everywhere they are compared: product
//! vendor lookups, post ownership checks, analytics scoping. Rather than
//! pattern-matching at query time, every row stores a canonical key
//! computed at write time and all comparisons are plain equality on keys.

/// Returns the canonical key for a brand or vendor name: trimmed and
/// lowercased.
///
/// The same function is applied when writing `vendor_key`/`brand_key`
/// columns and when building query parameters, so two names compare equal
/// exactly when their keys are byte-identical.
#[must_use]
pub fn canonical_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(canonical_key("  Levis "), "levis");
        assert_eq!(canonical_key("ACME Co"), "acme co");
    }

    #[test]
    fn preserves_interior_whitespace_and_punctuation() {
        assert_eq!(canonical_key("Uncle Arnie's"), "uncle arnie's");
    }

    #[test]
    fn case_variants_share_a_key() {
        assert_eq!(canonical_key("Levis"), canonical_key("levis"));
        assert_eq!(canonical_key("LEVIS"), canonical_key("Levis"));
    }

    #[test]
    fn distinct_names_keep_distinct_keys() {
        assert_ne!(canonical_key("Levis"), canonical_key("Acme"));
    }
}
