//! Caller roles carried in bearer tokens issued by the credential service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Admin scoped to a single brand; the token must also carry the brand.
    BrandAdmin,
    /// Platform operator; may act on any brand.
    PlatformAdmin,
    /// Shopper identity for likes, comments, and wishlist.
    Customer,
}

impl Role {
    /// `true` for the roles that may call brand-admin endpoints.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::BrandAdmin | Role::PlatformAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::BrandAdmin => write!(f, "brand_admin"),
            Role::PlatformAdmin => write!(f, "platform_admin"),
            Role::Customer => write!(f, "customer"),
        }
    }
}
