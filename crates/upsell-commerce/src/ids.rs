//! Newtype IDs for type-safe identifiers.
//!
//! Storefront ids are opaque global ids (`gid://shopify/ProductVariant/123`).
//! Wrapping them keeps a product id from being compared against cart-line
//! merchandise ids, which only ever hold variant ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// An opaque storefront identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(SessionId);

impl SessionId {
    /// Generate a session id from the wall clock and a process-wide counter.
    ///
    /// Only used to correlate log lines of one checkout session.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        Self(format!("upsell_{:x}_{}", timestamp, counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = VariantId::new("gid://shopify/ProductVariant/1");
        assert_eq!(id.as_str(), "gid://shopify/ProductVariant/1");
    }

    #[test]
    fn test_session_id_generation() {
        let id1 = SessionId::generate();
        let id2 = SessionId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("upsell_"));
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = ProductId::new("prod-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""prod-1""#);

        let back: ProductId = serde_json::from_str(r#""prod-1""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_equality() {
        let id1 = VariantId::from("same");
        let id2 = VariantId::from("same".to_string());
        let id3 = VariantId::new("different");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }
}
