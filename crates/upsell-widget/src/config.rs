//! Widget configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use upsell_data::{CatalogQuery, DEFAULT_COLLECTION_HANDLE, DEFAULT_PAGE_SIZE};

/// Image shown when neither the variant nor the product has one.
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://cdn.shopify.com/s/files/1/0533/2089/files/placeholder-images-image_medium.png?format=webp&v=1530129081";

/// Banner text shown after a failed add-to-cart.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "There was an issue adding this product. Please try again.";

/// How long the error banner stays up after the most recent failure.
pub const DEFAULT_FEEDBACK_TIMEOUT_MS: u64 = 3000;

/// Configuration of one upsell widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsellConfig {
    /// Collection the candidate products are read from.
    pub collection_handle: String,

    /// Fallback image URL.
    pub placeholder_image_url: String,

    /// Maximum number of candidate products fetched.
    pub max_products: u32,

    /// Maximum number of variants fetched per product.
    pub max_variants: u32,

    /// Error banner lifetime in milliseconds.
    pub feedback_timeout_ms: u64,

    /// Generic message shown on add-to-cart failure.
    pub error_message: String,

    /// Reject a second add-to-cart while one is in flight.
    pub guard_reentrant_submissions: bool,
}

impl Default for UpsellConfig {
    fn default() -> Self {
        Self {
            collection_handle: DEFAULT_COLLECTION_HANDLE.to_string(),
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            max_products: DEFAULT_PAGE_SIZE,
            max_variants: DEFAULT_PAGE_SIZE,
            feedback_timeout_ms: DEFAULT_FEEDBACK_TIMEOUT_MS,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            guard_reentrant_submissions: true,
        }
    }
}

impl UpsellConfig {
    /// Error banner lifetime.
    pub fn feedback_timeout(&self) -> Duration {
        Duration::from_millis(self.feedback_timeout_ms)
    }

    /// The catalog query for this widget.
    pub fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery::new(self.collection_handle.clone())
            .with_limits(self.max_products, self.max_variants)
    }

    /// Set the collection handle.
    pub fn with_collection(mut self, handle: impl Into<String>) -> Self {
        self.collection_handle = handle.into();
        self
    }

    /// Allow or reject concurrent add-to-cart attempts.
    pub fn with_reentrancy_guard(mut self, guard: bool) -> Self {
        self.guard_reentrant_submissions = guard;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpsellConfig::default();
        assert_eq!(config.collection_handle, "Merchandise");
        assert_eq!(config.feedback_timeout(), Duration::from_millis(3000));
        assert!(config.guard_reentrant_submissions);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: UpsellConfig = toml::from_str(
            r#"
            collection_handle = "Gifts"
            feedback_timeout_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.collection_handle, "Gifts");
        assert_eq!(config.feedback_timeout_ms, 5000);
        assert_eq!(config.max_products, 10);
        assert_eq!(config.error_message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_catalog_query_uses_limits() {
        let mut config = UpsellConfig::default().with_collection("Extras");
        config.max_products = 4;

        let query = config.catalog_query();
        assert_eq!(query.collection_handle, "Extras");
        assert_eq!(query.max_products, 4);
        assert_eq!(query.max_variants, 10);
    }
}
