//! Storefront catalog query.

use serde::Serialize;

/// Collection handle the upsell candidates are curated in.
pub const DEFAULT_COLLECTION_HANDLE: &str = "Merchandise";

/// Storefront page size for products and variants.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// GraphQL document for the candidate catalog.
pub const CATALOG_QUERY: &str = r#"query UpsellCatalog($handle: String!, $first: Int!, $variantsFirst: Int!) {
  collection(handle: $handle) {
    products(first: $first) {
      nodes {
        id
        title
        description
        images(first: 1) {
          nodes {
            url
          }
        }
        variants(first: $variantsFirst) {
          nodes {
            id
            title
            price {
              amount
              currencyCode
            }
            image {
              url
            }
          }
        }
      }
    }
  }
}"#;

/// Parameters of one catalog fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Collection handle to read candidates from.
    pub collection_handle: String,
    /// Maximum number of products.
    pub max_products: u32,
    /// Maximum number of variants per product.
    pub max_variants: u32,
}

impl CatalogQuery {
    /// Create a query for a collection with the default page sizes.
    pub fn new(collection_handle: impl Into<String>) -> Self {
        Self {
            collection_handle: collection_handle.into(),
            max_products: DEFAULT_PAGE_SIZE,
            max_variants: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page sizes.
    pub fn with_limits(mut self, max_products: u32, max_variants: u32) -> Self {
        self.max_products = max_products;
        self.max_variants = max_variants;
        self
    }

    /// Build the GraphQL request body.
    pub fn to_request(&self) -> GraphqlRequest {
        GraphqlRequest {
            query: CATALOG_QUERY,
            variables: CatalogVariables {
                handle: self.collection_handle.clone(),
                first: self.max_products,
                variants_first: self.max_variants,
            },
        }
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION_HANDLE)
    }
}

/// A GraphQL-over-HTTP request body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: CatalogVariables,
}

/// Variables of [`CATALOG_QUERY`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVariables {
    pub handle: String,
    pub first: u32,
    pub variants_first: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_query_targets_merchandise() {
        let query = CatalogQuery::default();
        assert_eq!(query.collection_handle, "Merchandise");
        assert_eq!(query.max_products, 10);
        assert_eq!(query.max_variants, 10);
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(CatalogQuery::new("Gifts").with_limits(3, 2).to_request())
            .unwrap();
        assert_eq!(
            body["variables"],
            json!({"handle": "Gifts", "first": 3, "variantsFirst": 2})
        );
        assert!(body["query"].as_str().unwrap().contains("collection(handle: $handle)"));
    }
}
