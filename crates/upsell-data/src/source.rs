//! Catalog sources.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use upsell_commerce::Product;

use crate::error::FetchError;
use crate::query::{CatalogQuery, GraphqlRequest};
use crate::response::decode_catalog;

/// Fetches the candidate products for one checkout session.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch up to `query.max_products` products of the collection.
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<Vec<Product>, FetchError>;
}

#[async_trait]
impl<S: CatalogSource + ?Sized> CatalogSource for Arc<S> {
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<Vec<Product>, FetchError> {
        (**self).fetch_products(query).await
    }
}

/// Executes GraphQL requests against the storefront API.
///
/// The HTTP client, authentication and endpoint belong to the host.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Send the request and return the raw JSON response body.
    async fn execute(&self, request: &GraphqlRequest) -> Result<serde_json::Value, FetchError>;
}

/// Catalog source backed by the storefront GraphQL API.
pub struct StorefrontCatalog<T: GraphqlTransport> {
    transport: T,
}

impl<T: GraphqlTransport> StorefrontCatalog<T> {
    /// Create a source over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: GraphqlTransport> CatalogSource for StorefrontCatalog<T> {
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<Vec<Product>, FetchError> {
        let request = query.to_request();
        debug!(handle = %query.collection_handle, "querying storefront catalog");

        let body = self.transport.execute(&request).await?;
        let products = decode_catalog(body, query)?;

        debug!(count = products.len(), "storefront catalog decoded");
        Ok(products)
    }
}

/// Catalog source serving a fixed product list.
///
/// Used by the preview tool and by tests. It can also be set up to fail.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
    failure: Option<FetchError>,
}

impl StaticCatalog {
    /// Serve the given products.
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            failure: None,
        }
    }

    /// Fail every fetch with the given error.
    pub fn failing(error: FetchError) -> Self {
        Self {
            products: Vec::new(),
            failure: Some(error),
        }
    }

    /// Build from a recorded storefront response body.
    pub fn from_storefront_json(json: &str, query: &CatalogQuery) -> Result<Self, FetchError> {
        let body: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::new(decode_catalog(body, query)?))
    }

    /// The products this source serves.
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_products(&self, query: &CatalogQuery) -> Result<Vec<Product>, FetchError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        Ok(self
            .products
            .iter()
            .take(query.max_products as usize)
            .cloned()
            .map(|mut p| {
                p.variants.truncate(query.max_variants as usize);
                p
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use upsell_commerce::{Currency, Money, Variant};

    struct RecordingTransport {
        response: serde_json::Value,
        seen: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl GraphqlTransport for RecordingTransport {
        async fn execute(&self, request: &GraphqlRequest) -> Result<serde_json::Value, FetchError> {
            self.seen
                .lock()
                .unwrap()
                .push(serde_json::to_value(request).unwrap());
            Ok(self.response.clone())
        }
    }

    struct DownTransport;

    #[async_trait]
    impl GraphqlTransport for DownTransport {
        async fn execute(&self, _request: &GraphqlRequest) -> Result<serde_json::Value, FetchError> {
            Err(FetchError::Http { status: 503 })
        }
    }

    fn product(id: &str, variants: usize) -> Product {
        (0..variants).fold(Product::new(id, id), |p, i| {
            p.with_variant(Variant::new(
                format!("{id}-v{i}"),
                "Default",
                Money::new(100, Currency::USD),
            ))
        })
    }

    #[tokio::test]
    async fn test_storefront_catalog_sends_query_and_decodes() {
        let transport = RecordingTransport {
            response: json!({"data": {"collection": {"products": {"nodes": [{
                "id": "p1",
                "title": "Tote",
                "images": {"nodes": []},
                "variants": {"nodes": [{"id": "v1", "title": "Default", "price": {"amount": "15.0"}}]}
            }]}}}}),
            seen: Mutex::new(Vec::new()),
        };
        let source = StorefrontCatalog::new(transport);

        let products = source.fetch_products(&CatalogQuery::default()).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(
            products[0].variants[0].price.as_money().map(|m| m.amount_cents),
            Some(1500)
        );

        let seen = source.transport.seen.lock().unwrap();
        assert_eq!(seen[0]["variables"]["handle"], "Merchandise");
    }

    #[tokio::test]
    async fn test_storefront_catalog_propagates_transport_errors() {
        let source = StorefrontCatalog::new(DownTransport);
        assert_eq!(
            source.fetch_products(&CatalogQuery::default()).await,
            Err(FetchError::Http { status: 503 })
        );
    }

    #[tokio::test]
    async fn test_static_catalog_applies_limits() {
        let source = StaticCatalog::new(vec![product("a", 3), product("b", 1), product("c", 1)]);
        let query = CatalogQuery::default().with_limits(2, 2);

        let products = source.fetch_products(&query).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].variants.len(), 2);
    }

    #[tokio::test]
    async fn test_static_catalog_failure() {
        let source = StaticCatalog::failing(FetchError::Transport("offline".into()));
        assert!(source.fetch_products(&CatalogQuery::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_arc_source_delegates() {
        let source: Arc<dyn CatalogSource> = Arc::new(StaticCatalog::new(vec![product("a", 1)]));
        let products = source.fetch_products(&CatalogQuery::default()).await.unwrap();
        assert_eq!(products[0].id.as_str(), "a");
    }
}
