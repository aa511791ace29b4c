//! Storefront response decoding.

use serde::Deserialize;
use tracing::warn;
use upsell_commerce::{Currency, Price, Product, ProductImage, Variant};

use crate::error::FetchError;
use crate::query::CatalogQuery;

/// Top-level GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// `data` of the catalog query.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    pub collection: Option<CollectionNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionNode {
    pub products: Connection<ProductNode>,
}

/// A `nodes`-style connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default)]
    pub nodes: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub images: Option<Connection<ImageNode>>,
    pub variants: Option<Connection<VariantNode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantNode {
    pub id: String,
    pub title: String,
    pub price: PriceNode,
    pub image: Option<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceNode {
    pub amount: String,
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    #[serde(alias = "originalSrc")]
    pub url: String,
}

/// Decode a raw storefront response into candidate products.
///
/// Products are kept in storefront order and truncated to the query limits.
/// Every fetched variant is kept, whatever its price or currency, so that
/// ownership checks see all of a product's variant ids. Only a product with
/// no variants at all is dropped, since nothing of it could be added.
pub fn decode_catalog(
    body: serde_json::Value,
    query: &CatalogQuery,
) -> Result<Vec<Product>, FetchError> {
    let response: GraphqlResponse<CatalogData> = serde_json::from_value(body)?;

    if !response.errors.is_empty() {
        return Err(FetchError::Query(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let collection = response
        .data
        .and_then(|d| d.collection)
        .ok_or_else(|| FetchError::CollectionNotFound(query.collection_handle.clone()))?;

    let products = collection
        .products
        .nodes
        .into_iter()
        .take(query.max_products as usize)
        .filter_map(|node| convert_product(node, query.max_variants as usize))
        .collect();

    Ok(products)
}

fn convert_product(node: ProductNode, max_variants: usize) -> Option<Product> {
    let variants: Vec<Variant> = node
        .variants
        .map(|c| c.nodes)
        .unwrap_or_default()
        .into_iter()
        .take(max_variants)
        .map(|v| convert_variant(&node.id, v))
        .collect();

    if variants.is_empty() {
        warn!(product_id = %node.id, "dropping catalog product without variants");
        return None;
    }

    let images = node
        .images
        .map(|c| c.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|i| ProductImage::new(i.url))
        .collect();

    Some(Product {
        id: node.id.into(),
        title: node.title,
        description: node.description,
        images,
        variants,
    })
}

fn convert_variant(product_id: &str, node: VariantNode) -> Variant {
    let currency = node
        .price
        .currency_code
        .map(Currency::from)
        .unwrap_or_default();

    let price = Price::from_storefront(&node.price.amount, currency);
    if price.as_money().is_none() {
        warn!(
            product_id,
            variant_id = %node.id,
            amount = %node.price.amount,
            "keeping unparsed variant price as sent"
        );
    }

    Variant {
        id: node.id.into(),
        label: node.title,
        price,
        image_url: node.image.map(|i| i.url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json(id: &str, variants: serde_json::Value) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Product {id}"),
            "description": "A fine thing",
            "images": {"nodes": [{"url": format!("https://cdn.example/{id}.png")}]},
            "variants": {"nodes": variants}
        })
    }

    fn variant_json(id: &str, amount: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Variant {id}"),
            "price": {"amount": amount, "currencyCode": "USD"},
            "image": null
        })
    }

    fn response(products: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"data": {"collection": {"products": {"nodes": products}}}})
    }

    #[test]
    fn test_decode_keeps_storefront_order() {
        let body = response(vec![
            product_json("p1", json!([variant_json("v1", "10.0")])),
            product_json("p2", json!([variant_json("v2", "12.50"), variant_json("v3", "13")])),
        ]);

        let products = decode_catalog(body, &CatalogQuery::default()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id.as_str(), "p1");
        assert_eq!(
            products[1].variants[0].price.as_money().map(|m| m.amount_cents),
            Some(1250)
        );
        assert_eq!(products[1].variants[1].label, "Variant v3");
        assert_eq!(
            products[0].featured_image_url(),
            Some("https://cdn.example/p1.png")
        );
    }

    #[test]
    fn test_decode_accepts_original_src() {
        let body = response(vec![product_json(
            "p1",
            json!([{
                "id": "v1",
                "title": "Default",
                "price": {"amount": "5.00"},
                "image": {"originalSrc": "https://cdn.example/v1.png"}
            }]),
        )]);

        let products = decode_catalog(body, &CatalogQuery::default()).unwrap();
        let variant = &products[0].variants[0];
        assert_eq!(variant.image_url.as_deref(), Some("https://cdn.example/v1.png"));
        assert_eq!(variant.price.currency(), &Currency::USD);
    }

    #[test]
    fn test_decode_drops_only_products_without_variants() {
        let body = response(vec![
            product_json("empty", json!([])),
            product_json("odd", json!([variant_json("vx", "not-a-price")])),
            product_json("ok", json!([variant_json("v1", "1.00")])),
        ]);

        let products = decode_catalog(body, &CatalogQuery::default()).unwrap();
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["odd", "ok"]);
        assert_eq!(
            products[0].variants[0].price,
            Price::Raw {
                amount: "not-a-price".into(),
                currency: Currency::USD
            }
        );
    }

    #[test]
    fn test_decode_keeps_any_currency() {
        let body = response(vec![product_json(
            "p1",
            json!([{
                "id": "v1",
                "title": "Default",
                "price": {"amount": "129.0", "currencyCode": "SEK"}
            }, {
                "id": "v2",
                "title": "Large",
                "price": {"amount": "5.25", "currencyCode": "INR"}
            }]),
        )]);

        let products = decode_catalog(body, &CatalogQuery::default()).unwrap();
        assert_eq!(products.len(), 1);
        let variants = &products[0].variants;
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].price.display(), "129.00 SEK");
        assert_eq!(variants[1].price.currency(), &Currency::INR);
    }

    #[test]
    fn test_decode_applies_limits() {
        let body = response(vec![
            product_json("p1", json!([variant_json("v1", "1"), variant_json("v2", "2")])),
            product_json("p2", json!([variant_json("v3", "3")])),
        ]);

        let query = CatalogQuery::default().with_limits(1, 1);
        let products = decode_catalog(body, &query).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].variants.len(), 1);
    }

    #[test]
    fn test_decode_connection_without_nodes() {
        let body = json!({"data": {"collection": {"products": {}}}});
        assert_eq!(decode_catalog(body, &CatalogQuery::default()), Ok(Vec::new()));

        let body = response(vec![json!({"id": "p1", "title": "Bare", "variants": {}})]);
        assert_eq!(decode_catalog(body, &CatalogQuery::default()), Ok(Vec::new()));
    }

    #[test]
    fn test_decode_graphql_errors() {
        let body = json!({"data": null, "errors": [{"message": "Throttled"}]});
        assert_eq!(
            decode_catalog(body, &CatalogQuery::default()),
            Err(FetchError::Query(vec!["Throttled".to_string()]))
        );
    }

    #[test]
    fn test_decode_missing_collection() {
        let body = json!({"data": {"collection": null}});
        assert_eq!(
            decode_catalog(body, &CatalogQuery::default()),
            Err(FetchError::CollectionNotFound("Merchandise".to_string()))
        );
    }

    #[test]
    fn test_decode_malformed_body() {
        let body = json!({"data": {"collection": {"products": 42}}});
        assert!(matches!(
            decode_catalog(body, &CatalogQuery::default()),
            Err(FetchError::Deserialization(_))
        ));
    }
}
