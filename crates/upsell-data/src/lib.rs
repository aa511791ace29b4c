//! Catalog query layer for the checkout upsell widget.
//!
//! This crate provides:
//! - `CatalogQuery` - The storefront GraphQL query keyed by collection handle
//! - `decode_catalog` - Storefront response decoding into domain products
//! - `CatalogSource` - The fetch contract consumed by the widget
//! - `StorefrontCatalog` - A source backed by any `GraphqlTransport`
//! - `StaticCatalog` - A fixture-backed source for previews and tests

mod error;
mod query;
mod response;
mod source;

pub use error::*;
pub use query::*;
pub use response::*;
pub use source::*;
