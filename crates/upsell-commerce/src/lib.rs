//! Commerce domain types for the checkout upsell widget.
//!
//! This crate provides the data shared by the catalog query layer and the
//! offer selection core:
//!
//! - **Catalog**: Products, variants, product images
//! - **Cart**: Read-only cart lines and the cart changes the widget requests
//! - **Money**: Cents-based prices parsed from storefront decimal strings,
//!   with unparsed amounts kept verbatim
//!
//! # Example
//!
//! ```rust
//! use upsell_commerce::{CartLine, Currency, Money, Product, Variant};
//!
//! let variant = Variant::new("gid://shopify/ProductVariant/1", "Default", Money::new(1999, Currency::USD));
//! let product = Product::new("gid://shopify/Product/1", "Gift Wrap").with_variant(variant);
//!
//! let lines = vec![CartLine::new("gid://shopify/ProductVariant/1")];
//! assert!(product.is_in_cart(&lines));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;

pub use cart::{CartChange, CartChangeResult, CartLine, Merchandise};
pub use catalog::{Product, ProductImage, Variant};
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money, Price};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money, Price};

    // Catalog
    pub use crate::catalog::{Product, ProductImage, Variant};

    // Cart
    pub use crate::cart::{CartChange, CartChangeResult, CartLine, Merchandise};
}
