//! Product and variant types.

use crate::cart::CartLine;
use crate::ids::{ProductId, VariantId};
use crate::money::Price;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A candidate product fetched from the storefront catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Product images, first one is the featured image.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Purchasable variants, in storefront order.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Create a product with no images or variants.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            images: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an image.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(ProductImage::new(url));
        self
    }

    /// Append a variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// The first variant, used when the shopper has not picked one.
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// The featured image URL, if the product has any image.
    pub fn featured_image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }

    /// Look up one of this product's variants.
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Check whether the product offers more than one variant.
    pub fn has_multiple_variants(&self) -> bool {
        self.variants.len() > 1
    }

    /// Check whether any variant id is among the given merchandise ids.
    pub fn is_owned(&self, merchandise_ids: &HashSet<&VariantId>) -> bool {
        self.variants.iter().any(|v| merchandise_ids.contains(&v.id))
    }

    /// Check whether any variant of this product is already in the cart.
    pub fn is_in_cart(&self, lines: &[CartLine]) -> bool {
        let ids: HashSet<&VariantId> = lines.iter().map(CartLine::merchandise_id).collect();
        self.is_owned(&ids)
    }
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Globally unique variant identifier, matched against cart lines.
    pub id: VariantId,
    /// Variant title (e.g., "Large / Blue").
    pub label: String,
    /// Unit price.
    pub price: Price,
    /// Variant image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Variant {
    /// Create a variant without an image.
    pub fn new(id: impl Into<VariantId>, label: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            price: price.into(),
            image_url: None,
        }
    }

    /// Set the variant image.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// A product image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductImage {
    /// Image source URL.
    pub url: String,
}

impl ProductImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
