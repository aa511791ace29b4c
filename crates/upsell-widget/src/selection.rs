//! Variant selection state.
//!
//! Only the chosen variant id is stored. Price, image and label are derived
//! from it at render time, so they can never belong to different variants.

use tracing::debug;
use upsell_commerce::{Product, Variant, VariantId};

use crate::error::WidgetError;

/// The shopper's explicit variant choice for the current offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelection {
    chosen: Option<VariantId>,
}

impl VariantSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored choice, if any.
    pub fn chosen_id(&self) -> Option<&VariantId> {
        self.chosen.as_ref()
    }

    /// Choose a variant of `product`.
    ///
    /// Returns `Ok(true)` when the choice changed. Single-variant products
    /// have no picker, so choosing on them is a no-op returning `Ok(false)`.
    pub fn choose(&mut self, product: &Product, variant_id: &VariantId) -> Result<bool, WidgetError> {
        if product.variant(variant_id).is_none() {
            return Err(WidgetError::VariantNotInOffer(variant_id.to_string()));
        }

        if !product.has_multiple_variants() {
            debug!(product_id = %product.id, "ignoring variant choice on single-variant offer");
            return Ok(false);
        }

        if self.chosen.as_ref() == Some(variant_id) {
            return Ok(false);
        }

        debug!(product_id = %product.id, variant_id = %variant_id, "variant chosen");
        self.chosen = Some(variant_id.clone());
        Ok(true)
    }

    /// The chosen variant, if it belongs to `product` and a picker is shown.
    pub fn resolve<'a>(&self, product: &'a Product) -> Option<&'a Variant> {
        if !product.has_multiple_variants() {
            return None;
        }
        self.chosen.as_ref().and_then(|id| product.variant(id))
    }

    /// Forget the choice, e.g. when the offer changes.
    pub fn clear(&mut self) {
        self.chosen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upsell_commerce::{Currency, Money};

    fn two_variant_product() -> Product {
        Product::new("p", "Hoodie")
            .with_variant(Variant::new("v1", "Small", Money::new(4000, Currency::USD)))
            .with_variant(
                Variant::new("v2", "Large", Money::new(4500, Currency::USD))
                    .with_image("https://cdn.example/large.png"),
            )
    }

    #[test]
    fn test_choose_and_resolve() {
        let product = two_variant_product();
        let mut selection = VariantSelection::new();
        assert!(selection.resolve(&product).is_none());

        assert_eq!(selection.choose(&product, &"v2".into()), Ok(true));
        let chosen = selection.resolve(&product).unwrap();
        assert_eq!(chosen.label, "Large");
        assert_eq!(chosen.price.as_money().map(|m| m.amount_cents), Some(4500));
        assert_eq!(chosen.image_url.as_deref(), Some("https://cdn.example/large.png"));

        assert_eq!(selection.choose(&product, &"v2".into()), Ok(false));
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let product = two_variant_product();
        let mut selection = VariantSelection::new();
        selection.choose(&product, &"v1".into()).unwrap();

        assert_eq!(
            selection.choose(&product, &"nope".into()),
            Err(WidgetError::VariantNotInOffer("nope".into()))
        );
        assert_eq!(selection.chosen_id().unwrap().as_str(), "v1");
    }

    #[test]
    fn test_single_variant_is_inert() {
        let product = Product::new("p", "Sticker")
            .with_variant(Variant::new("s1", "Default", Money::new(300, Currency::USD)));
        let mut selection = VariantSelection::new();

        assert_eq!(selection.choose(&product, &"s1".into()), Ok(false));
        assert!(selection.chosen_id().is_none());
        assert!(selection.resolve(&product).is_none());
    }

    #[test]
    fn test_choice_from_other_product_does_not_resolve() {
        let product = two_variant_product();
        let mut selection = VariantSelection::new();
        selection.choose(&product, &"v2".into()).unwrap();

        let other = Product::new("q", "Cap")
            .with_variant(Variant::new("c1", "Red", Money::new(900, Currency::USD)))
            .with_variant(Variant::new("c2", "Blue", Money::new(900, Currency::USD)));
        assert!(selection.resolve(&other).is_none());

        selection.clear();
        assert!(selection.resolve(&product).is_none());
    }
}
