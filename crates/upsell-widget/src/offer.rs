//! Offer selection and image/price resolution.

use upsell_commerce::{Product, Variant};

use crate::ports::CurrencyFormatter;

/// The product presented to the shopper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfferSelection<'a> {
    /// The offered product.
    pub product: &'a Product,
    /// The product's first variant.
    pub default_variant: &'a Variant,
    /// The shopper's explicit choice, always one of `product.variants`.
    pub chosen_variant: Option<&'a Variant>,
}

/// Pick the offer: the first eligible product, if any.
///
/// There is no ranking. Returns `None` when nothing is eligible, or when the
/// first eligible product has no variant to sell.
pub fn select_offer<'a>(eligible: &[&'a Product]) -> Option<OfferSelection<'a>> {
    let product = *eligible.first()?;
    let default_variant = product.default_variant()?;

    Some(OfferSelection {
        product,
        default_variant,
        chosen_variant: None,
    })
}

impl<'a> OfferSelection<'a> {
    /// Attach the shopper's choice.
    ///
    /// A variant of another product, or any choice on a single-variant
    /// product, is ignored.
    pub fn with_chosen(mut self, chosen: Option<&'a Variant>) -> Self {
        self.chosen_variant = chosen.filter(|v| {
            self.product.has_multiple_variants() && self.product.variant(&v.id).is_some()
        });
        self
    }

    /// The variant the card shows and the add action targets.
    pub fn active_variant(&self) -> &'a Variant {
        self.chosen_variant.unwrap_or(self.default_variant)
    }

    /// Whether a variant picker is shown.
    pub fn has_variant_picker(&self) -> bool {
        self.product.has_multiple_variants()
    }

    /// Image URL by priority: chosen variant, default variant, product, placeholder.
    pub fn image_url(&self, placeholder: &'a str) -> &'a str {
        self.chosen_variant
            .and_then(|v| v.image_url.as_deref())
            .or(self.default_variant.image_url.as_deref())
            .or(self.product.featured_image_url())
            .unwrap_or(placeholder)
    }

    /// Localized price of the active variant.
    pub fn price(&self, formatter: &dyn CurrencyFormatter) -> String {
        formatter.format_price(&self.active_variant().price)
    }
}
