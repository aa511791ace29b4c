//! Declarative render output.
//!
//! The layout layer turns this into UI. Nothing in here is diagnostic: the
//! banner only ever carries the configured generic message.

use serde::Serialize;
use upsell_commerce::{ProductId, VariantId};

use crate::offer::OfferSelection;
use crate::ports::CurrencyFormatter;

/// What the widget shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    pub view: WidgetView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_banner: Option<String>,
}

impl RenderOutput {
    /// Output before the catalog has loaded.
    pub fn skeleton() -> Self {
        Self {
            view: WidgetView::Skeleton,
            error_banner: None,
        }
    }

    /// Output when there is nothing to offer.
    pub fn nothing() -> Self {
        Self {
            view: WidgetView::Nothing,
            error_banner: None,
        }
    }

    /// The offer card, whichever layout it uses.
    pub fn offer(&self) -> Option<&OfferCard> {
        match &self.view {
            WidgetView::OfferWithPicker(card) | WidgetView::OfferSingleVariant(card) => Some(card),
            WidgetView::Skeleton | WidgetView::Nothing => None,
        }
    }

    pub fn banner_visible(&self) -> bool {
        self.error_banner.is_some()
    }
}

/// Layout variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "offer", rename_all = "snake_case")]
pub enum WidgetView {
    /// Loading placeholder.
    Skeleton,
    /// Offer card with a variant picker.
    OfferWithPicker(OfferCard),
    /// Offer card for a single-variant product.
    OfferSingleVariant(OfferCard),
    /// Render nothing.
    Nothing,
}

impl WidgetView {
    /// Build the view for an offer.
    pub fn for_offer(
        offer: &OfferSelection<'_>,
        placeholder_image_url: &str,
        formatter: &dyn CurrencyFormatter,
        adding: bool,
    ) -> Self {
        let card = OfferCard::build(offer, placeholder_image_url, formatter, adding);
        if offer.has_variant_picker() {
            WidgetView::OfferWithPicker(card)
        } else {
            WidgetView::OfferSingleVariant(card)
        }
    }
}

/// Everything the offer card displays, all derived from one active variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferCard {
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub variant_id: VariantId,
    pub variant_label: String,
    /// Picker entries; empty for single-variant products.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantChoice>,
    /// Add button shows its loading state.
    pub adding: bool,
}

impl OfferCard {
    pub fn build(
        offer: &OfferSelection<'_>,
        placeholder_image_url: &str,
        formatter: &dyn CurrencyFormatter,
        adding: bool,
    ) -> Self {
        let active = offer.active_variant();

        let variants = if offer.has_variant_picker() {
            offer
                .product
                .variants
                .iter()
                .map(|v| VariantChoice {
                    id: v.id.clone(),
                    label: v.label.clone(),
                    selected: v.id == active.id,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            product_id: offer.product.id.clone(),
            title: offer.product.title.clone(),
            description: offer.product.description.clone(),
            image_url: offer.image_url(placeholder_image_url).to_string(),
            price: offer.price(formatter),
            variant_id: active.id.clone(),
            variant_label: active.label.clone(),
            variants,
            adding,
        }
    }
}

/// One entry of the variant picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantChoice {
    pub id: VariantId,
    pub label: String,
    pub selected: bool,
}
