//! Eligibility filter.

use std::collections::HashSet;

use upsell_commerce::{CartLine, Product, VariantId};

/// Products the shopper does not own yet, in catalog order.
///
/// A product is ineligible as soon as any one of its variants is a cart
/// line. The filter keeps no state; call it again for every cart snapshot.
pub fn filter_eligible<'a>(catalog: &'a [Product], cart_lines: &[CartLine]) -> Vec<&'a Product> {
    let owned: HashSet<&VariantId> = cart_lines.iter().map(CartLine::merchandise_id).collect();
    catalog.iter().filter(|p| !p.is_owned(&owned)).collect()
}
