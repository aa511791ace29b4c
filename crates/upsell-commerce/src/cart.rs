//! Cart lines and cart change requests.
//!
//! The host checkout owns the cart. The widget only reads line snapshots
//! and asks the host to apply changes; the wire shapes match the host's
//! `applyCartLinesChange` contract.

use crate::error::CommerceError;
use crate::ids::VariantId;
use serde::{Deserialize, Serialize};

/// The merchandise a cart line refers to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Merchandise {
    pub id: VariantId,
}

/// One entry of the shopper's current cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CartLine {
    pub merchandise: Merchandise,
}

impl CartLine {
    /// Create a cart line referencing a variant.
    pub fn new(merchandise_id: impl Into<VariantId>) -> Self {
        Self {
            merchandise: Merchandise {
                id: merchandise_id.into(),
            },
        }
    }

    /// The referenced variant id.
    pub fn merchandise_id(&self) -> &VariantId {
        &self.merchandise.id
    }
}

/// A change the widget asks the host to apply to the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartChange {
    #[serde(rename_all = "camelCase")]
    AddCartLine {
        merchandise_id: VariantId,
        quantity: u32,
    },
}

impl CartChange {
    /// Build an add-line change, rejecting a zero quantity.
    pub fn add_line(merchandise_id: VariantId, quantity: u32) -> Result<Self, CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }
        Ok(CartChange::AddCartLine {
            merchandise_id,
            quantity,
        })
    }

    /// The variant this change targets.
    pub fn merchandise_id(&self) -> &VariantId {
        match self {
            CartChange::AddCartLine { merchandise_id, .. } => merchandise_id,
        }
    }
}

/// Outcome reported by the host for a cart change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartChangeResult {
    Success,
    Error { message: String },
}

impl CartChangeResult {
    /// Build an error outcome.
    pub fn error(message: impl Into<String>) -> Self {
        CartChangeResult::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CartChangeResult::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_line_wire_shape() {
        let change = CartChange::add_line("v1".into(), 1).unwrap();
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({"type": "addCartLine", "merchandiseId": "v1", "quantity": 1})
        );
    }

    #[test]
    fn test_add_line_rejects_zero_quantity() {
        assert_eq!(
            CartChange::add_line("v1".into(), 0),
            Err(CommerceError::InvalidQuantity(0))
        );
    }

    #[test]
    fn test_change_result_wire_shape() {
        let ok: CartChangeResult = serde_json::from_value(json!({"type": "success"})).unwrap();
        assert!(ok.is_success());

        let err: CartChangeResult =
            serde_json::from_value(json!({"type": "error", "message": "boom"})).unwrap();
        assert_eq!(err, CartChangeResult::error("boom"));
    }

    #[test]
    fn test_cart_line_shape() {
        let line: CartLine = serde_json::from_value(json!({"merchandise": {"id": "v7"}})).unwrap();
        assert_eq!(line.merchandise_id().as_str(), "v7");
    }
}
