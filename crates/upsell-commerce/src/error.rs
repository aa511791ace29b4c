//! Commerce error types.

use thiserror::Error;

/// Errors that can occur when building commerce values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Amount string could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}
