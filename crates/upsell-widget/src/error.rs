//! Widget error types.
//!
//! None of these reach the shopper. The driver logs them and carries on.

use thiserror::Error;

/// Errors returned by session transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The catalog is fetched once per session.
    #[error("Catalog fetch already started (state: {0})")]
    FetchAlreadyStarted(&'static str),

    /// There is no eligible offer to act on.
    #[error("No offer selected")]
    NoOfferSelected,

    /// The variant does not belong to the current offer.
    #[error("Variant {0} is not part of the current offer")]
    VariantNotInOffer(String),

    /// An add-to-cart attempt is still waiting for the host.
    #[error("An add-to-cart request is already in flight")]
    SubmissionInFlight,

    /// Quantity must be at least one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The session was torn down.
    #[error("Session closed")]
    SessionClosed,
}
