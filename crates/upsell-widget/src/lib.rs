//! Offer selection and cart mutation core of the checkout upsell widget.
//!
//! The widget fetches a fixed catalog of candidate products once per
//! session, drops every product the shopper already has in the cart, offers
//! the first remaining one and lets the shopper add a variant of it.
//!
//! Leaf-first, the pieces are:
//! - [`CatalogCache`] - fetch-once catalog lifecycle
//! - [`filter_eligible`] - products not already in the cart
//! - [`select_offer`] - the single offer and its image/price resolution
//! - [`VariantSelection`] - the shopper's variant override
//! - [`MutationController`] - add-to-cart attempts
//! - [`ErrorSignal`] - the self-clearing error banner
//! - [`UpsellSession`] - the session state object tying them together
//! - [`SessionDriver`] - the async event loop hosts run
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use upsell_widget::prelude::*;
//!
//! let cart = InMemoryCart::new(Vec::new());
//! let (driver, handle) = SessionDriver::new(
//!     UpsellConfig::default(),
//!     Arc::new(StaticCatalog::new(products)),
//!     Arc::new(cart.clone()),
//!     Arc::new(SymbolFormatter),
//!     cart.subscribe(),
//! );
//! tokio::spawn(driver.run());
//!
//! handle.add_to_cart()?;
//! ```

pub mod catalog_cache;
pub mod config;
pub mod driver;
pub mod eligibility;
pub mod error;
pub mod feedback;
pub mod mutation;
pub mod offer;
pub mod ports;
pub mod render;
pub mod selection;
pub mod session;

pub use catalog_cache::{CatalogCache, FetchState};
pub use config::UpsellConfig;
pub use driver::{SessionCommand, SessionDriver, SessionHandle};
pub use eligibility::filter_eligible;
pub use error::WidgetError;
pub use feedback::ErrorSignal;
pub use mutation::{AttemptId, MutationController, MutationOutcome, MutationState};
pub use offer::{select_offer, OfferSelection};
pub use ports::{CartMutator, CurrencyFormatter, InMemoryCart, SymbolFormatter};
pub use render::{OfferCard, RenderOutput, VariantChoice, WidgetView};
pub use selection::VariantSelection;
pub use session::{PendingMutation, UpsellSession};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        filter_eligible, select_offer, CartMutator, CurrencyFormatter, ErrorSignal, FetchState,
        InMemoryCart, MutationState, OfferSelection, RenderOutput, SessionCommand, SessionDriver,
        SessionHandle, SymbolFormatter, UpsellConfig, UpsellSession, WidgetError, WidgetView,
    };
    pub use upsell_commerce::prelude::*;
    pub use upsell_data::{CatalogQuery, CatalogSource, FetchError, StaticCatalog};
}
