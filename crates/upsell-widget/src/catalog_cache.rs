//! Fetch-once catalog cache.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use upsell_commerce::Product;
use upsell_data::FetchError;

use crate::error::WidgetError;

/// Lifecycle of the session's single catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FetchState {
    /// Session not started yet.
    #[default]
    Idle,
    /// Fetch in flight.
    Loading,
    /// Catalog cached for the rest of the session.
    Ready,
    /// Fetch failed; treated as an empty catalog.
    Failed,
}

impl FetchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Ready => "ready",
            FetchState::Failed => "failed",
        }
    }

    /// Whether the fetch has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchState::Ready | FetchState::Failed)
    }
}

/// Holds the candidate products fetched at session start.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    state: FetchState,
    products: Vec<Product>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Move `Idle -> Loading`. The catalog is fetched exactly once.
    pub fn begin_fetch(&mut self) -> Result<(), WidgetError> {
        if self.state != FetchState::Idle {
            return Err(WidgetError::FetchAlreadyStarted(self.state.as_str()));
        }
        self.state = FetchState::Loading;
        Ok(())
    }

    /// Apply the fetch result.
    ///
    /// Returns `false` when no fetch was pending and the result was dropped.
    pub fn complete(&mut self, result: Result<Vec<Product>, FetchError>) -> bool {
        if self.state != FetchState::Loading {
            debug!(state = self.state.as_str(), "dropping catalog result outside of loading");
            return false;
        }

        match result {
            Ok(products) => {
                debug!(count = products.len(), "catalog cached");
                self.products = products;
                self.state = FetchState::Ready;
            }
            Err(e) => {
                warn!(error = %e, "catalog fetch failed, showing no offer");
                self.state = FetchState::Failed;
            }
        }
        true
    }

    /// Cached products. Empty unless the fetch succeeded.
    pub fn products(&self) -> &[Product] {
        match self.state {
            FetchState::Ready => &self.products,
            _ => &[],
        }
    }

    /// Whether a placeholder should be shown instead of an offer.
    pub fn is_loading(&self) -> bool {
        !self.state.is_settled()
    }
}
