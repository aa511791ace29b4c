//! Session state object.
//!
//! `UpsellSession` owns every piece of widget state for one checkout
//! session. Each field has exactly one writer, the transition method named
//! after the event it handles. Nothing here awaits; the async plumbing is
//! in [`crate::driver`].

use tokio::time::Instant;
use tracing::{debug, info};
use upsell_commerce::{CartChange, CartChangeResult, CartLine, Product, ProductId, SessionId, VariantId};
use upsell_data::{CatalogQuery, FetchError};

use crate::catalog_cache::{CatalogCache, FetchState};
use crate::config::UpsellConfig;
use crate::eligibility::filter_eligible;
use crate::error::WidgetError;
use crate::feedback::ErrorSignal;
use crate::mutation::{AttemptId, MutationController, MutationOutcome, MutationState};
use crate::offer::{select_offer, OfferSelection};
use crate::ports::CurrencyFormatter;
use crate::render::{RenderOutput, WidgetView};
use crate::selection::VariantSelection;

/// A cart change ready to be sent to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub attempt: AttemptId,
    pub change: CartChange,
}

/// All state of one upsell widget session.
#[derive(Debug, Clone)]
pub struct UpsellSession {
    id: SessionId,
    config: UpsellConfig,
    catalog: CatalogCache,
    cart_lines: Vec<CartLine>,
    offer_product: Option<ProductId>,
    selection: VariantSelection,
    mutation: MutationController,
    error_signal: ErrorSignal,
    closed: bool,
}

impl UpsellSession {
    /// Create a session with a generated id.
    pub fn new(config: UpsellConfig) -> Self {
        Self::with_id(SessionId::generate(), config)
    }

    /// Create a session with a known id.
    pub fn with_id(id: SessionId, config: UpsellConfig) -> Self {
        let mutation = MutationController::new(config.guard_reentrant_submissions);
        let error_signal = ErrorSignal::new(config.feedback_timeout());
        Self {
            id,
            config,
            catalog: CatalogCache::new(),
            cart_lines: Vec::new(),
            offer_product: None,
            selection: VariantSelection::new(),
            mutation,
            error_signal,
            closed: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn config(&self) -> &UpsellConfig {
        &self.config
    }

    pub fn fetch_state(&self) -> FetchState {
        self.catalog.state()
    }

    pub fn mutation_state(&self) -> MutationState {
        self.mutation.state()
    }

    pub fn cart_lines(&self) -> &[CartLine] {
        &self.cart_lines
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Begin the session's catalog fetch and return the query to run.
    pub fn start_fetch(&mut self) -> Result<CatalogQuery, WidgetError> {
        self.ensure_open()?;
        self.catalog.begin_fetch()?;
        debug!(handle = %self.config.collection_handle, "catalog fetch started");
        Ok(self.config.catalog_query())
    }

    /// Apply the catalog fetch result. Ignored once the session is closed.
    pub fn catalog_loaded(&mut self, result: Result<Vec<Product>, FetchError>) {
        if self.closed {
            debug!("discarding catalog result after teardown");
            return;
        }
        if self.catalog.complete(result) {
            self.refresh_offer();
        }
    }

    /// Replace the cart-line snapshot.
    pub fn cart_lines_changed(&mut self, lines: Vec<CartLine>) {
        if self.closed {
            return;
        }
        debug!(lines = lines.len(), "cart lines changed");
        self.cart_lines = lines;
        self.refresh_offer();
    }

    /// The current offer, with the shopper's variant choice applied.
    pub fn offer(&self) -> Option<OfferSelection<'_>> {
        let eligible = filter_eligible(self.catalog.products(), &self.cart_lines);
        let offer = select_offer(&eligible)?;
        Some(offer.with_chosen(self.selection.resolve(offer.product)))
    }

    /// Choose a variant of the current offer.
    pub fn choose_variant(&mut self, variant_id: &VariantId) -> Result<bool, WidgetError> {
        self.ensure_open()?;
        let eligible = filter_eligible(self.catalog.products(), &self.cart_lines);
        let offer = select_offer(&eligible).ok_or(WidgetError::NoOfferSelected)?;
        self.selection.choose(offer.product, variant_id)
    }

    /// Start adding the active variant of the current offer, quantity one.
    pub fn begin_add_to_cart(&mut self) -> Result<PendingMutation, WidgetError> {
        let variant_id = self
            .offer()
            .map(|offer| offer.active_variant().id.clone())
            .ok_or(WidgetError::NoOfferSelected)?;
        self.begin_add_variant(&variant_id, 1)
    }

    /// Start adding a specific variant of the current offer.
    pub fn begin_add_variant(
        &mut self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<PendingMutation, WidgetError> {
        self.ensure_open()?;
        let offer = self.offer().ok_or(WidgetError::NoOfferSelected)?;
        if offer.product.variant(variant_id).is_none() {
            return Err(WidgetError::VariantNotInOffer(variant_id.to_string()));
        }

        let (attempt, change) = self.mutation.begin(variant_id.clone(), quantity)?;
        Ok(PendingMutation { attempt, change })
    }

    /// Apply the host's answer to an add-to-cart attempt.
    ///
    /// A failure raises the error signal at `now`.
    pub fn add_to_cart_finished(
        &mut self,
        attempt: AttemptId,
        result: CartChangeResult,
        now: Instant,
    ) -> Option<MutationOutcome> {
        if self.closed {
            debug!(%attempt, "discarding cart result after teardown");
            return None;
        }

        let outcome = self.mutation.finish(attempt, result)?;
        if outcome.is_failure() {
            self.error_signal.raise(now);
        }
        Some(outcome)
    }

    /// Advance time. Returns `true` if the error signal cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        !self.closed && self.error_signal.expire(now)
    }

    /// The next instant `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.closed {
            return None;
        }
        self.error_signal.deadline()
    }

    /// End the session: pending timers are cancelled and late results are
    /// discarded from now on.
    pub fn teardown(&mut self) {
        if self.closed {
            return;
        }
        info!(fetch_state = self.catalog.state().as_str(), "upsell session torn down");
        self.closed = true;
        self.error_signal.clear();
        self.mutation.abandon_all();
    }

    /// Describe what the widget shows at `now`.
    pub fn render(&self, now: Instant, formatter: &dyn CurrencyFormatter) -> RenderOutput {
        if self.closed {
            return RenderOutput::nothing();
        }

        let view = if self.catalog.is_loading() {
            WidgetView::Skeleton
        } else {
            match self.offer() {
                Some(offer) => WidgetView::for_offer(
                    &offer,
                    &self.config.placeholder_image_url,
                    formatter,
                    self.mutation.is_submitting(),
                ),
                None => WidgetView::Nothing,
            }
        };

        let error_banner = self
            .error_signal
            .is_active(now)
            .then(|| self.config.error_message.clone());

        RenderOutput { view, error_banner }
    }

    fn ensure_open(&self) -> Result<(), WidgetError> {
        if self.closed {
            Err(WidgetError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Forget the variant choice when a different product becomes the offer.
    fn refresh_offer(&mut self) {
        let current = self.offer().map(|offer| offer.product.id.clone());
        if current != self.offer_product {
            debug!(
                from = ?self.offer_product.as_ref().map(ProductId::as_str),
                to = ?current.as_ref().map(ProductId::as_str),
                "offer changed"
            );
            self.selection.clear();
            self.offer_product = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SymbolFormatter;
    use std::time::Duration;
    use upsell_commerce::{Currency, Money, Variant};

    fn variant(id: &str, cents: i64) -> Variant {
        Variant::new(id, format!("Variant {id}"), Money::new(cents, Currency::USD))
    }

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("a", "Product A")
                .with_variant(variant("v1", 1000))
                .with_variant(variant("v2", 1200).with_image("https://cdn.example/v2.png")),
            Product::new("b", "Product B").with_variant(variant("v3", 500)),
        ]
    }

    fn ready_session() -> UpsellSession {
        let mut session = UpsellSession::new(UpsellConfig::default());
        session.start_fetch().unwrap();
        session.catalog_loaded(Ok(catalog()));
        session
    }

    #[test]
    fn test_skeleton_until_catalog_settles() {
        let mut session = UpsellSession::new(UpsellConfig::default());
        let now = Instant::now();
        assert_eq!(session.render(now, &SymbolFormatter).view, WidgetView::Skeleton);

        let query = session.start_fetch().unwrap();
        assert_eq!(query.collection_handle, "Merchandise");
        assert_eq!(session.render(now, &SymbolFormatter).view, WidgetView::Skeleton);

        session.catalog_loaded(Ok(catalog()));
        assert_eq!(session.fetch_state(), FetchState::Ready);
        assert!(session.render(now, &SymbolFormatter).offer().is_some());
    }

    #[test]
    fn test_fetch_failure_renders_nothing() {
        let mut session = UpsellSession::new(UpsellConfig::default());
        session.start_fetch().unwrap();
        session.catalog_loaded(Err(FetchError::Transport("offline".into())));

        assert_eq!(session.fetch_state(), FetchState::Failed);
        assert_eq!(
            session.render(Instant::now(), &SymbolFormatter),
            RenderOutput::nothing()
        );
    }

    #[test]
    fn test_choice_is_cleared_when_offer_changes() {
        let mut session = ready_session();
        assert_eq!(session.choose_variant(&"v2".into()), Ok(true));
        assert_eq!(session.offer().unwrap().active_variant().id.as_str(), "v2");

        session.cart_lines_changed(vec![CartLine::new("v1")]);
        let offer = session.offer().unwrap();
        assert_eq!(offer.product.id.as_str(), "b");
        assert!(offer.chosen_variant.is_none());

        session.cart_lines_changed(Vec::new());
        let offer = session.offer().unwrap();
        assert_eq!(offer.product.id.as_str(), "a");
        assert!(offer.chosen_variant.is_none());
    }

    #[test]
    fn test_choose_without_offer() {
        let mut session = UpsellSession::new(UpsellConfig::default());
        assert_eq!(
            session.choose_variant(&"v1".into()),
            Err(WidgetError::NoOfferSelected)
        );
    }

    #[test]
    fn test_add_uses_active_variant() {
        let mut session = ready_session();
        session.choose_variant(&"v2".into()).unwrap();

        let pending = session.begin_add_to_cart().unwrap();
        assert_eq!(pending.change, CartChange::add_line("v2".into(), 1).unwrap());
        assert_eq!(session.mutation_state(), MutationState::Submitting);
        assert!(session.render(Instant::now(), &SymbolFormatter).offer().unwrap().adding);
    }

    #[test]
    fn test_add_rejects_foreign_variant() {
        let mut session = ready_session();
        assert_eq!(
            session.begin_add_variant(&"v3".into(), 1),
            Err(WidgetError::VariantNotInOffer("v3".into()))
        );
        assert_eq!(session.mutation_state(), MutationState::Idle);
    }

    #[test]
    fn test_failure_raises_banner_then_clears() {
        let mut session = ready_session();
        let t0 = Instant::now();

        let pending = session.begin_add_to_cart().unwrap();
        let outcome = session.add_to_cart_finished(pending.attempt, CartChangeResult::error("boom"), t0);
        assert!(outcome.unwrap().is_failure());

        let output = session.render(t0, &SymbolFormatter);
        assert_eq!(
            output.error_banner.as_deref(),
            Some(crate::config::DEFAULT_ERROR_MESSAGE)
        );
        assert!(!output.offer().unwrap().adding);
        assert_eq!(session.next_deadline(), Some(t0 + Duration::from_millis(3000)));

        assert!(!session.tick(t0 + Duration::from_millis(2999)));
        assert!(session.tick(t0 + Duration::from_millis(3000)));
        assert!(!session.render(t0 + Duration::from_millis(3000), &SymbolFormatter).banner_visible());
    }

    #[test]
    fn test_teardown_discards_late_results() {
        let mut session = UpsellSession::new(UpsellConfig::default());
        session.start_fetch().unwrap();
        session.teardown();

        session.catalog_loaded(Ok(catalog()));
        assert_eq!(session.fetch_state(), FetchState::Loading);
        assert_eq!(session.start_fetch(), Err(WidgetError::SessionClosed));
        assert_eq!(
            session.render(Instant::now(), &SymbolFormatter),
            RenderOutput::nothing()
        );
    }

    #[test]
    fn test_teardown_cancels_feedback_deadline() {
        let mut session = ready_session();
        let t0 = Instant::now();
        let pending = session.begin_add_to_cart().unwrap();
        session.add_to_cart_finished(pending.attempt, CartChangeResult::error("boom"), t0);
        assert!(session.next_deadline().is_some());

        session.teardown();
        assert!(session.next_deadline().is_none());
        assert!(!session.tick(t0 + Duration::from_secs(10)));
    }
}
