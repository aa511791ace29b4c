//! Host-side collaborators.
//!
//! The host checkout owns the cart and the locale. The widget reaches them
//! only through these traits and through a `watch` channel of cart lines.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use upsell_commerce::{CartChange, CartChangeResult, CartLine, Money, Price};

/// Applies cart changes on behalf of the widget.
#[async_trait]
pub trait CartMutator: Send + Sync {
    /// Apply one change. Failures are reported in the result, never raised.
    async fn apply_change(&self, change: CartChange) -> CartChangeResult;
}

#[async_trait]
impl<M: CartMutator + ?Sized> CartMutator for Arc<M> {
    async fn apply_change(&self, change: CartChange) -> CartChangeResult {
        (**self).apply_change(change).await
    }
}

/// Locale-aware currency formatting.
pub trait CurrencyFormatter: Send + Sync {
    fn format_currency(&self, amount: &Money) -> String;

    /// Format a variant price. Amounts the storefront sent in a form that
    /// did not parse are shown verbatim with their currency code.
    fn format_price(&self, price: &Price) -> String {
        match price {
            Price::Money(money) => self.format_currency(money),
            Price::Raw { .. } => price.display(),
        }
    }
}

/// Formats with the currency symbol and fixed decimals, e.g. `$19.99`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolFormatter;

impl CurrencyFormatter for SymbolFormatter {
    fn format_currency(&self, amount: &Money) -> String {
        amount.display()
    }
}

/// An in-process cart for previews and tests.
///
/// Successful changes append a line and publish the new snapshot to every
/// subscriber, the way a host cart subscription would.
#[derive(Debug, Clone)]
pub struct InMemoryCart {
    lines: Arc<watch::Sender<Vec<CartLine>>>,
    applied: Arc<Mutex<Vec<CartChange>>>,
    failure: Option<String>,
    latency: Duration,
}

impl InMemoryCart {
    /// Create a cart holding the given lines.
    pub fn new(lines: Vec<CartLine>) -> Self {
        let (tx, _rx) = watch::channel(lines);
        Self {
            lines: Arc::new(tx),
            applied: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            latency: Duration::ZERO,
        }
    }

    /// Report every change as failed with the given message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Delay every change by the given duration.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Subscribe to cart line snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.lines.subscribe()
    }

    /// Replace the cart contents, as if the shopper edited the cart.
    pub fn replace_lines(&self, lines: Vec<CartLine>) {
        self.lines.send_replace(lines);
    }

    /// Current cart contents.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.borrow().clone()
    }

    /// Every change the widget requested, in order.
    pub fn applied_changes(&self) -> Vec<CartChange> {
        self.applied
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CartMutator for InMemoryCart {
    async fn apply_change(&self, change: CartChange) -> CartChangeResult {
        if let Ok(mut applied) = self.applied.lock() {
            applied.push(change.clone());
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(message) = &self.failure {
            return CartChangeResult::error(message.clone());
        }

        match change {
            CartChange::AddCartLine { merchandise_id, .. } => {
                self.lines.send_modify(|lines| lines.push(CartLine::new(merchandise_id)));
            }
        }
        CartChangeResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upsell_commerce::Currency;

    #[test]
    fn test_symbol_formatter() {
        let money = Money::new(1999, Currency::USD);
        assert_eq!(SymbolFormatter.format_currency(&money), "$19.99");

        let raw = Price::from_storefront("19,99", Currency::EUR);
        assert_eq!(SymbolFormatter.format_price(&raw), "19,99 EUR");
    }

    #[tokio::test]
    async fn test_in_memory_cart_appends_line() {
        let cart = InMemoryCart::new(Vec::new());
        let mut rx = cart.subscribe();

        let change = CartChange::add_line("v1".into(), 1).unwrap();
        assert!(cart.apply_change(change.clone()).await.is_success());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), vec![CartLine::new("v1")]);
        assert_eq!(cart.applied_changes(), vec![change]);
    }

    #[tokio::test]
    async fn test_in_memory_cart_failure_leaves_lines() {
        let cart = InMemoryCart::new(Vec::new()).failing("boom");
        let change = CartChange::add_line("v1".into(), 1).unwrap();

        assert_eq!(
            cart.apply_change(change).await,
            CartChangeResult::error("boom")
        );
        assert!(cart.lines().is_empty());
        assert_eq!(cart.applied_changes().len(), 1);
    }
}
