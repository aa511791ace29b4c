//! Async session driver.
//!
//! One task owns the [`UpsellSession`] and feeds it events from the catalog
//! fetch, the cart subscription, shopper commands, finished cart changes and
//! the feedback deadline. After every event it publishes a fresh
//! [`RenderOutput`] on a `watch` channel.

use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn, Instrument};
use upsell_commerce::{CartChangeResult, CartLine, Product, VariantId};
use upsell_data::{CatalogSource, FetchError};
use upsell_observability::session_span;

use crate::config::UpsellConfig;
use crate::error::WidgetError;
use crate::mutation::AttemptId;
use crate::ports::{CartMutator, CurrencyFormatter};
use crate::render::RenderOutput;
use crate::session::{PendingMutation, UpsellSession};

type FetchFuture = BoxFuture<'static, Result<Vec<Product>, FetchError>>;
type CartFuture = BoxFuture<'static, (AttemptId, CartChangeResult)>;

/// Shopper actions sent to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Pick a variant of the current offer.
    ChooseVariant(VariantId),
    /// Add the active variant of the current offer, quantity one.
    AddToCart,
    /// Add a specific variant of the current offer.
    AddVariant { variant_id: VariantId, quantity: u32 },
    /// End the session.
    Shutdown,
}

/// Host-side handle to a running session.
///
/// Dropping every handle shuts the session down.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    render: watch::Receiver<RenderOutput>,
}

impl SessionHandle {
    pub fn choose_variant(&self, variant_id: impl Into<VariantId>) -> Result<(), WidgetError> {
        self.send(SessionCommand::ChooseVariant(variant_id.into()))
    }

    pub fn add_to_cart(&self) -> Result<(), WidgetError> {
        self.send(SessionCommand::AddToCart)
    }

    pub fn add_variant(&self, variant_id: impl Into<VariantId>, quantity: u32) -> Result<(), WidgetError> {
        self.send(SessionCommand::AddVariant {
            variant_id: variant_id.into(),
            quantity,
        })
    }

    pub fn shutdown(&self) -> Result<(), WidgetError> {
        self.send(SessionCommand::Shutdown)
    }

    /// A receiver of render outputs, for hosts that re-render on change.
    pub fn render(&self) -> watch::Receiver<RenderOutput> {
        self.render.clone()
    }

    /// The most recently published output.
    pub fn current(&self) -> RenderOutput {
        self.render.borrow().clone()
    }

    /// Wait until the published output satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&RenderOutput) -> bool,
    ) -> Result<RenderOutput, WidgetError> {
        self.render
            .wait_for(predicate)
            .await
            .map(|output| output.clone())
            .map_err(|_| WidgetError::SessionClosed)
    }

    fn send(&self, command: SessionCommand) -> Result<(), WidgetError> {
        self.commands
            .send(command)
            .map_err(|_| WidgetError::SessionClosed)
    }
}

/// Event loop for one upsell session.
pub struct SessionDriver {
    session: UpsellSession,
    catalog: Arc<dyn CatalogSource>,
    cart: Arc<dyn CartMutator>,
    formatter: Arc<dyn CurrencyFormatter>,
    cart_lines: watch::Receiver<Vec<CartLine>>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    render_tx: watch::Sender<RenderOutput>,
}

impl SessionDriver {
    /// Create a driver and the handle used to talk to it.
    pub fn new(
        config: UpsellConfig,
        catalog: Arc<dyn CatalogSource>,
        cart: Arc<dyn CartMutator>,
        formatter: Arc<dyn CurrencyFormatter>,
        cart_lines: watch::Receiver<Vec<CartLine>>,
    ) -> (Self, SessionHandle) {
        Self::with_session(UpsellSession::new(config), catalog, cart, formatter, cart_lines)
    }

    /// Create a driver around an existing, not yet started session.
    pub fn with_session(
        session: UpsellSession,
        catalog: Arc<dyn CatalogSource>,
        cart: Arc<dyn CartMutator>,
        formatter: Arc<dyn CurrencyFormatter>,
        cart_lines: watch::Receiver<Vec<CartLine>>,
    ) -> (Self, SessionHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (render_tx, render) = watch::channel(RenderOutput::skeleton());

        let driver = Self {
            session,
            catalog,
            cart,
            formatter,
            cart_lines,
            commands,
            render_tx,
        };
        let handle = SessionHandle {
            commands: commands_tx,
            render,
        };
        (driver, handle)
    }

    /// Run until shutdown and return the final session state.
    pub async fn run(self) -> UpsellSession {
        let span = session_span(
            self.session.id(),
            &self.session.config().collection_handle,
        );
        self.event_loop().instrument(span).await
    }

    async fn event_loop(self) -> UpsellSession {
        let SessionDriver {
            mut session,
            catalog,
            cart,
            formatter,
            mut cart_lines,
            mut commands,
            render_tx,
        } = self;

        info!("upsell session started");

        let (mut fetch, mut fetch_pending): (FetchFuture, bool) = match session.start_fetch() {
            Ok(query) => {
                let catalog = Arc::clone(&catalog);
                (
                    Box::pin(async move { catalog.fetch_products(&query).await }),
                    true,
                )
            }
            Err(e) => {
                warn!(error = %e, "catalog fetch not started");
                (Box::pin(future::pending()), false)
            }
        };

        let initial = cart_lines.borrow_and_update().clone();
        session.cart_lines_changed(initial);
        publish(&session, &render_tx, formatter.as_ref());

        let mut mutations: FuturesUnordered<CartFuture> = FuturesUnordered::new();
        let mut cart_open = true;

        loop {
            let deadline = session.next_deadline();

            tokio::select! {
                result = &mut fetch, if fetch_pending => {
                    fetch_pending = false;
                    session.catalog_loaded(result);
                }
                changed = cart_lines.changed(), if cart_open => {
                    match changed {
                        Ok(()) => {
                            let lines = cart_lines.borrow_and_update().clone();
                            session.cart_lines_changed(lines);
                        }
                        Err(_) => {
                            debug!("cart subscription closed");
                            cart_open = false;
                        }
                    }
                }
                Some((attempt, result)) = mutations.next(), if !mutations.is_empty() => {
                    session.add_to_cart_finished(attempt, result, Instant::now());
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    session.tick(Instant::now());
                }
                command = commands.recv() => {
                    match command {
                        None | Some(SessionCommand::Shutdown) => break,
                        Some(command) => apply_command(&mut session, command, &cart, &mutations),
                    }
                }
            }

            publish(&session, &render_tx, formatter.as_ref());
        }

        session.teardown();
        publish(&session, &render_tx, formatter.as_ref());

        // The host still applies changes already sent; only their results
        // are dropped.
        for pending in mutations {
            tokio::spawn(pending);
        }

        info!("upsell session ended");
        session
    }
}

fn apply_command(
    session: &mut UpsellSession,
    command: SessionCommand,
    cart: &Arc<dyn CartMutator>,
    mutations: &FuturesUnordered<CartFuture>,
) {
    let pending = match command {
        SessionCommand::ChooseVariant(variant_id) => {
            if let Err(e) = session.choose_variant(&variant_id) {
                warn!(error = %e, variant_id = %variant_id, "variant choice rejected");
            }
            return;
        }
        SessionCommand::AddToCart => session.begin_add_to_cart(),
        SessionCommand::AddVariant { variant_id, quantity } => {
            session.begin_add_variant(&variant_id, quantity)
        }
        SessionCommand::Shutdown => return,
    };

    match pending {
        Ok(PendingMutation { attempt, change }) => {
            let cart = Arc::clone(cart);
            mutations.push(Box::pin(async move { (attempt, cart.apply_change(change).await) }));
        }
        Err(WidgetError::SubmissionInFlight) => {
            debug!("add to cart ignored while a submission is in flight");
        }
        Err(e) => warn!(error = %e, "add to cart rejected"),
    }
}

fn publish(
    session: &UpsellSession,
    render_tx: &watch::Sender<RenderOutput>,
    formatter: &dyn CurrencyFormatter,
) {
    let next = session.render(Instant::now(), formatter);
    render_tx.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
