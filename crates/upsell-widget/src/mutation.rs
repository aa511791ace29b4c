//! Cart mutation controller.
//!
//! Tracks add-to-cart attempts. Each attempt is a single call to the host
//! with no retry; the controller only records what happened.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use upsell_commerce::{CartChange, CartChangeResult, VariantId};

use crate::error::WidgetError;

/// State of the most recent add-to-cart attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl MutationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationState::Idle => "idle",
            MutationState::Submitting => "submitting",
            MutationState::Succeeded => "succeeded",
            MutationState::Failed => "failed",
        }
    }
}

/// Identifies one add-to-cart attempt within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Succeeded,
    /// The host rejected the change. The message is for operators only.
    Failed { message: String },
}

impl MutationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MutationOutcome::Failed { .. })
    }
}

/// Drives add-to-cart attempts.
#[derive(Debug, Clone)]
pub struct MutationController {
    state: MutationState,
    guard_reentrant: bool,
    next_attempt: u64,
    latest: Option<AttemptId>,
    in_flight: BTreeMap<AttemptId, VariantId>,
}

impl MutationController {
    /// Create a controller. With `guard_reentrant`, a second attempt is
    /// rejected while one is in flight.
    pub fn new(guard_reentrant: bool) -> Self {
        Self {
            state: MutationState::Idle,
            guard_reentrant,
            next_attempt: 0,
            latest: None,
            in_flight: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    /// Whether the add action shows its loading indicator.
    pub fn is_submitting(&self) -> bool {
        self.state == MutationState::Submitting
    }

    /// Number of attempts still waiting for the host.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start an attempt and build the change to send to the host.
    pub fn begin(
        &mut self,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<(AttemptId, CartChange), WidgetError> {
        if self.guard_reentrant && !self.in_flight.is_empty() {
            return Err(WidgetError::SubmissionInFlight);
        }

        let change = CartChange::add_line(variant_id.clone(), quantity)
            .map_err(|_| WidgetError::InvalidQuantity(quantity))?;

        self.next_attempt += 1;
        let attempt = AttemptId(self.next_attempt);
        self.in_flight.insert(attempt, variant_id);
        self.latest = Some(attempt);
        self.state = MutationState::Submitting;

        debug!(%attempt, quantity, "add to cart submitted");
        Ok((attempt, change))
    }

    /// Record the host's answer for an attempt.
    ///
    /// Returns `None` for unknown or abandoned attempts. Only the most recent
    /// attempt moves the state; an older one finishing late is logged and
    /// reported but leaves the state alone.
    pub fn finish(
        &mut self,
        attempt: AttemptId,
        result: CartChangeResult,
    ) -> Option<MutationOutcome> {
        let Some(variant_id) = self.in_flight.remove(&attempt) else {
            debug!(%attempt, "ignoring result of unknown attempt");
            return None;
        };

        let outcome = match result {
            CartChangeResult::Success => {
                debug!(%attempt, merchandise_id = %variant_id, "add to cart succeeded");
                MutationOutcome::Succeeded
            }
            CartChangeResult::Error { message } => {
                error!(%attempt, merchandise_id = %variant_id, %message, "add to cart failed");
                MutationOutcome::Failed { message }
            }
        };

        if self.latest == Some(attempt) {
            self.state = match outcome {
                MutationOutcome::Succeeded => MutationState::Succeeded,
                MutationOutcome::Failed { .. } => MutationState::Failed,
            };
        }

        Some(outcome)
    }

    /// Drop every pending attempt; their results will be ignored.
    pub fn abandon_all(&mut self) {
        if !self.in_flight.is_empty() {
            debug!(count = self.in_flight.len(), "abandoning in-flight attempts");
        }
        self.in_flight.clear();
        if self.state == MutationState::Submitting {
            self.state = MutationState::Idle;
        }
    }
}

impl Default for MutationController {
    fn default() -> Self {
        Self::new(true)
    }
}
