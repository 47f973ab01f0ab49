//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of one order saga run.
///
/// State transitions:
/// ```text
/// Start ──► Persisting ──► Paying ──┬──► Publishing ──► Done
///               │                   └──► Failed
///               └──► Failed   (only when persistence is required)
/// ```
///
/// There is no edge back into an earlier state: steps are never retried by
/// the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Request accepted, no step started.
    #[default]
    Start,

    /// Writing the order intent to the state store.
    Persisting,

    /// Charging the order.
    Paying,

    /// Announcing the created order.
    Publishing,

    /// All steps attempted, order created (terminal state).
    Done,

    /// A fatal step failed (terminal state).
    Failed,
}

impl SagaState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: SagaState) -> bool {
        matches!(
            (self, next),
            (SagaState::Start, SagaState::Persisting)
                | (SagaState::Persisting, SagaState::Paying)
                | (SagaState::Persisting, SagaState::Failed)
                | (SagaState::Paying, SagaState::Publishing)
                | (SagaState::Paying, SagaState::Failed)
                | (SagaState::Publishing, SagaState::Done)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Done | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Start => "Start",
            SagaState::Persisting => "Persisting",
            SagaState::Paying => "Paying",
            SagaState::Publishing => "Publishing",
            SagaState::Done => "Done",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
