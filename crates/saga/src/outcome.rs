//! Terminal result of a saga run and per-step bookkeeping.

use common::{CorrelationContext, OrderId};

use crate::error::SagaError;
use crate::state::SagaState;

/// What happened to one step of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    NotAttempted,
    Succeeded,
    /// The step was attempted and failed; holds the cause.
    Failed(String),
}

impl StepStatus {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, StepStatus::Succeeded)
    }

    pub fn is_attempted(&self) -> bool {
        !matches!(self, StepStatus::NotAttempted)
    }
}

/// Per-step results and the states a run went through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SagaReport {
    pub persist: StepStatus,
    pub payment: StepStatus,
    pub publish: StepStatus,
    pub states: Vec<SagaState>,
}

/// Why a run ended in [`OrderOutcome::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The payment step did not succeed.
    PaymentFailed,
    /// The state store write failed while persistence is required.
    PersistenceFailed,
    /// The detached part of the run did not finish (task panicked).
    Interrupted,
}

impl FailureReason {
    /// Human-readable title for problem responses.
    pub fn title(&self) -> &'static str {
        match self {
            FailureReason::PaymentFailed => "payment failed",
            FailureReason::PersistenceFailed => "persistence failed",
            FailureReason::Interrupted => "order processing interrupted",
        }
    }

    /// HTTP status the edge should answer with.
    pub fn status_hint(&self) -> u16 {
        match self {
            FailureReason::PaymentFailed => 502,
            FailureReason::PersistenceFailed => 503,
            FailureReason::Interrupted => 500,
        }
    }

    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::PaymentFailed => "payment_failed",
            FailureReason::PersistenceFailed => "persistence_failed",
            FailureReason::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Terminal result of one saga run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Payment succeeded; persistence and publish were attempted.
    Created { id: OrderId, report: SagaReport },
    /// A fatal step failed.
    Failed {
        id: OrderId,
        reason: FailureReason,
        report: SagaReport,
    },
}

impl OrderOutcome {
    pub fn id(&self) -> &OrderId {
        match self {
            OrderOutcome::Created { id, .. } | OrderOutcome::Failed { id, .. } => id,
        }
    }

    pub fn report(&self) -> &SagaReport {
        match self {
            OrderOutcome::Created { report, .. } | OrderOutcome::Failed { report, .. } => report,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, OrderOutcome::Created { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            OrderOutcome::Created { .. } => None,
            OrderOutcome::Failed { reason, .. } => Some(*reason),
        }
    }

    /// HTTP status the edge should answer with.
    pub fn status_hint(&self) -> u16 {
        self.failure_reason().map_or(200, |r| r.status_hint())
    }
}

/// Result of a step whose failure must not fail the saga.
///
/// Dropping one without a decision is a compile warning: the caller either
/// acknowledges that the failure is ignored, or turns it back into a
/// `Result` and branches on it.
#[must_use = "best-effort step results must be acknowledged or handled"]
#[derive(Debug)]
pub struct BestEffort {
    step: &'static str,
    result: Result<(), SagaError>,
}

impl BestEffort {
    pub fn new(step: &'static str, result: Result<(), SagaError>) -> Self {
        Self { step, result }
    }

    /// Accepts the result without affecting the saga.
    ///
    /// A failure is logged with the order and trace id and counted under
    /// `saga_step_failures_total{step}`.
    pub fn acknowledge_ignored(self, ctx: &CorrelationContext) -> StepStatus {
        match self.result {
            Ok(()) => StepStatus::Succeeded,
            Err(e) => {
                metrics::counter!("saga_step_failures_total", "step" => self.step).increment(1);
                tracing::warn!(
                    step = self.step,
                    order_id = %ctx.order_id(),
                    trace_id = %ctx.trace_id(),
                    error = %e,
                    "best-effort step failed, continuing"
                );
                StepStatus::Failed(e.to_string())
            }
        }
    }

    /// Hands the result back for callers that treat the step as fatal.
    pub fn into_result(self) -> Result<(), SagaError> {
        self.result
    }
}
