//! Order orchestrator: runs the persist → pay → publish saga.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{CorrelationContext, OrderPayload, TraceContext};
use serde_json::json;
use tracing::Instrument;

use crate::config::{PersistencePolicy, SagaConfig, StepTimeouts};
use crate::error::SagaError;
use crate::order::Order;
use crate::order_fulfillment::{
    ORDER_CREATED_TOPIC, STEP_PERSIST_INTENT, STEP_PROCESS_PAYMENT, STEP_PUBLISH_EVENT,
};
use crate::outcome::{BestEffort, FailureReason, OrderOutcome, SagaReport, StepStatus};
use crate::services::{EventPublisher, PaymentGateway, StateStore};
use crate::state::SagaState;

/// Sequences the order saga against its three collaborators.
///
/// The orchestrator is stateless between runs: it only holds shared client
/// handles and immutable configuration, so one instance serves any number of
/// concurrent requests.
///
/// Failure policy:
/// - state store write: best effort by default, see [`PersistencePolicy`];
/// - payment: the only fatal gate, a failure ends the run before publish;
/// - publish: best effort, the outcome is `Created` once it was attempted.
pub struct OrderOrchestrator<S, P, E>
where
    S: StateStore,
    P: PaymentGateway,
    E: EventPublisher,
{
    store: Arc<S>,
    payment: Arc<P>,
    publisher: Arc<E>,
    config: SagaConfig,
}

impl<S, P, E> OrderOrchestrator<S, P, E>
where
    S: StateStore + 'static,
    P: PaymentGateway + 'static,
    E: EventPublisher + 'static,
{
    /// Creates a new orchestrator.
    pub fn new(store: S, payment: P, publisher: E, config: SagaConfig) -> Self {
        Self {
            store: Arc::new(store),
            payment: Arc::new(payment),
            publisher: Arc::new(publisher),
            config,
        }
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    /// Runs the saga for one order request.
    ///
    /// The order id is resolved (or generated) before any step runs and is
    /// the same value for the put, the charge and the published event.
    /// Once the charge has been dispatched the rest of the run is detached
    /// from the caller: dropping this future does not abort the payment or
    /// the publish that follows it.
    pub async fn create_order(&self, payload: OrderPayload, trace: &TraceContext) -> OrderOutcome {
        let order = Order::from_payload(payload);
        let ctx = CorrelationContext::new(trace.clone(), order.id().clone());
        let span = tracing::info_span!(
            "create_order",
            order_id = %ctx.order_id(),
            trace_id = %ctx.trace_id(),
            id_generated = order.id_generated(),
        );

        self.run(order, ctx).instrument(span).await
    }

    async fn run(&self, order: Order, ctx: CorrelationContext) -> OrderOutcome {
        metrics::counter!("saga_executions_total").increment(1);
        let started = Instant::now();
        let trace_id = ctx.trace_id().to_string();
        let mut run = SagaRun::new();

        // Step 1: persist intent
        run.enter(SagaState::Persisting);
        let persisted = BestEffort::new(
            STEP_PERSIST_INTENT,
            with_deadline(
                STEP_PERSIST_INTENT,
                self.config.timeouts.persist,
                self.store.put(order.id(), order.payload(), &ctx),
            )
            .await,
        );

        match self.config.persistence {
            PersistencePolicy::BestEffort => {
                run.report.persist = persisted.acknowledge_ignored(&ctx);
            }
            PersistencePolicy::Required => {
                if let Err(e) = persisted.into_result() {
                    metrics::counter!("saga_step_failures_total", "step" => STEP_PERSIST_INTENT)
                        .increment(1);
                    tracing::warn!(
                        order_id = %ctx.order_id(),
                        trace_id = %trace_id,
                        error = %e,
                        "state store write failed, persistence is required"
                    );
                    run.report.persist = StepStatus::Failed(e.to_string());
                    run.enter(SagaState::Failed);
                    let outcome = OrderOutcome::Failed {
                        id: order.id().clone(),
                        reason: FailureReason::PersistenceFailed,
                        report: run.into_report(),
                    };
                    return finish(outcome, started, &trace_id);
                }
                run.report.persist = StepStatus::Succeeded;
            }
        }

        // Steps 2 and 3 run detached so a dropped request cannot abort a
        // charge whose remote effect is unknown.
        run.enter(SagaState::Paying);
        let id = order.id().clone();
        let report_so_far = run.report.clone();
        let task = charge_and_announce(
            Arc::clone(&self.payment),
            Arc::clone(&self.publisher),
            self.config.timeouts,
            order,
            ctx,
            run,
        );

        let outcome = match tokio::spawn(task.in_current_span()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(order_id = %id, trace_id = %trace_id, error = %e, "saga task did not complete");
                let mut report = report_so_far;
                report.states.push(SagaState::Failed);
                OrderOutcome::Failed {
                    id,
                    reason: FailureReason::Interrupted,
                    report,
                }
            }
        };

        finish(outcome, started, &trace_id)
    }
}

async fn charge_and_announce<P, E>(
    payment: Arc<P>,
    publisher: Arc<E>,
    timeouts: StepTimeouts,
    order: Order,
    ctx: CorrelationContext,
    mut run: SagaRun,
) -> OrderOutcome
where
    P: PaymentGateway,
    E: EventPublisher,
{
    // Step 2: charge
    let charged = with_deadline(
        STEP_PROCESS_PAYMENT,
        timeouts.payment,
        payment.pay(order.id(), order.amount(), &ctx),
    )
    .await;

    match charged {
        Ok(_) => {
            tracing::info!(
                order_id = %ctx.order_id(),
                trace_id = %ctx.trace_id(),
                amount = %order.amount(),
                payment = "paid",
                "payment resolved"
            );
            run.report.payment = StepStatus::Succeeded;
        }
        Err(e) => {
            metrics::counter!("saga_step_failures_total", "step" => STEP_PROCESS_PAYMENT)
                .increment(1);
            tracing::warn!(
                order_id = %ctx.order_id(),
                trace_id = %ctx.trace_id(),
                amount = %order.amount(),
                payment = "failed",
                error = %e,
                "payment resolved"
            );
            run.report.payment = StepStatus::Failed(e.to_string());
            run.enter(SagaState::Failed);
            return OrderOutcome::Failed {
                id: order.id().clone(),
                reason: FailureReason::PaymentFailed,
                report: run.into_report(),
            };
        }
    }

    // Step 3: announce
    run.enter(SagaState::Publishing);
    let message = json!({ "id": order.id() });
    let published = with_deadline(
        STEP_PUBLISH_EVENT,
        timeouts.publish,
        publisher.publish(ORDER_CREATED_TOPIC, &message, &ctx),
    )
    .await;
    run.report.publish = BestEffort::new(STEP_PUBLISH_EVENT, published).acknowledge_ignored(&ctx);

    run.enter(SagaState::Done);
    OrderOutcome::Created {
        id: order.id().clone(),
        report: run.into_report(),
    }
}

/// Bounds a single step call.
async fn with_deadline<T, F>(step: &'static str, after: Duration, call: F) -> Result<T, SagaError>
where
    F: Future<Output = Result<T, SagaError>>,
{
    tokio::time::timeout(after, call)
        .await
        .unwrap_or_else(|_| Err(SagaError::StepTimeout { step, after }))
}

fn finish(outcome: OrderOutcome, started: Instant, trace_id: &str) -> OrderOutcome {
    let duration = started.elapsed().as_secs_f64();
    metrics::histogram!("saga_duration_seconds").record(duration);

    match &outcome {
        OrderOutcome::Created { id, .. } => {
            metrics::counter!("saga_completed").increment(1);
            tracing::info!(order_id = %id, trace_id, duration, "order created");
        }
        OrderOutcome::Failed { id, reason, .. } => {
            metrics::counter!("saga_failed", "reason" => reason.as_str()).increment(1);
            tracing::warn!(order_id = %id, trace_id, %reason, duration, "order saga failed");
        }
    }

    outcome
}

/// Bookkeeping for one run: current state plus the report being built.
#[derive(Debug)]
struct SagaRun {
    state: SagaState,
    report: SagaReport,
}

impl SagaRun {
    fn new() -> Self {
        Self {
            state: SagaState::Start,
            report: SagaReport {
                states: vec![SagaState::Start],
                ..Default::default()
            },
        }
    }

    fn enter(&mut self, next: SagaState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal saga transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "saga transition");
        self.state = next;
        self.report.states.push(next);
    }

    fn into_report(self) -> SagaReport {
        self.report
    }
}
