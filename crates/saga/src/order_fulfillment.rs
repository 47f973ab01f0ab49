//! Order creation saga constants.
//!
//! The saga has a fixed shape: persist intent, charge, announce. Only the
//! charge gates the outcome. To add a further best-effort step after the
//! charge:
//!
//! 1. add a [`SagaState`](crate::SagaState) variant between `Paying` and
//!    `Done` and its edges in `can_transition_to`;
//! 2. add a client trait next to the others in [`crate::services`];
//! 3. call it from the detached part of the orchestrator under a step
//!    deadline and acknowledge the result through
//!    [`BestEffort`](crate::BestEffort).
//!
//! A step that must gate the outcome instead branches on
//! `BestEffort::into_result` and needs its own `FailureReason`.

/// Step name: write the order intent to the state store.
pub const STEP_PERSIST_INTENT: &str = "persist_intent";

/// Step name: charge the order.
pub const STEP_PROCESS_PAYMENT: &str = "process_payment";

/// Step name: publish the completion event.
pub const STEP_PUBLISH_EVENT: &str = "publish_event";

/// Topic announcing a created order.
pub const ORDER_CREATED_TOPIC: &str = "order.created";
