//! Saga pattern implementation for order creation.
//!
//! The order saga runs three steps against independent collaborators:
//! 1. Persist the order intent (state store)
//! 2. Charge the order (payment gateway)
//! 3. Announce `order.created` (event publisher)
//!
//! Only the charge decides the outcome. Persistence and publish failures are
//! acknowledged explicitly, logged and counted, but never surface to the
//! caller (unless persistence is configured as required).

pub mod config;
pub mod coordinator;
pub mod error;
pub mod order;
pub mod order_fulfillment;
pub mod outcome;
pub mod retry;
pub mod services;
pub mod state;

pub use config::{
    PaymentConfig, PersistencePolicy, PublisherConfig, SagaConfig, StateStoreConfig, StepTimeouts,
};
pub use coordinator::OrderOrchestrator;
pub use error::{ClientError, SagaError};
pub use order::{Amount, Order};
pub use outcome::{BestEffort, FailureReason, OrderOutcome, SagaReport, StepStatus};
pub use retry::RetryPolicy;
pub use services::{
    EventPublisher, HttpEventPublisher, HttpPaymentGateway, HttpStateStore,
    InMemoryEventPublisher, InMemoryPaymentGateway, InMemoryStateStore, PaymentGateway,
    PaymentReceipt, StateStore,
};
pub use state::SagaState;
