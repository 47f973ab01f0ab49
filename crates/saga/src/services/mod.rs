//! Collaborator traits with in-memory and HTTP implementations.
//!
//! The in-memory variants record every call and can be told to fail; the
//! HTTP variants talk to the sidecar APIs configured in [`crate::config`].

mod http;
pub mod payment;
pub mod publisher;
pub mod state_store;

pub use payment::{
    HttpPaymentGateway, InMemoryPaymentGateway, PaymentGateway, PaymentReceipt, RecordedCharge,
};
pub use publisher::{EventPublisher, HttpEventPublisher, InMemoryEventPublisher, RecordedEvent};
pub use state_store::{HttpStateStore, InMemoryStateStore, RecordedPut, StateStore};
