//! Saga and collaborator configuration.
//!
//! Every client receives its reachability info through one of these structs
//! at construction time; nothing here reads the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::error::SagaError;
use crate::retry::RetryPolicy;

/// Default sidecar address for all collaborators.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3501";

/// Per-step deadlines enforced by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTimeouts {
    pub persist: Duration,
    pub payment: Duration,
    pub publish: Duration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            persist: Duration::from_secs(2),
            payment: Duration::from_secs(5),
            publish: Duration::from_secs(2),
        }
    }
}

impl StepTimeouts {
    /// Deadlines that leave room for each client's own timeout and retries.
    pub fn for_clients(
        state_store: &StateStoreConfig,
        payment: &PaymentConfig,
        publisher: &PublisherConfig,
    ) -> Self {
        Self {
            persist: state_store.retry.worst_case(state_store.timeout),
            payment: payment.timeout,
            publish: publisher.retry.worst_case(publisher.timeout),
        }
    }
}

/// How the orchestrator treats a failed state store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistencePolicy {
    /// Log and continue to payment.
    #[default]
    BestEffort,
    /// Stop before payment with a persistence failure.
    Required,
}

impl FromStr for PersistencePolicy {
    type Err = SagaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" | "besteffort" => Ok(Self::BestEffort),
            "required" => Ok(Self::Required),
            other => Err(SagaError::InvalidConfig(format!(
                "unknown persistence policy '{other}', expected 'best-effort' or 'required'"
            ))),
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SagaConfig {
    pub timeouts: StepTimeouts,
    pub persistence: PersistencePolicy,
}

/// Reachability of the state store collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStoreConfig {
    pub base_url: String,
    pub store_name: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl StateStoreConfig {
    /// `{base}/v1.0/state/{store}`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1.0/state/{}",
            self.base_url.trim_end_matches('/'),
            self.store_name
        )
    }
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            store_name: "statestore".to_string(),
            timeout: Duration::from_secs(2),
            retry: RetryPolicy::NoRetry,
        }
    }
}

/// Reachability of the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    pub base_url: String,
    pub app_id: String,
    pub timeout: Duration,
}

impl PaymentConfig {
    /// `{base}/v1.0/invoke/{app}/method/api/pay`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1.0/invoke/{}/method/api/pay",
            self.base_url.trim_end_matches('/'),
            self.app_id
        )
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: "paymentsvc".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Reachability of the pub/sub collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub base_url: String,
    pub pubsub_name: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl PublisherConfig {
    /// `{base}/v1.0/publish/{pubsub}/{topic}`
    pub fn endpoint(&self, topic: &str) -> String {
        format!(
            "{}/v1.0/publish/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.pubsub_name,
            topic
        )
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pubsub_name: "pubsub".to_string(),
            timeout: Duration::from_secs(2),
            retry: RetryPolicy::NoRetry,
        }
    }
}
