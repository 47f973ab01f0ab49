//! Payment gateway trait, in-memory and HTTP implementations.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{CorrelationContext, OrderId};
use serde::Deserialize;
use serde_json::json;

use super::http::{build_client, post_json};
use crate::config::PaymentConfig;
use crate::error::{ClientError, SagaError};
use crate::order::Amount;

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    /// The order the charge was made for.
    pub order_id: OrderId,
    pub amount: Amount,
}

/// Trait for charging an order.
///
/// Every kind of failure (transport, timeout, non-success status, decline)
/// is reported as `Err`; callers only see paid or not paid.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn pay(
        &self,
        order_id: &OrderId,
        amount: &Amount,
        ctx: &CorrelationContext,
    ) -> Result<PaymentReceipt, SagaError>;
}

/// A successful charge seen by [`InMemoryPaymentGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCharge {
    pub order_id: OrderId,
    pub amount: Amount,
    pub trace_id: String,
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charges: Vec<RecordedCharge>,
    attempts: usize,
    decline: bool,
    latency: Option<Duration>,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline subsequent charges.
    pub fn set_decline(&self, decline: bool) {
        self.state.write().unwrap().decline = decline;
    }

    /// Delays every charge by `latency` before it is recorded.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of successful charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Returns the number of pay calls, declined ones included.
    pub fn attempt_count(&self) -> usize {
        self.state.read().unwrap().attempts
    }

    /// Returns every successful charge in call order.
    pub fn charges(&self) -> Vec<RecordedCharge> {
        self.state.read().unwrap().charges.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn pay(
        &self,
        order_id: &OrderId,
        amount: &Amount,
        ctx: &CorrelationContext,
    ) -> Result<PaymentReceipt, SagaError> {
        let latency = self.state.read().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        if state.decline {
            return Err(SagaError::Payment(ClientError::Declined));
        }

        state.charges.push(RecordedCharge {
            order_id: order_id.clone(),
            amount: amount.clone(),
            trace_id: ctx.trace_id().to_string(),
        });

        Ok(PaymentReceipt {
            order_id: order_id.clone(),
            amount: amount.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PayResponse {
    #[serde(default)]
    paid: Option<bool>,
}

/// Payment gateway reached through sidecar service invocation.
///
/// POSTs `{"id", "amount"}` to `{base}/v1.0/invoke/{app}/method/api/pay`.
/// The status code decides success; a 2xx body of `{"paid": false}` is a
/// decline. Never retried.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, SagaError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            endpoint: config.endpoint(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn pay(
        &self,
        order_id: &OrderId,
        amount: &Amount,
        ctx: &CorrelationContext,
    ) -> Result<PaymentReceipt, SagaError> {
        let body = json!({ "id": order_id, "amount": amount });
        let response = post_json(&self.client, &self.endpoint, &body, ctx)
            .await
            .map_err(SagaError::Payment)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SagaError::Payment(e.into()))?;

        let paid = serde_json::from_slice::<PayResponse>(&bytes)
            .ok()
            .and_then(|r| r.paid);
        if paid == Some(false) {
            return Err(SagaError::Payment(ClientError::Declined));
        }

        Ok(PaymentReceipt {
            order_id: order_id.clone(),
            amount: amount.clone(),
        })
    }
}
