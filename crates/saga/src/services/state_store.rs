//! State store trait, in-memory and HTTP implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CorrelationContext, OrderId, OrderPayload};
use serde_json::json;

use super::http::{build_client, post_json};
use crate::config::StateStoreConfig;
use crate::error::{ClientError, SagaError};
use crate::retry::RetryPolicy;

/// Durable key-value storage of order intent.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Writes `value` under `key`, overwriting any previous value.
    async fn put(
        &self,
        key: &OrderId,
        value: &OrderPayload,
        ctx: &CorrelationContext,
    ) -> Result<(), SagaError>;
}

/// A put attempt seen by [`InMemoryStateStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub key: OrderId,
    pub trace_id: String,
}

#[derive(Debug, Default)]
struct InMemoryStateStoreState {
    entries: HashMap<OrderId, OrderPayload>,
    puts: Vec<RecordedPut>,
    fail_on_put: bool,
}

/// In-memory state store for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    state: Arc<RwLock<InMemoryStateStoreState>>,
}

impl InMemoryStateStore {
    /// Creates a new, empty in-memory state store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to reject subsequent puts.
    pub fn set_fail_on_put(&self, fail: bool) {
        self.state.write().unwrap().fail_on_put = fail;
    }

    /// Returns the stored value for `key`.
    pub fn get(&self, key: &OrderId) -> Option<OrderPayload> {
        self.state.read().unwrap().entries.get(key).cloned()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.state.read().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of put attempts, failed ones included.
    pub fn put_count(&self) -> usize {
        self.state.read().unwrap().puts.len()
    }

    /// Returns every put attempt in call order.
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.state.read().unwrap().puts.clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn put(
        &self,
        key: &OrderId,
        value: &OrderPayload,
        ctx: &CorrelationContext,
    ) -> Result<(), SagaError> {
        let mut state = self.state.write().unwrap();
        state.puts.push(RecordedPut {
            key: key.clone(),
            trace_id: ctx.trace_id().to_string(),
        });

        if state.fail_on_put {
            return Err(SagaError::Persistence(ClientError::Injected(
                "state store unavailable".to_string(),
            )));
        }

        state.entries.insert(key.clone(), value.clone());
        Ok(())
    }
}

/// State store reached through the sidecar state API.
///
/// Sends `[{"key": id, "value": payload}]` to `{base}/v1.0/state/{store}`.
#[derive(Debug, Clone)]
pub struct HttpStateStore {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl HttpStateStore {
    pub fn new(config: &StateStoreConfig) -> Result<Self, SagaError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            endpoint: config.endpoint(),
            retry: config.retry,
        })
    }
}

#[async_trait]
impl StateStore for HttpStateStore {
    async fn put(
        &self,
        key: &OrderId,
        value: &OrderPayload,
        ctx: &CorrelationContext,
    ) -> Result<(), SagaError> {
        let body = json!([{ "key": key, "value": value }]);
        let client = &self.client;
        let endpoint = self.endpoint.as_str();
        let body = &body;

        self.retry
            .run("state_store.put", move || post_json(client, endpoint, body, ctx))
            .await
            .map(|_| ())
            .map_err(SagaError::Persistence)
    }
}
