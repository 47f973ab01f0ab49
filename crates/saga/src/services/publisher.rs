//! Event publisher trait, in-memory and HTTP implementations.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::CorrelationContext;
use serde_json::Value;

use super::http::{build_client, post_json};
use crate::config::PublisherConfig;
use crate::error::{ClientError, SagaError};

/// Announces facts to a topic.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        message: &Value,
        ctx: &CorrelationContext,
    ) -> Result<(), SagaError>;
}

/// A publish attempt seen by [`InMemoryEventPublisher`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub topic: String,
    pub message: Value,
    pub trace_id: String,
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    events: Vec<RecordedEvent>,
    fail_on_publish: bool,
    latency: Option<Duration>,
}

/// In-memory event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory event publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject subsequent publishes.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Delays every publish by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of publish attempts, failed ones included.
    pub fn publish_count(&self) -> usize {
        self.state.read().unwrap().events.len()
    }

    /// Returns every publish attempt in call order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.read().unwrap().events.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        message: &Value,
        ctx: &CorrelationContext,
    ) -> Result<(), SagaError> {
        let latency = self.state.read().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().unwrap();
        state.events.push(RecordedEvent {
            topic: topic.to_string(),
            message: message.clone(),
            trace_id: ctx.trace_id().to_string(),
        });

        if state.fail_on_publish {
            return Err(SagaError::Publish(ClientError::Injected(
                "event bus unavailable".to_string(),
            )));
        }
        Ok(())
    }
}

/// Publisher reached through the sidecar pub/sub API.
///
/// POSTs the message to `{base}/v1.0/publish/{pubsub}/{topic}`.
#[derive(Debug, Clone)]
pub struct HttpEventPublisher {
    client: reqwest::Client,
    config: PublisherConfig,
}

impl HttpEventPublisher {
    pub fn new(config: &PublisherConfig) -> Result<Self, SagaError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        message: &Value,
        ctx: &CorrelationContext,
    ) -> Result<(), SagaError> {
        let endpoint = self.config.endpoint(topic);
        let client = &self.client;
        let url = endpoint.as_str();

        self.config
            .retry
            .run("publisher.publish", move || post_json(client, url, message, ctx))
            .await
            .map(|_| ())
            .map_err(SagaError::Publish)
    }
}

#[cfg(test)]
mod tests {
    use common::{OrderId, TraceContext};
    use serde_json::json;

    use super::*;

    fn ctx() -> CorrelationContext {
        CorrelationContext::new(TraceContext::new(), OrderId::new("abc"))
    }

    #[tokio::test]
    async fn test_records_published_events() {
        let publisher = InMemoryEventPublisher::new();
        publisher
            .publish("order.created", &json!({"id": "abc"}), &ctx())
            .await
            .unwrap();

        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, "order.created");
        assert_eq!(events[0].message, json!({"id": "abc"}));
    }

    #[tokio::test]
    async fn test_fail_on_publish_still_records_attempt() {
        let publisher = InMemoryEventPublisher::new();
        publisher.set_fail_on_publish(true);

        let result = publisher
            .publish("order.created", &json!({"id": "abc"}), &ctx())
            .await;

        assert!(matches!(result, Err(SagaError::Publish(_))));
        assert_eq!(publisher.publish_count(), 1);
    }
}
