//! Shared HTTP plumbing for the collaborator clients.

use std::time::Duration;

use common::{CorrelationContext, TRACEPARENT_HEADER};
use serde::Serialize;

use crate::error::{ClientError, SagaError};

/// Builds a pooled client with a per-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, SagaError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SagaError::InvalidConfig(e.to_string()))
}

/// POSTs `body` as JSON with the request's `traceparent`.
///
/// Any non-2xx answer becomes [`ClientError::Status`] carrying the body.
pub(crate) async fn post_json<B>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
    ctx: &CorrelationContext,
) -> Result<reqwest::Response, ClientError>
where
    B: Serialize + ?Sized,
{
    let response = client
        .post(url)
        .header(TRACEPARENT_HEADER, ctx.traceparent())
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}
