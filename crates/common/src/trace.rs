//! W3C Trace Context propagation and per-request correlation.
//!
//! Every hop (gateway, order service, payment, state store, pub/sub) sees the
//! same trace id through the `traceparent` header:
//! `{version}-{trace_id}-{parent_id}-{trace_flags}`, e.g.
//! `00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::types::OrderId;

/// W3C Trace Context header name.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Trace flags bit indicating the trace is sampled.
pub const TRACE_FLAG_SAMPLED: u8 = 0x01;

/// Trace identity of the current unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// W3C trace ID (32 hex chars).
    pub trace_id: String,
    /// Span ID of this hop (16 hex chars).
    pub span_id: String,
    /// Span ID of the caller, if the trace was continued from a header.
    pub parent_span_id: Option<String>,
    /// W3C trace flags (bit 0 = sampled).
    pub trace_flags: u8,
}

impl TraceContext {
    /// Starts a new trace with random trace and span IDs.
    pub fn new() -> Self {
        Self {
            trace_id: generate_trace_id(),
            span_id: generate_span_id(),
            parent_span_id: None,
            trace_flags: TRACE_FLAG_SAMPLED,
        }
    }

    /// Creates a child span: same trace ID, this span becomes the parent.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: generate_span_id(),
            parent_span_id: Some(self.span_id.clone()),
            trace_flags: self.trace_flags,
        }
    }

    /// Continues the trace carried by an inbound `traceparent` value, or
    /// starts a new one when the header is missing or malformed.
    pub fn from_header(traceparent: Option<&str>) -> Self {
        match traceparent.map(parse_traceparent) {
            Some(Ok(remote)) => remote.child(),
            Some(Err(e)) => {
                tracing::debug!(error = %e, "ignoring malformed traceparent, starting new trace");
                Self::new()
            }
            None => Self::new(),
        }
    }

    /// Returns true if the sampled flag is set.
    pub fn is_sampled(&self) -> bool {
        self.trace_flags & TRACE_FLAG_SAMPLED != 0
    }

    /// Formats the context as a `traceparent` header value.
    pub fn to_traceparent(&self) -> String {
        format!("00-{}-{}-{:02x}", self.trace_id, self.span_id, self.trace_flags)
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_traceparent())
    }
}

/// Errors produced while parsing a `traceparent` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceParseError {
    #[error("traceparent header has invalid format")]
    InvalidFormat,
    #[error("traceparent version is unsupported")]
    UnsupportedVersion,
    #[error("trace_id is all zeros")]
    InvalidTraceId,
    #[error("parent_id is all zeros")]
    InvalidParentId,
}

/// Parses a W3C `traceparent` header value.
///
/// The returned context's `span_id` is the remote caller's span; use
/// [`TraceContext::child`] before doing work under it.
pub fn parse_traceparent(value: &str) -> Result<TraceContext, TraceParseError> {
    let parts: Vec<&str> = value.trim().split('-').collect();
    if parts.len() < 4 {
        return Err(TraceParseError::InvalidFormat);
    }

    let version = parts[0];
    if version.len() != 2 || !is_lower_hex(version) {
        return Err(TraceParseError::InvalidFormat);
    }
    if version == "ff" {
        return Err(TraceParseError::UnsupportedVersion);
    }
    // Later versions may append fields; version 00 has exactly four.
    if version == "00" && parts.len() != 4 {
        return Err(TraceParseError::InvalidFormat);
    }

    let trace_id = parts[1];
    if trace_id.len() != 32 || !is_lower_hex(trace_id) {
        return Err(TraceParseError::InvalidFormat);
    }
    if trace_id.bytes().all(|b| b == b'0') {
        return Err(TraceParseError::InvalidTraceId);
    }

    let parent_id = parts[2];
    if parent_id.len() != 16 || !is_lower_hex(parent_id) {
        return Err(TraceParseError::InvalidFormat);
    }
    if parent_id.bytes().all(|b| b == b'0') {
        return Err(TraceParseError::InvalidParentId);
    }

    let flags = parts[3];
    if flags.len() != 2 || !is_lower_hex(flags) {
        return Err(TraceParseError::InvalidFormat);
    }
    let trace_flags = u8::from_str_radix(flags, 16).map_err(|_| TraceParseError::InvalidFormat)?;

    Ok(TraceContext {
        trace_id: trace_id.to_string(),
        span_id: parent_id.to_string(),
        parent_span_id: None,
        trace_flags,
    })
}

/// Request-scoped identity threaded through one saga run.
///
/// Built once when the order id is known and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationContext {
    trace: TraceContext,
    order_id: OrderId,
}

impl CorrelationContext {
    pub fn new(trace: TraceContext, order_id: OrderId) -> Self {
        Self { trace, order_id }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace.trace_id
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Header value for an outbound call: a fresh child span of this request.
    pub fn traceparent(&self) -> String {
        self.trace.child().to_traceparent()
    }
}

fn generate_trace_id() -> String {
    hex_encode(Uuid::new_v4().as_bytes())
}

fn generate_span_id() -> String {
    hex_encode(&Uuid::new_v4().as_bytes()[..8])
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
