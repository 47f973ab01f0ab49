//! Shared building blocks for the order services.
//!
//! Everything here is used by more than one process: order identifiers,
//! W3C trace context propagation, order payload parsing, the tracing
//! bootstrap each binary runs at startup and the health/metrics routes.

pub mod http;
pub mod payload;
pub mod telemetry;
pub mod trace;
pub mod types;

pub use payload::{OrderPayload, PayloadError, parse_payload};
pub use telemetry::{LogFormat, TelemetryConfig};
pub use trace::{CorrelationContext, TRACEPARENT_HEADER, TraceContext, TraceParseError};
pub use types::OrderId;
