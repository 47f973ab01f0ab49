//! Tracing bootstrap and shutdown handling shared by every binary.

use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Service identity and log settings.
///
/// Reads from environment variables:
/// - `OTEL_SERVICE_NAME` — service name (default: the binary's name)
/// - `OTEL_SERVICE_VERSION` — service version (default: `"0.1.0"`)
/// - `DEPLOY_ENV` — deployment environment tag (default: `"dev"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `json` or `pretty` (default: `pretty`)
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub deployment_environment: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl TelemetryConfig {
    /// Loads configuration from the process environment.
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_lookup(default_service_name, |key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(default_service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| default_service_name.to_string()),
            service_version: lookup("OTEL_SERVICE_VERSION").unwrap_or_else(|| "0.1.0".to_string()),
            deployment_environment: lookup("DEPLOY_ENV").unwrap_or_else(|| "dev".to_string()),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }
}

/// Installs the global tracing subscriber and logs the service identity.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(
        service.name = %config.service_name,
        service.version = %config.service_version,
        deployment.environment = %config.deployment_environment,
        "telemetry initialized"
    );
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_values() {
        let config = TelemetryConfig::from_lookup("ordersvc", |_| None);
        assert_eq!(config.service_name, "ordersvc");
        assert_eq!(config.service_version, "0.1.0");
        assert_eq!(config.deployment_environment, "dev");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("OTEL_SERVICE_NAME", "orders-blue"),
            ("OTEL_SERVICE_VERSION", "1.4.2"),
            ("DEPLOY_ENV", "prod"),
            ("LOG_FORMAT", "JSON"),
        ]
        .into_iter()
        .collect();
        let config =
            TelemetryConfig::from_lookup("ordersvc", |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.service_name, "orders-blue");
        assert_eq!(config.service_version, "1.4.2");
        assert_eq!(config.deployment_environment, "prod");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
