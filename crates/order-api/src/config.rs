//! Order service configuration loaded from environment variables.

use std::time::Duration;

use saga::{
    PaymentConfig, PersistencePolicy, PublisherConfig, RetryPolicy, SagaConfig, StateStoreConfig,
    StepTimeouts,
};

/// Server and collaborator configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `DAPR_HTTP_PORT` — local sidecar port used for every collaborator
///   without an explicit URL (default: `3501`)
/// - `STATE_STORE_URL`, `PAYMENT_URL`, `PUBSUB_URL` — per-collaborator base URLs
/// - `STATE_STORE_NAME` (`statestore`), `PAYMENT_APP_ID` (`paymentsvc`),
///   `PUBSUB_NAME` (`pubsub`)
/// - `STATE_STORE_TIMEOUT_MS` (`2000`), `PAYMENT_TIMEOUT_MS` (`5000`),
///   `PUBSUB_TIMEOUT_MS` (`2000`)
/// - `STATE_STORE_MAX_RETRIES`, `PUBSUB_MAX_RETRIES` (`0`),
///   `RETRY_BACKOFF_MS` (`100`)
/// - `PERSISTENCE_POLICY` — `best-effort` or `required` (default: `best-effort`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub state_store: StateStoreConfig,
    pub payment: PaymentConfig,
    pub publisher: PublisherConfig,
    pub saga: SagaConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| {
            lookup(key).and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring unparseable setting");
                    None
                }
            })
        };
        let millis = |key: &str, default: u64| Duration::from_millis(parsed(key).unwrap_or(default));
        let retries = |key: &str| {
            let attempts = parsed(key).unwrap_or(0).min(u64::from(u8::MAX)) as u8;
            RetryPolicy::retries_with_backoff(attempts, parsed("RETRY_BACKOFF_MS").unwrap_or(100))
        };

        let sidecar = format!(
            "http://localhost:{}",
            lookup("DAPR_HTTP_PORT").unwrap_or_else(|| "3501".to_string())
        );
        let base_url = |key: &str| lookup(key).unwrap_or_else(|| sidecar.clone());

        let state_store = StateStoreConfig {
            base_url: base_url("STATE_STORE_URL"),
            store_name: lookup("STATE_STORE_NAME").unwrap_or_else(|| "statestore".to_string()),
            timeout: millis("STATE_STORE_TIMEOUT_MS", 2000),
            retry: retries("STATE_STORE_MAX_RETRIES"),
        };
        let payment = PaymentConfig {
            base_url: base_url("PAYMENT_URL"),
            app_id: lookup("PAYMENT_APP_ID").unwrap_or_else(|| "paymentsvc".to_string()),
            timeout: millis("PAYMENT_TIMEOUT_MS", 5000),
        };
        let publisher = PublisherConfig {
            base_url: base_url("PUBSUB_URL"),
            pubsub_name: lookup("PUBSUB_NAME").unwrap_or_else(|| "pubsub".to_string()),
            timeout: millis("PUBSUB_TIMEOUT_MS", 2000),
            retry: retries("PUBSUB_MAX_RETRIES"),
        };

        let persistence = match lookup("PERSISTENCE_POLICY").map(|raw| raw.parse()) {
            Some(Ok(policy)) => policy,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "falling back to best-effort persistence");
                PersistencePolicy::BestEffort
            }
            None => PersistencePolicy::BestEffort,
        };
        let saga = SagaConfig {
            timeouts: StepTimeouts::for_clients(&state_store, &payment, &publisher),
            persistence,
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            state_store,
            payment,
            publisher,
            saga,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(
            config.state_store.endpoint(),
            "http://localhost:3501/v1.0/state/statestore"
        );
        assert_eq!(
            config.payment.endpoint(),
            "http://localhost:3501/v1.0/invoke/paymentsvc/method/api/pay"
        );
        assert_eq!(config.publisher.retry, RetryPolicy::NoRetry);
        assert_eq!(config.saga, SagaConfig::default());
    }

    #[test]
    fn test_sidecar_port_moves_every_collaborator() {
        let config = config_from(&[("DAPR_HTTP_PORT", "3600")]);
        assert_eq!(config.state_store.base_url, "http://localhost:3600");
        assert_eq!(config.payment.base_url, "http://localhost:3600");
        assert_eq!(config.publisher.base_url, "http://localhost:3600");
    }

    #[test]
    fn test_explicit_urls_win_over_sidecar() {
        let config = config_from(&[
            ("DAPR_HTTP_PORT", "3600"),
            ("PAYMENT_URL", "http://payments:9000"),
            ("PAYMENT_APP_ID", "billing"),
        ]);
        assert_eq!(
            config.payment.endpoint(),
            "http://payments:9000/v1.0/invoke/billing/method/api/pay"
        );
        assert_eq!(config.state_store.base_url, "http://localhost:3600");
    }

    #[test]
    fn test_retries_and_deadlines() {
        let config = config_from(&[
            ("STATE_STORE_TIMEOUT_MS", "100"),
            ("STATE_STORE_MAX_RETRIES", "2"),
            ("RETRY_BACKOFF_MS", "10"),
            ("PAYMENT_TIMEOUT_MS", "750"),
        ]);
        assert_eq!(
            config.state_store.retry,
            RetryPolicy::retries_with_backoff(2, 10)
        );
        // 3 attempts of 100ms plus 10ms + 20ms of backoff
        assert_eq!(config.saga.timeouts.persist, Duration::from_millis(330));
        assert_eq!(config.saga.timeouts.payment, Duration::from_millis(750));
    }

    #[test]
    fn test_persistence_policy() {
        let required = config_from(&[("PERSISTENCE_POLICY", "required")]);
        assert_eq!(required.saga.persistence, PersistencePolicy::Required);

        let unknown = config_from(&[("PERSISTENCE_POLICY", "maybe")]);
        assert_eq!(unknown.saga.persistence, PersistencePolicy::BestEffort);
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = config_from(&[("PORT", "http"), ("PAYMENT_TIMEOUT_MS", "soon")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.payment.timeout, Duration::from_secs(5));
    }
}
