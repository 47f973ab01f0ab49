//! Gateway configuration loaded from environment variables.

use std::time::Duration;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `DAPR_HTTP_PORT` — local sidecar port (default: `3500`)
/// - `ORDER_SERVICE_URL` — full URL of the order endpoint (default: the
///   sidecar's invoke route for `ordersvc`)
/// - `UPSTREAM_TIMEOUT_MS` — bound on one forwarded call (default: `10000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub order_service_url: String,
    pub upstream_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let order_service_url = lookup("ORDER_SERVICE_URL").unwrap_or_else(|| {
            let dapr_port = lookup("DAPR_HTTP_PORT").unwrap_or_else(|| "3500".to_string());
            format!("http://localhost:{dapr_port}/v1.0/invoke/ordersvc/method/api/order")
        });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            order_service_url,
            upstream_timeout: Duration::from_millis(
                lookup("UPSTREAM_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10_000),
            ),
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
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(
            config.order_service_url,
            "http://localhost:3500/v1.0/invoke/ordersvc/method/api/order"
        );
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_sidecar_port_override() {
        let config = Config::from_lookup(|key| (key == "DAPR_HTTP_PORT").then(|| "3999".to_string()));
        assert_eq!(
            config.order_service_url,
            "http://localhost:3999/v1.0/invoke/ordersvc/method/api/order"
        );
    }

    #[test]
    fn test_explicit_order_service_url() {
        let config = Config::from_lookup(|key| match key {
            "ORDER_SERVICE_URL" => Some("http://ordersvc:8080/api/order".to_string()),
            "DAPR_HTTP_PORT" => Some("3999".to_string()),
            "UPSTREAM_TIMEOUT_MS" => Some("250".to_string()),
            _ => None,
        });
        assert_eq!(config.order_service_url, "http://ordersvc:8080/api/order");
        assert_eq!(config.upstream_timeout, Duration::from_millis(250));
    }
}
