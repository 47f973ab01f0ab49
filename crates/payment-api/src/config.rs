//! Payment service configuration loaded from environment variables.

/// Default probability that a charge fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `PAYMENT_FAILURE_RATE` — probability in `[0, 1]` that a charge fails
///   (default: `0.1`; out-of-range values are clamped)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub failure_rate: f64,
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
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            failure_rate: clamp_rate(
                lookup("PAYMENT_FAILURE_RATE")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_FAILURE_RATE),
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

/// Keeps a rate usable as a probability. NaN falls back to the default.
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        DEFAULT_FAILURE_RATE
    } else {
        rate.clamp(0.0, 1.0)
    }
}
