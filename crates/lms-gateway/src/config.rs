//! Gateway configuration types.
//!
//! Values come from environment variables; anything unset or unparsable
//! keeps its default.

use std::time::Duration;

use lms_auth::AuthConfig;
use lms_service::ServiceConfig;
use serde::Deserialize;

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:5000").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Allowed CORS origins. `*` allows any origin.
    #[serde(default = "GatewayConfig::default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Whether to load the demo dataset on startup.
    #[serde(default = "GatewayConfig::default_seed")]
    pub seed_demo_data: bool,

    /// Delay added to every API request, in milliseconds.
    #[serde(default)]
    pub simulated_latency_ms: u64,

    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:5000".to_string()
    }

    fn default_cors_origins() -> Vec<String> {
        vec!["*".to_string()]
    }

    const fn default_max_body() -> usize {
        25 * 1024 * 1024 // 25 MiB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_seed() -> bool {
        true
    }

    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(secret) = lookup("TOKEN_SECRET") {
            config.auth.token_secret = secret;
        }

        parse_into(&lookup, "MAX_BODY_BYTES", &mut config.max_body_bytes);
        parse_into(&lookup, "REQUEST_TIMEOUT_SECS", &mut config.request_timeout_seconds);
        parse_into(&lookup, "TOKEN_TTL_SECS", &mut config.auth.token_ttl_seconds);
        parse_into(&lookup, "SEED_DEMO_DATA", &mut config.seed_demo_data);
        parse_into(&lookup, "SIMULATED_LATENCY_MS", &mut config.simulated_latency_ms);

        config
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the simulated latency as a `Duration`.
    #[must_use]
    pub const fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// The service configuration derived from this gateway configuration.
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            auth: self.auth.clone(),
            simulated_latency_ms: self.simulated_latency_ms,
            ..ServiceConfig::default()
        }
    }
}

fn parse_into<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "Ignoring unparsable setting"),
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: Self::default_cors_origins(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            seed_demo_data: Self::default_seed(),
            simulated_latency_ms: 0,
            auth: AuthConfig::default(),
        }
    }
}
