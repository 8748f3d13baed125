//! TOML schema for the proxy configuration.
//!
//! Every section is optional; a missing section takes its `Default`.

use serde::{Deserialize, Serialize};

use crate::load_balancer::BalancerKind;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Where proxy traffic is accepted.
    pub listener: ListenerConfig,

    /// Routes registered at startup and on reload.
    pub routes: Vec<RouteConfig>,

    /// Upstream connect and request bounds.
    pub timeouts: TimeoutConfig,

    /// Passive host disabling.
    pub passive_health: PassiveHealthConfig,

    /// Log level and Prometheus exporter.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Proxy listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Socket address for proxy traffic.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A route: input template, output template, balancer and initial hosts.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Input pattern, e.g. "/svc/:id/item/:item".
    pub input: String,

    /// Output pattern, e.g. "/v2/:item/:id".
    pub output: String,

    /// Balancing strategy (default: round_robin).
    #[serde(default)]
    pub balancer: BalancerKind,

    /// Backend addresses ("host:port").
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Upstream timeouts, in whole seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connect bound for a single upstream attempt.
    pub connect_secs: u64,

    /// Bound on waiting for the upstream response head.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Passive failure detection.
///
/// Hosts are disabled after consecutive upstream failures. Re-enabling is
/// done through the admin API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassiveHealthConfig {
    pub enabled: bool,

    /// Consecutive failures (502/503/504, connect errors, timeouts) before disabling.
    pub failure_threshold: usize,
}

impl Default for PassiveHealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 3,
        }
    }
}

/// Logging and metrics.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter level when `RUST_LOG` is unset.
    pub log_level: String,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Exporter listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Runtime route management over HTTP.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,

    /// Expected `Authorization: Bearer` token.
    pub api_key: String,

    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // Placeholder; set a real key before enabling.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
