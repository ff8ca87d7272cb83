//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway
//! host. All types derive Serde traits for deserialization from TOML files.
//! Capability options (matchers, origins, policies) reuse the options structs
//! of the capabilities themselves, so defaults live in one place.

use serde::{Deserialize, Serialize};

use crate::origin::{FixedOriginOptions, UrlOriginOptions};
use crate::policy::{RequestIdOptions, RequireHeaderOptions, SetHeadersOptions};
use crate::routing::{HostnameMatcherOptions, PathMatcherOptions};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Host-level timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions. Order does not affect matching.
    pub routes: Vec<RouteConfig>,

    /// Origin used when no route matches.
    pub default_origin: OriginConfig,

    /// Global policy chains wrapping every request.
    pub policies: PolicyChainConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body buffered before dispatch.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration for the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for one request/response exchange, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One route: matcher, origin and local policies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    pub matcher: MatcherConfig,

    pub origin: OriginConfig,

    /// Route-local policy chains.
    #[serde(default)]
    pub policies: PolicyChainConfig,
}

/// A matcher: either a bare path prefix or a typed table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MatcherConfig {
    PathPrefix(String),
    Typed(TypedMatcherConfig),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypedMatcherConfig {
    Path(PathMatcherOptions),
    Hostname(HostnameMatcherOptions),
    /// All inner matchers must match.
    All { matchers: Vec<MatcherConfig> },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OriginConfig {
    Url(UrlOriginOptions),
    Fixed(FixedOriginOptions),
}

impl Default for OriginConfig {
    fn default() -> Self {
        OriginConfig::Fixed(FixedOriginOptions::default())
    }
}

/// Request and response policy chains, applied in listed order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyChainConfig {
    pub request: Vec<RequestPolicyConfig>,
    pub response: Vec<ResponsePolicyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestPolicyConfig {
    RequestId(RequestIdOptions),
    RequireHeader(RequireHeaderOptions),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePolicyConfig {
    SetHeaders(SetHeadersOptions),
}
