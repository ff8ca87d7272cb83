//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//! - Check that every URL, header name and header value can be used
//! - Detect duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use thiserror::Error;

use crate::config::schema::{
    GatewayConfig, MatcherConfig, OriginConfig, PolicyChainConfig, RequestPolicyConfig,
    ResponsePolicyConfig, TypedMatcherConfig,
};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),

    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),

    #[error("{0}: timeout must be greater than zero")]
    ZeroTimeout(String),

    #[error("route name must not be empty")]
    EmptyRouteName,

    #[error("duplicate route name `{0}`")]
    DuplicateRouteName(String),

    #[error("{context}: path prefix `{prefix}` must start with `/`")]
    InvalidPathPrefix { context: String, prefix: String },

    #[error("{0}: hostname prefix must not be empty")]
    EmptyHostname(String),

    #[error("{context}: invalid upstream url `{url}`: {reason}")]
    InvalidUrl {
        context: String,
        url: String,
        reason: String,
    },

    #[error("{context}: invalid status code {status}")]
    InvalidStatus { context: String, status: u16 },

    #[error("{context}: invalid header `{header}`")]
    InvalidHeader { context: String, header: String },
}

/// Validate `config`, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs".into()));
    }

    let mut names = HashSet::new();
    for route in &config.routes {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyRouteName);
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }

        let context = format!("route `{}`", route.name);
        check_matcher(&route.matcher, &context, &mut errors);
        check_origin(&route.origin, &format!("{} origin", context), &mut errors);
        check_policies(&route.policies, &context, &mut errors);
    }

    check_origin(&config.default_origin, "default origin", &mut errors);
    check_policies(&config.policies, "global", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_matcher(matcher: &MatcherConfig, context: &str, errors: &mut Vec<ValidationError>) {
    let prefix = match matcher {
        MatcherConfig::PathPrefix(prefix) => prefix,
        MatcherConfig::Typed(TypedMatcherConfig::Path(options)) => &options.path,
        MatcherConfig::Typed(TypedMatcherConfig::Hostname(options)) => {
            if options.hostname.is_empty() {
                errors.push(ValidationError::EmptyHostname(context.to_string()));
            }
            return;
        }
        MatcherConfig::Typed(TypedMatcherConfig::All { matchers }) => {
            for inner in matchers {
                check_matcher(inner, context, errors);
            }
            return;
        }
    };

    if !prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPathPrefix {
            context: context.to_string(),
            prefix: prefix.clone(),
        });
    }
}

fn check_origin(origin: &OriginConfig, context: &str, errors: &mut Vec<ValidationError>) {
    match origin {
        OriginConfig::Url(options) => {
            if let Some(raw) = &options.url {
                match url::Url::parse(raw) {
                    Ok(parsed) if parsed.scheme() != "http" => errors.push(ValidationError::InvalidUrl {
                        context: context.to_string(),
                        url: raw.clone(),
                        reason: "only http upstreams are supported".into(),
                    }),
                    Ok(_) => {}
                    Err(e) => errors.push(ValidationError::InvalidUrl {
                        context: context.to_string(),
                        url: raw.clone(),
                        reason: e.to_string(),
                    }),
                }
            }
            if options.timeout_secs == 0 {
                errors.push(ValidationError::ZeroTimeout(context.to_string()));
            }
        }
        OriginConfig::Fixed(options) => {
            check_status(options.status, context, errors);
            check_headers(&options.headers, context, errors);
        }
    }
}

fn check_policies(chain: &PolicyChainConfig, scope: &str, errors: &mut Vec<ValidationError>) {
    for (index, policy) in chain.request.iter().enumerate() {
        let context = format!("{} request policy #{}", scope, index);
        match policy {
            RequestPolicyConfig::RequestId(options) => check_header_name(&options.header, &context, errors),
            RequestPolicyConfig::RequireHeader(options) => {
                check_header_name(&options.header, &context, errors);
                check_status(options.status, &context, errors);
            }
        }
    }

    for (index, policy) in chain.response.iter().enumerate() {
        let context = format!("{} response policy #{}", scope, index);
        match policy {
            ResponsePolicyConfig::SetHeaders(options) => check_headers(&options.headers, &context, errors),
        }
    }
}

fn check_status(status: u16, context: &str, errors: &mut Vec<ValidationError>) {
    if StatusCode::from_u16(status).is_err() {
        errors.push(ValidationError::InvalidStatus {
            context: context.to_string(),
            status,
        });
    }
}

fn check_header_name(name: &str, context: &str, errors: &mut Vec<ValidationError>) {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader {
            context: context.to_string(),
            header: name.to_string(),
        });
    }
}

fn check_headers(headers: &BTreeMap<String, String>, context: &str, errors: &mut Vec<ValidationError>) {
    for (name, value) in headers {
        let valid = HeaderName::from_bytes(name.as_bytes()).is_ok() && HeaderValue::from_str(value).is_ok();
        if !valid {
            errors.push(ValidationError::InvalidHeader {
                context: context.to_string(),
                header: name.clone(),
            });
        }
    }
}
