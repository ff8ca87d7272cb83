//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive)
//! - Match hostname prefix, e.g. a subdomain (case-insensitive)
//! - Combine matchers with AND semantics
//!
//! # Design Decisions
//! - Matchers only see `&Request`; they cannot mutate it
//! - Hostname matching is case-insensitive (RFC 9110)
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::http::Request;

/// Decides whether a request is eligible for a route.
///
/// An `Err` is treated like `Ok(false)` during route selection.
#[async_trait]
pub trait Matcher<C: Send + Sync = ()>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Returns true if the request matches this condition.
    async fn matches(&self, request: &Request, ctx: &C) -> GatewayResult<bool>;
}

/// Options for [`PathMatcher`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathMatcherOptions {
    /// Path prefix the request path must start with.
    pub path: String,
}

impl Default for PathMatcherOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
        }
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    prefix: String,
}

impl PathMatcher {
    pub fn new(options: PathMatcherOptions) -> Self {
        Self { prefix: options.path }
    }

    /// Shorthand for a matcher on `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(PathMatcherOptions { path: prefix.into() })
    }
}

#[async_trait]
impl<C: Send + Sync> Matcher<C> for PathMatcher {
    fn name(&self) -> &str {
        "path"
    }

    async fn matches(&self, request: &Request, _ctx: &C) -> GatewayResult<bool> {
        Ok(request.path().starts_with(&self.prefix))
    }
}

/// Options for [`HostnameMatcher`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HostnameMatcherOptions {
    /// Prefix the hostname must start with, e.g. `"api."`.
    pub hostname: String,
}

/// Matches a hostname prefix (typically a subdomain).
#[derive(Debug, Clone)]
pub struct HostnameMatcher {
    prefix: String,
}

impl HostnameMatcher {
    /// The prefix is normalized to lowercase for case-insensitive matching.
    pub fn new(options: HostnameMatcherOptions) -> Self {
        Self {
            prefix: options.hostname.to_lowercase(),
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(HostnameMatcherOptions { hostname: prefix.into() })
    }
}

#[async_trait]
impl<C: Send + Sync> Matcher<C> for HostnameMatcher {
    fn name(&self) -> &str {
        "hostname"
    }

    async fn matches(&self, request: &Request, _ctx: &C) -> GatewayResult<bool> {
        Ok(request
            .host()
            .map(|h| h.to_lowercase().starts_with(&self.prefix))
            .unwrap_or(false))
    }
}

/// Combines multiple matchers with AND semantics.
///
/// Evaluated in order and stops at the first rejection. An error from any
/// inner matcher is returned as is.
pub struct AllMatcher<C: Send + Sync = ()> {
    matchers: Vec<Arc<dyn Matcher<C>>>,
}

impl<C: Send + Sync> AllMatcher<C> {
    pub fn new(matchers: Vec<Arc<dyn Matcher<C>>>) -> Self {
        Self { matchers }
    }
}

#[async_trait]
impl<C: Send + Sync> Matcher<C> for AllMatcher<C> {
    fn name(&self) -> &str {
        "all"
    }

    async fn matches(&self, request: &Request, ctx: &C) -> GatewayResult<bool> {
        for matcher in &self.matchers {
            if !matcher.matches(request, ctx).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
