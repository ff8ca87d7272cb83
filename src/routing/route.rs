//! A routable unit: matcher + origin + route-local policy chains.
//!
//! # Design Decisions
//! - Immutable after construction, shared across concurrent calls
//! - Local policies run inside the gateway's global policies, never instead
//! - A plain string matcher is shorthand for a path-prefix matcher

use std::fmt;
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::http::{Request, Response};
use crate::origin::Origin;
use crate::policy::{apply_request_policies, apply_response_policies, PolicyResult, RequestPolicy, ResponsePolicy};
use crate::routing::matcher::{AllMatcher, HostnameMatcher, Matcher, PathMatcher};

/// Matcher accepted by [`Route::new`]: any matcher, or a path prefix.
pub enum RouteMatcher<C: Send + Sync = ()> {
    Matcher(Arc<dyn Matcher<C>>),
    PathPrefix(String),
}

impl<C: Send + Sync + 'static> RouteMatcher<C> {
    fn into_matcher(self) -> Arc<dyn Matcher<C>> {
        match self {
            RouteMatcher::Matcher(matcher) => matcher,
            RouteMatcher::PathPrefix(prefix) => Arc::new(PathMatcher::prefix(prefix)),
        }
    }
}

impl<C: Send + Sync> From<&str> for RouteMatcher<C> {
    fn from(prefix: &str) -> Self {
        RouteMatcher::PathPrefix(prefix.to_string())
    }
}

impl<C: Send + Sync> From<String> for RouteMatcher<C> {
    fn from(prefix: String) -> Self {
        RouteMatcher::PathPrefix(prefix)
    }
}

impl<C: Send + Sync> From<Arc<dyn Matcher<C>>> for RouteMatcher<C> {
    fn from(matcher: Arc<dyn Matcher<C>>) -> Self {
        RouteMatcher::Matcher(matcher)
    }
}

impl<C: Send + Sync + 'static> From<PathMatcher> for RouteMatcher<C> {
    fn from(matcher: PathMatcher) -> Self {
        RouteMatcher::Matcher(Arc::new(matcher))
    }
}

impl<C: Send + Sync + 'static> From<HostnameMatcher> for RouteMatcher<C> {
    fn from(matcher: HostnameMatcher) -> Self {
        RouteMatcher::Matcher(Arc::new(matcher))
    }
}

impl<C: Send + Sync + 'static> From<AllMatcher<C>> for RouteMatcher<C> {
    fn from(matcher: AllMatcher<C>) -> Self {
        RouteMatcher::Matcher(Arc::new(matcher))
    }
}

/// Binds one matcher and one origin with optional local policy chains.
pub struct Route<C: Send + Sync = ()> {
    name: Option<String>,
    matcher: Arc<dyn Matcher<C>>,
    origin: Arc<dyn Origin<C>>,
    request_policies: Vec<Arc<dyn RequestPolicy<C>>>,
    response_policies: Vec<Arc<dyn ResponsePolicy<C>>>,
}

impl<C: Send + Sync + 'static> Route<C> {
    pub fn new(matcher: impl Into<RouteMatcher<C>>, origin: Arc<dyn Origin<C>>) -> Self {
        Self {
            name: None,
            matcher: matcher.into().into_matcher(),
            origin,
            request_policies: Vec::new(),
            response_policies: Vec::new(),
        }
    }

    /// Set the name used in logs and metrics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_request_policy(mut self, policy: Arc<dyn RequestPolicy<C>>) -> Self {
        self.request_policies.push(policy);
        self
    }

    pub fn with_response_policy(mut self, policy: Arc<dyn ResponsePolicy<C>>) -> Self {
        self.response_policies.push(policy);
        self
    }

    /// Replace both local chains at once.
    pub fn with_policies(
        mut self,
        request: Vec<Arc<dyn RequestPolicy<C>>>,
        response: Vec<Arc<dyn ResponsePolicy<C>>>,
    ) -> Self {
        self.request_policies = request;
        self.response_policies = response;
        self
    }

    /// Explicit name, or the matcher's name until the gateway assigns one.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.matcher.name())
    }

    /// Name an unnamed route after its matcher and position.
    pub(crate) fn name_by_position(&mut self, index: usize) {
        if self.name.is_none() {
            self.name = Some(format!("{}-{}", self.matcher.name(), index));
        }
    }

    /// Whether this route is eligible for `request`.
    pub async fn matches(&self, request: &Request, ctx: &C) -> GatewayResult<bool> {
        self.matcher.matches(request, ctx).await
    }

    /// Local request chain, then the origin (unless short-circuited), then
    /// the local response chain.
    pub async fn handle(&self, request: Request, ctx: &C) -> GatewayResult<Response> {
        let response = match apply_request_policies(request, ctx, &self.request_policies).await? {
            PolicyResult::Response(early) => early,
            PolicyResult::Request(request) => {
                tracing::debug!(route = %self.name(), origin = self.origin.name(), "Executing route origin");
                self.origin.execute(request, ctx).await?
            }
        };
        apply_response_policies(response, ctx, &self.response_policies).await
    }
}

impl<C: Send + Sync> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name.as_deref().unwrap_or_else(|| self.matcher.name()))
            .field("matcher", &self.matcher.name())
            .field("origin", &self.origin.name())
            .field("request_policies", &self.request_policies.len())
            .field("response_policies", &self.response_policies.len())
            .finish()
    }
}
