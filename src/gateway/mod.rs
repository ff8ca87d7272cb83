//! Dispatch orchestration.
//!
//! # Data Flow
//! ```text
//! caller's &Request
//!     → clone (the caller's value is never touched)
//!     → global request policies ──── short-circuit ───┐
//!     → race all route matchers                        │
//!         ├─ winner → Route::handle                    │
//!         └─ none   → default origin                   │
//!     → global response policies ◀─────────────────────┘
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Immutable after `build()`; share one `Arc<Gateway>` across tasks
//! - Matchers race inside the calling task; the first `Ok(true)` wins and
//!   the remaining matcher futures are dropped
//! - A failing or panicking matcher counts as "no match"
//! - No central timeout; origins carry their own deadlines

mod builder;

pub use builder::GatewayBuilder;

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;

use crate::error::GatewayResult;
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::origin::Origin;
use crate::policy::{apply_request_policies, apply_response_policies, PolicyResult, RequestPolicy, ResponsePolicy};
use crate::routing::Route;

/// Label recorded when a global request policy answers before routing.
const SHORT_CIRCUIT: &str = "short_circuit";

/// Label recorded when no route matched.
const DEFAULT_ORIGIN: &str = "default";

/// Top-level orchestrator: global policies, route selection, origin dispatch.
///
/// `C` is the caller-defined context handed unchanged to every matcher,
/// policy and origin during one [`handle`](Gateway::handle) call.
pub struct Gateway<C: Send + Sync = ()> {
    routes: Vec<Route<C>>,
    default_origin: Arc<dyn Origin<C>>,
    request_policies: Vec<Arc<dyn RequestPolicy<C>>>,
    response_policies: Vec<Arc<dyn ResponsePolicy<C>>>,
}

impl<C: Send + Sync + 'static> Gateway<C> {
    pub fn builder() -> GatewayBuilder<C> {
        GatewayBuilder::default()
    }

    pub fn routes(&self) -> &[Route<C>] {
        &self.routes
    }

    /// Dispatch one request.
    pub async fn handle(&self, request: &Request, ctx: &C) -> GatewayResult<Response> {
        let start = Instant::now();
        match self.dispatch(request.clone(), ctx).await {
            Ok((target, response)) => {
                metrics::record_dispatch(target, response.status().as_u16(), start);
                Ok(response)
            }
            Err(e) => {
                metrics::record_dispatch_error();
                Err(e)
            }
        }
    }

    async fn dispatch(&self, request: Request, ctx: &C) -> GatewayResult<(&str, Response)> {
        let (target, response) = match apply_request_policies(request, ctx, &self.request_policies).await? {
            PolicyResult::Response(early) => (SHORT_CIRCUIT, early),
            PolicyResult::Request(request) => match self.match_route(&request, ctx).await {
                Some(route) => (route.name(), route.handle(request, ctx).await?),
                None => {
                    tracing::debug!(
                        path = %request.path(),
                        origin = self.default_origin.name(),
                        "No route matched, using default origin"
                    );
                    (DEFAULT_ORIGIN, self.default_origin.execute(request, ctx).await?)
                }
            },
        };

        let response = apply_response_policies(response, ctx, &self.response_policies).await?;
        Ok((target, response))
    }

    /// Start every route's matcher concurrently and return the route whose
    /// matcher is first to settle as a match.
    async fn match_route(&self, request: &Request, ctx: &C) -> Option<&Route<C>> {
        let mut pending: FuturesUnordered<_> = self
            .routes
            .iter()
            .map(|route| async move {
                let outcome = AssertUnwindSafe(route.matches(request, ctx)).catch_unwind().await;
                (route, outcome)
            })
            .collect();

        while let Some((route, outcome)) = pending.next().await {
            match outcome {
                Ok(Ok(true)) => {
                    tracing::debug!(route = %route.name(), path = %request.path(), "Route matched");
                    return Some(route);
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(route = %route.name(), error = %e, "Matcher failed, treating as no match");
                    metrics::record_matcher_failure(route.name());
                }
                Err(_) => {
                    tracing::warn!(route = %route.name(), "Matcher panicked, treating as no match");
                    metrics::record_matcher_failure(route.name());
                }
            }
        }
        None
    }
}

impl<C: Send + Sync> fmt::Debug for Gateway<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("routes", &self.routes)
            .field("default_origin", &self.default_origin.name())
            .field("request_policies", &self.request_policies.len())
            .field("response_policies", &self.response_policies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::origin::FixedOrigin;
    use crate::routing::Matcher;
    use async_trait::async_trait;
    use axum::http::{Method, StatusCode};

    struct Broken;

    #[async_trait]
    impl Matcher for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn matches(&self, _request: &Request, _ctx: &()) -> GatewayResult<bool> {
            Err(GatewayError::matcher("broken", "lookup failed"))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Matcher for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn matches(&self, _request: &Request, _ctx: &()) -> GatewayResult<bool> {
            panic!("matcher bug");
        }
    }

    fn fixed(status: StatusCode, body: &'static str) -> Arc<dyn Origin> {
        Arc::new(FixedOrigin::with_status(status, body))
    }

    fn get(uri: &str) -> Request {
        Request::new(Method::GET, uri.parse().unwrap())
    }

    #[test]
    fn test_build_requires_default_origin() {
        let result = Gateway::<()>::builder().build();
        assert!(matches!(result, Err(GatewayError::MissingDefaultOrigin)));
    }

    #[tokio::test]
    async fn test_failing_matchers_fall_back_to_default() {
        let broken: Arc<dyn Matcher> = Arc::new(Broken);
        let panicking: Arc<dyn Matcher> = Arc::new(Panicking);
        let gateway = Gateway::builder()
            .route(Route::new(broken, fixed(StatusCode::OK, "broken")))
            .route(Route::new(panicking, fixed(StatusCode::OK, "panicking")))
            .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
            .build()
            .unwrap();

        let resp = gateway.handle(&get("/"), &()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failing_matcher_does_not_block_a_match() {
        let broken: Arc<dyn Matcher> = Arc::new(Broken);
        let gateway = Gateway::builder()
            .route(Route::new(broken, fixed(StatusCode::OK, "broken")))
            .route(Route::new("/", fixed(StatusCode::OK, "root")))
            .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
            .build()
            .unwrap();

        let resp = gateway.handle(&get("/x"), &()).await.unwrap();
        assert_eq!(resp.text(), "root");
    }

    #[test]
    fn test_unnamed_routes_get_distinct_names() {
        let gateway: Gateway = Gateway::builder()
            .route(Route::new("/a", fixed(StatusCode::OK, "a")))
            .route(Route::new("/b", fixed(StatusCode::OK, "b")).named("billing"))
            .route(Route::new("/c", fixed(StatusCode::OK, "c")))
            .default_origin(fixed(StatusCode::NOT_FOUND, "not found"))
            .build()
            .unwrap();

        let names: Vec<&str> = gateway.routes().iter().map(Route::name).collect();
        assert_eq!(names, ["path-0", "billing", "path-2"]);
    }

    #[tokio::test]
    async fn test_no_routes_uses_default() {
        let gateway: Gateway = Gateway::builder()
            .default_origin(fixed(StatusCode::IM_A_TEAPOT, "default"))
            .build()
            .unwrap();

        let resp = gateway.handle(&get("/anything"), &()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    }
}
