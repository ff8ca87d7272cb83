//! Turns a validated [`GatewayConfig`] into a [`Gateway`].
//!
//! Every configured capability is built once here; the resulting gateway
//! holds them behind `Arc`s and never consults the config again.

use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::schema::{
    GatewayConfig, MatcherConfig, OriginConfig, PolicyChainConfig, RequestPolicyConfig,
    ResponsePolicyConfig, RouteConfig, TypedMatcherConfig,
};
use crate::error::GatewayResult;
use crate::gateway::Gateway;
use crate::origin::{FixedOrigin, Origin, UrlOrigin};
use crate::policy::{
    RequestIdPolicy, RequestPolicy, RequireHeaderPolicy, ResponsePolicy, SetHeadersPolicy,
};
use crate::routing::{AllMatcher, HostnameMatcher, Matcher, PathMatcher, Route};

type Chains<C> = (Vec<Arc<dyn RequestPolicy<C>>>, Vec<Arc<dyn ResponsePolicy<C>>>);

impl GatewayConfig {
    /// Build a gateway for any context type.
    pub fn build_gateway<C: Send + Sync + 'static>(&self) -> Result<Gateway<C>, ConfigError> {
        let routes = self
            .routes
            .iter()
            .map(build_route)
            .collect::<GatewayResult<Vec<_>>>()?;
        let (request, response) = build_policies(&self.policies)?;

        let gateway = Gateway::builder()
            .routes(routes)
            .default_origin(build_origin(&self.default_origin)?)
            .global_policies(request, response)
            .build()?;

        Ok(gateway)
    }
}

fn build_route<C: Send + Sync + 'static>(config: &RouteConfig) -> GatewayResult<Route<C>> {
    let (request, response) = build_policies(&config.policies)?;
    Ok(Route::new(build_matcher(&config.matcher), build_origin(&config.origin)?)
        .named(config.name.clone())
        .with_policies(request, response))
}

fn build_matcher<C: Send + Sync + 'static>(config: &MatcherConfig) -> Arc<dyn Matcher<C>> {
    match config {
        MatcherConfig::PathPrefix(prefix) => Arc::new(PathMatcher::prefix(prefix.clone())),
        MatcherConfig::Typed(TypedMatcherConfig::Path(options)) => Arc::new(PathMatcher::new(options.clone())),
        MatcherConfig::Typed(TypedMatcherConfig::Hostname(options)) => {
            Arc::new(HostnameMatcher::new(options.clone()))
        }
        MatcherConfig::Typed(TypedMatcherConfig::All { matchers }) => {
            Arc::new(AllMatcher::new(matchers.iter().map(build_matcher).collect()))
        }
    }
}

fn build_origin<C: Send + Sync + 'static>(config: &OriginConfig) -> GatewayResult<Arc<dyn Origin<C>>> {
    let origin: Arc<dyn Origin<C>> = match config {
        OriginConfig::Url(options) => Arc::new(UrlOrigin::new(options.clone())?),
        OriginConfig::Fixed(options) => Arc::new(FixedOrigin::new(options.clone())?),
    };
    Ok(origin)
}

fn build_policies<C: Send + Sync + 'static>(config: &PolicyChainConfig) -> GatewayResult<Chains<C>> {
    let mut request: Vec<Arc<dyn RequestPolicy<C>>> = Vec::with_capacity(config.request.len());
    for policy in &config.request {
        request.push(match policy {
            RequestPolicyConfig::RequestId(options) => Arc::new(RequestIdPolicy::new(options.clone())?),
            RequestPolicyConfig::RequireHeader(options) => Arc::new(RequireHeaderPolicy::new(options.clone())?),
        });
    }

    let mut response: Vec<Arc<dyn ResponsePolicy<C>>> = Vec::with_capacity(config.response.len());
    for policy in &config.response {
        response.push(match policy {
            ResponsePolicyConfig::SetHeaders(options) => Arc::new(SetHeadersPolicy::new(options.clone())?),
        });
    }

    Ok((request, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::http::Request;
    use axum::http::{HeaderValue, Method, StatusCode};

    const CONFIG: &str = r#"
        [[policies.response]]
        type = "set_headers"
        headers = { server = "policy-gateway" }

        [[routes]]
        name = "admin"
        matcher = { type = "all", matchers = ["/admin", { type = "hostname", hostname = "internal." }] }
        origin = { type = "fixed", status = 200, body = "admin" }

        [[routes.policies.request]]
        type = "require_header"
        header = "x-admin-token"
        expected = "secret"
        status = 403
        body = "forbidden"

        [[routes]]
        name = "health"
        matcher = { type = "path", path = "/healthz" }
        origin = { type = "fixed", status = 200, body = "ok" }

        [default_origin]
        type = "fixed"
        status = 404
        body = "not found"
    "#;

    fn request(uri: &str) -> Request {
        Request::new(Method::GET, uri.parse().unwrap())
    }

    #[tokio::test]
    async fn test_build_and_dispatch() {
        let gateway: Gateway = parse_config(CONFIG).unwrap().build_gateway().unwrap();
        assert_eq!(gateway.routes().len(), 2);
        assert_eq!(gateway.routes()[0].name(), "admin");

        let resp = gateway.handle(&request("http://internal.example.com/healthz"), &()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text(), "ok");
        assert_eq!(resp.headers()["server"], "policy-gateway");

        let resp = gateway.handle(&request("http://internal.example.com/admin"), &()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.headers()["server"], "policy-gateway");

        let resp = gateway.handle(&authorized_for("http://internal.example.com/admin"), &()).await.unwrap();
        assert_eq!(resp.text(), "admin");

        // Wrong host: the `all` matcher rejects, so the default origin answers.
        let resp = gateway.handle(&authorized_for("http://public.example.com/admin"), &()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    fn authorized_for(uri: &str) -> Request {
        request(uri).with_header("x-admin-token".parse().unwrap(), HeaderValue::from_static("secret"))
    }

    #[test]
    fn test_build_reports_invalid_capability() {
        let mut config = GatewayConfig::default();
        config.default_origin = OriginConfig::Url(crate::origin::UrlOriginOptions {
            url: Some("not a url".into()),
            ..Default::default()
        });

        let err = config.build_gateway::<()>().unwrap_err();
        assert!(matches!(err, ConfigError::Build(_)));
    }
}
