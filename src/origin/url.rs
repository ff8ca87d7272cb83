//! URL-forwarding origin.
//!
//! # Responsibilities
//! - Rewrite the request target (configured URL or the request's own target)
//! - Strip hop-by-hop headers in both directions
//! - Forward over a pooled hyper client and buffer the upstream response
//!
//! # Design Decisions
//! - Without a configured URL the request goes where it was addressed
//! - A configured URL replaces the target exactly unless `preserve_path`
//!   asks for the inbound path and query to be appended
//! - Plain HTTP only; TLS to upstreams is out of scope
//! - Every call has a deadline (`timeout_secs`) covering request and body

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Uri, Version};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::http::{Properties, Request, Response};
use crate::origin::Origin;

/// Headers that only apply to a single connection hop.
static HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Options for [`UrlOrigin`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlOriginOptions {
    /// Target URL. The request's own target is used when unset.
    pub url: Option<String>,

    /// Append the inbound path and query to `url`.
    pub preserve_path: bool,

    /// Deadline for the upstream call in seconds.
    pub timeout_secs: u64,
}

impl Default for UrlOriginOptions {
    fn default() -> Self {
        Self {
            url: None,
            preserve_path: false,
            timeout_secs: 30,
        }
    }
}

/// Forwards requests to an HTTP upstream.
#[derive(Clone)]
pub struct UrlOrigin {
    base: Option<::url::Url>,
    preserve_path: bool,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl UrlOrigin {
    pub fn new(options: UrlOriginOptions) -> GatewayResult<Self> {
        let base = match options.url.as_deref() {
            Some(raw) => {
                let url = ::url::Url::parse(raw)
                    .map_err(|e| GatewayError::InvalidTarget(format!("{}: {}", raw, e)))?;
                if url.scheme() != "http" {
                    return Err(GatewayError::InvalidTarget(format!(
                        "{}: only http upstreams are supported",
                        raw
                    )));
                }
                Some(url)
            }
            None => None,
        };

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            base,
            preserve_path: options.preserve_path,
            timeout: Duration::from_secs(options.timeout_secs),
            client,
        })
    }

    /// Resolve the upstream URI for `request`.
    pub fn target(&self, request: &Request) -> GatewayResult<Uri> {
        let Some(base) = &self.base else {
            return own_target(request);
        };

        let mut url = base.clone();
        if self.preserve_path {
            let path = format!("{}{}", base.path().trim_end_matches('/'), request.path());
            url.set_path(&path);
            // Configured query first, inbound query after it.
            let query = match (base.query().filter(|q| !q.is_empty()), request.uri().query()) {
                (Some(configured), Some(inbound)) => Some(format!("{}&{}", configured, inbound)),
                (configured, inbound) => configured.or(inbound).map(str::to_string),
            };
            url.set_query(query.as_deref());
        }
        url.as_str()
            .parse::<Uri>()
            .map_err(|e| GatewayError::InvalidTarget(e.to_string()))
    }
}

impl std::fmt::Debug for UrlOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlOrigin")
            .field("base", &self.base.as_ref().map(::url::Url::as_str))
            .field("preserve_path", &self.preserve_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl<C: Send + Sync> Origin<C> for UrlOrigin {
    fn name(&self) -> &str {
        "url"
    }

    async fn execute(&self, request: Request, _ctx: &C) -> GatewayResult<Response> {
        let uri = self.target(&request)?;
        tracing::debug!(target_uri = %uri, method = %request.method(), "Forwarding request");

        let (mut parts, body) = request.into_http().into_parts();
        parts.uri = uri;
        parts.version = Version::HTTP_11;
        parts.extensions.remove::<Properties>();
        strip_hop_by_hop(&mut parts.headers);
        if self.base.is_some() {
            // Let the client derive Host from the rewritten target
            parts.headers.remove(header::HOST);
        }
        let outbound = axum::http::Request::from_parts(parts, Body::from(body));

        let exchange = async {
            let response = self.client.request(outbound).await?;
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|e| GatewayError::Body(e.to_string()))?;
            Ok::<_, GatewayError>(axum::http::Response::from_parts(parts, bytes))
        };

        let upstream = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        let mut response = Response::from(upstream);
        strip_hop_by_hop(response.headers_mut());
        tracing::debug!(status = %response.status(), "Upstream responded");
        Ok(response)
    }
}

/// Target taken from the request itself: its absolute URI, or the `Host`
/// header plus path for origin-form requests.
fn own_target(request: &Request) -> GatewayResult<Uri> {
    let uri = request.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Ok(uri.clone());
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            GatewayError::InvalidTarget("request has neither an absolute URI nor a Host header".into())
        })?;
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    format!("http://{}{}", host, path_and_query)
        .parse::<Uri>()
        .map_err(|e| GatewayError::InvalidTarget(e.to_string()))
}

/// Remove hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
