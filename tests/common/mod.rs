//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Bytes, extract::Request as AxumRequest, routing::any, Json, Router};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use policy_gateway::http::{Request, Response};
use policy_gateway::{GatewayResult, Matcher, Origin, PolicyResult, RequestPolicy, ResponsePolicy};

/// Start a backend that echoes what it received as JSON:
/// `{ "method", "uri", "headers": {name: value}, "body" }`.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(request: AxumRequest) -> Json<Value> {
        let (parts, body) = request.into_parts();
        let body: Bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
        let headers: BTreeMap<String, String> = parts
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        Json(json!({
            "method": parts.method.as_str(),
            "uri": parts.uri.to_string(),
            "headers": headers,
            "body": String::from_utf8_lossy(&body),
        }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/", any(echo)).route("/{*path}", any(echo));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a raw backend that waits `delay` before writing a fixed response.
pub async fn start_slow_backend(delay: Duration, response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let response_str = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.len(),
                    response
                );
                let _ = socket.write_all(response_str.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Build a GET request for `uri`.
pub fn get(uri: &str) -> Request {
    Request::new(axum::http::Method::GET, uri.parse().unwrap())
}

/// Shared, ordered log of policy invocations.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Request policy that journals its name and appends it to `x-trail`.
pub struct TrailRequest {
    pub name: String,
    pub journal: Journal,
}

#[async_trait]
impl RequestPolicy for TrailRequest {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transform(&self, mut request: Request, _ctx: &()) -> GatewayResult<PolicyResult> {
        self.journal.record(format!("req:{}", self.name));
        request
            .headers_mut()
            .append("x-trail", self.name.parse().unwrap());
        Ok(PolicyResult::Request(request))
    }
}

/// Response policy that journals its name and appends it to `x-trail`.
pub struct TrailResponse {
    pub name: String,
    pub journal: Journal,
}

#[async_trait]
impl ResponsePolicy for TrailResponse {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transform(&self, mut response: Response, _ctx: &()) -> GatewayResult<Response> {
        self.journal.record(format!("resp:{}", self.name));
        response
            .headers_mut()
            .append("x-trail", self.name.parse().unwrap());
        Ok(response)
    }
}

/// Request policy that always answers with a fixed response.
pub struct Deny {
    pub status: axum::http::StatusCode,
    pub body: &'static str,
}

#[async_trait]
impl RequestPolicy for Deny {
    fn name(&self) -> &str {
        "deny"
    }

    async fn transform(&self, _request: Request, _ctx: &()) -> GatewayResult<PolicyResult> {
        Ok(PolicyResult::Response(Response::new(self.status, self.body)))
    }
}

/// Matcher that settles with `result` after `delay`, counting evaluations.
pub struct DelayedMatcher {
    pub delay: Duration,
    pub result: bool,
    pub calls: Arc<AtomicUsize>,
}

impl DelayedMatcher {
    pub fn new(delay: Duration, result: bool) -> Self {
        Self {
            delay,
            result,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Matcher for DelayedMatcher {
    fn name(&self) -> &str {
        "delayed"
    }

    async fn matches(&self, _request: &Request, _ctx: &()) -> GatewayResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.result)
    }
}

/// Origin that answers with a fixed body and counts executions.
pub struct CountingOrigin {
    pub body: &'static str,
    pub calls: Arc<AtomicUsize>,
}

impl CountingOrigin {
    pub fn new(body: &'static str) -> Self {
        Self {
            body,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Origin for CountingOrigin {
    fn name(&self) -> &str {
        "counting"
    }

    async fn execute(&self, request: Request, _ctx: &()) -> GatewayResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut response = Response::new(axum::http::StatusCode::OK, self.body);
        for value in request.headers().get_all("x-trail") {
            response.headers_mut().append("x-origin-saw", value.clone());
        }
        Ok(response)
    }
}
