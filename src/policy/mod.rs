//! Policy subsystem.
//!
//! # Data Flow
//! ```text
//! Request side (may short-circuit):
//!     PolicyResult::Request(req)
//!     → policy 1 → policy 2 → ... → PolicyResult::Request(req')
//!                    └─ PolicyResult::Response(resp) stops the chain
//!
//! Response side (pure transform):
//!     resp → policy 1 → policy 2 → ... → resp'
//! ```
//!
//! # Design Decisions
//! - Policies are configured once and hold no per-call mutable state
//! - Each step sees the output of the previous step, never the first input
//! - Errors propagate unchanged; the core never swallows or retries

pub mod access;
pub mod chain;
pub mod headers;
pub mod request_id;

pub use access::{RequireHeaderOptions, RequireHeaderPolicy};
pub use chain::{apply_request_policies, apply_response_policies};
pub use headers::{SetHeadersOptions, SetHeadersPolicy};
pub use request_id::{RequestId, RequestIdOptions, RequestIdPolicy};

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::http::{Request, Response};

/// Outcome of one request-policy step.
///
/// `Request` continues the pipeline with the (possibly modified) request,
/// `Response` short-circuits it with an early response.
#[derive(Debug, Clone)]
pub enum PolicyResult {
    Request(Request),
    Response(Response),
}

impl PolicyResult {
    pub fn is_request(&self) -> bool {
        matches!(self, PolicyResult::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, PolicyResult::Response(_))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            PolicyResult::Request(request) => Some(request),
            PolicyResult::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            PolicyResult::Request(_) => None,
            PolicyResult::Response(response) => Some(response),
        }
    }

    pub fn into_request(self) -> Option<Request> {
        match self {
            PolicyResult::Request(request) => Some(request),
            PolicyResult::Response(_) => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            PolicyResult::Request(_) => None,
            PolicyResult::Response(response) => Some(response),
        }
    }
}

impl From<Request> for PolicyResult {
    fn from(request: Request) -> Self {
        PolicyResult::Request(request)
    }
}

impl From<Response> for PolicyResult {
    fn from(response: Response) -> Self {
        PolicyResult::Response(response)
    }
}

/// A transform applied to requests before dispatch.
///
/// `C` is the caller-supplied context forwarded unchanged through one
/// [`Gateway::handle`](crate::gateway::Gateway::handle) call.
#[async_trait]
pub trait RequestPolicy<C: Send + Sync = ()>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Continue with a request or short-circuit with a response.
    async fn transform(&self, request: Request, ctx: &C) -> GatewayResult<PolicyResult>;
}

/// A transform applied to responses after dispatch.
#[async_trait]
pub trait ResponsePolicy<C: Send + Sync = ()>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn transform(&self, response: Response, ctx: &C) -> GatewayResult<Response>;
}
