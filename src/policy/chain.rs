//! Policy-chain application shared by the gateway and its routes.

use std::sync::Arc;

use crate::error::GatewayResult;
use crate::http::{Request, Response};
use crate::policy::{PolicyResult, RequestPolicy, ResponsePolicy};

/// Run `request` through `policies` in order.
///
/// Each policy receives the request produced by the previous one. The first
/// policy that answers with [`PolicyResult::Response`] ends the chain and
/// later policies never run. An empty chain returns the request unchanged.
pub async fn apply_request_policies<C: Send + Sync>(
    request: Request,
    ctx: &C,
    policies: &[Arc<dyn RequestPolicy<C>>],
) -> GatewayResult<PolicyResult> {
    let mut current = request;
    for policy in policies {
        let result = policy.transform(current, ctx).await.inspect_err(|e| {
            tracing::debug!(policy = policy.name(), error = %e, "Request policy failed");
        })?;

        match result {
            PolicyResult::Request(next) => current = next,
            PolicyResult::Response(response) => {
                tracing::debug!(
                    policy = policy.name(),
                    status = %response.status(),
                    "Request policy short-circuited"
                );
                return Ok(PolicyResult::Response(response));
            }
        }
    }
    Ok(PolicyResult::Request(current))
}

/// Run `response` through `policies` in order. No short-circuit exists on
/// this side; an empty chain returns the response unchanged.
pub async fn apply_response_policies<C: Send + Sync>(
    response: Response,
    ctx: &C,
    policies: &[Arc<dyn ResponsePolicy<C>>],
) -> GatewayResult<Response> {
    let mut current = response;
    for policy in policies {
        current = policy.transform(current, ctx).await.inspect_err(|e| {
            tracing::debug!(policy = policy.name(), error = %e, "Response policy failed");
        })?;
    }
    Ok(current)
}
