//! Header-based access policy.
//!
//! Rejects requests that lack a required header (or carry the wrong value)
//! with an early response, so nothing downstream runs. The accepted header
//! value can be stashed in request properties for later policies and origins.

use async_trait::async_trait;
use axum::http::{HeaderName, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::http::{Request, Response};
use crate::policy::{PolicyResult, RequestPolicy};

/// Options for [`RequireHeaderPolicy`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequireHeaderOptions {
    /// Header that must be present.
    pub header: String,

    /// Exact value the header must carry. Any value is accepted when unset.
    pub expected: Option<String>,

    /// Status of the rejection response.
    pub status: u16,

    /// Body of the rejection response.
    pub body: String,

    /// Property key to store the accepted header value under.
    pub property: Option<String>,
}

impl Default for RequireHeaderOptions {
    fn default() -> Self {
        Self {
            header: "authorization".to_string(),
            expected: None,
            status: 401,
            body: "unauthorized".to_string(),
            property: None,
        }
    }
}

/// Short-circuits requests that fail a header check.
#[derive(Debug, Clone)]
pub struct RequireHeaderPolicy {
    header: HeaderName,
    expected: Option<String>,
    status: StatusCode,
    body: String,
    property: Option<String>,
}

impl RequireHeaderPolicy {
    pub fn new(options: RequireHeaderOptions) -> GatewayResult<Self> {
        let header = HeaderName::from_bytes(options.header.as_bytes())
            .map_err(|e| GatewayError::policy("require_header", e))?;
        let status = StatusCode::from_u16(options.status)
            .map_err(|e| GatewayError::policy("require_header", e))?;
        Ok(Self {
            header,
            expected: options.expected,
            status,
            body: options.body,
            property: options.property,
        })
    }

    fn reject(&self) -> PolicyResult {
        PolicyResult::Response(Response::new(self.status, self.body.clone()))
    }
}

#[async_trait]
impl<C: Send + Sync> RequestPolicy<C> for RequireHeaderPolicy {
    fn name(&self) -> &str {
        "require_header"
    }

    async fn transform(&self, mut request: Request, _ctx: &C) -> GatewayResult<PolicyResult> {
        let value = match request.headers().get(&self.header).map(|v| v.to_str()) {
            Some(Ok(v)) => v.to_string(),
            Some(Err(_)) => {
                tracing::debug!(header = %self.header, "Rejected request: non-ASCII header value");
                return Ok(self.reject());
            }
            None => {
                tracing::debug!(header = %self.header, "Rejected request: missing header");
                return Ok(self.reject());
            }
        };

        if let Some(expected) = &self.expected {
            if &value != expected {
                tracing::debug!(header = %self.header, "Rejected request: header mismatch");
                return Ok(self.reject());
            }
        }

        if let Some(key) = &self.property {
            request.properties_mut().insert(key.clone(), value);
        }
        Ok(PolicyResult::Request(request))
    }
}
