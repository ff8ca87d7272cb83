//! Request ID policy.
//!
//! # Responsibilities
//! - Ensure every request carries a request ID header (UUID v4 when absent)
//! - Expose the ID to later policies and origins via request properties
//!
//! # Design Decisions
//! - Applied as early as possible (first global request policy) for tracing
//! - An incoming ID is trusted unless `overwrite` is set

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::http::Request;
use crate::policy::{PolicyResult, RequestPolicy};

/// Default request ID header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Property key under which the [`RequestId`] is stored.
pub const REQUEST_ID_PROPERTY: &str = "request_id";

/// A request identifier, as stored in request properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for [`RequestIdPolicy`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestIdOptions {
    /// Header carrying the ID.
    pub header: String,

    /// Replace an ID supplied by the client.
    pub overwrite: bool,
}

impl Default for RequestIdOptions {
    fn default() -> Self {
        Self {
            header: X_REQUEST_ID.to_string(),
            overwrite: false,
        }
    }
}

/// Stamps requests with a request ID.
#[derive(Debug, Clone)]
pub struct RequestIdPolicy {
    header: HeaderName,
    overwrite: bool,
}

impl RequestIdPolicy {
    pub fn new(options: RequestIdOptions) -> GatewayResult<Self> {
        let header = HeaderName::from_bytes(options.header.as_bytes())
            .map_err(|e| GatewayError::policy("request_id", e))?;
        Ok(Self {
            header,
            overwrite: options.overwrite,
        })
    }
}

#[async_trait]
impl<C: Send + Sync> RequestPolicy<C> for RequestIdPolicy {
    fn name(&self) -> &str {
        "request_id"
    }

    async fn transform(&self, mut request: Request, _ctx: &C) -> GatewayResult<PolicyResult> {
        let existing = if self.overwrite {
            None
        } else {
            request
                .headers()
                .get(&self.header)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(|v| RequestId(v.to_string()))
        };

        let id = match existing {
            Some(id) => id,
            None => {
                let id = RequestId::new_v4();
                // A hyphenated UUID is always a valid header value
                let value = HeaderValue::from_str(id.as_str())
                    .map_err(|e| GatewayError::policy("request_id", e))?;
                request.headers_mut().insert(self.header.clone(), value);
                id
            }
        };

        request.properties_mut().insert(REQUEST_ID_PROPERTY, id);
        Ok(PolicyResult::Request(request))
    }
}
