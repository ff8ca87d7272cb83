//! Origin that answers every request with the same configured response.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::http::{Request, Response};
use crate::origin::Origin;

/// Options for [`FixedOrigin`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FixedOriginOptions {
    pub status: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for FixedOriginOptions {
    fn default() -> Self {
        Self {
            status: 404,
            body: "not found".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

/// Returns a fixed response without contacting any backend.
#[derive(Debug, Clone)]
pub struct FixedOrigin {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FixedOrigin {
    pub fn new(options: FixedOriginOptions) -> GatewayResult<Self> {
        let status = StatusCode::from_u16(options.status)
            .map_err(|e| GatewayError::InvalidTarget(format!("fixed origin status: {}", e)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::InvalidTarget(format!("fixed origin header: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| GatewayError::InvalidTarget(format!("fixed origin header: {}", e)))?;
            headers.insert(name, value);
        }

        Ok(Self {
            status,
            headers,
            body: Bytes::from(options.body),
        })
    }

    /// Shorthand for a header-less fixed response.
    pub fn with_status(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl<C: Send + Sync> Origin<C> for FixedOrigin {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn execute(&self, _request: Request, _ctx: &C) -> GatewayResult<Response> {
        let mut response = Response::new(self.status, self.body.clone());
        response.headers_mut().extend(self.headers.clone());
        Ok(response)
    }
}
