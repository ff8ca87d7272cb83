//! Response header policy.
//!
//! Adds fixed headers (e.g. security headers, `server`) to every response
//! passing through the chain it is attached to.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::http::Response;
use crate::policy::ResponsePolicy;

/// Options for [`SetHeadersPolicy`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SetHeadersOptions {
    /// Header name to value.
    pub headers: BTreeMap<String, String>,

    /// Replace headers already set by the origin.
    pub overwrite: bool,
}

impl Default for SetHeadersOptions {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            overwrite: true,
        }
    }
}

/// Sets configured headers on responses.
#[derive(Debug, Clone)]
pub struct SetHeadersPolicy {
    headers: Vec<(HeaderName, HeaderValue)>,
    overwrite: bool,
}

impl SetHeadersPolicy {
    pub fn new(options: SetHeadersOptions) -> GatewayResult<Self> {
        let headers = options
            .headers
            .iter()
            .map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| GatewayError::policy("set_headers", e))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| GatewayError::policy("set_headers", e))?;
                Ok((name, value))
            })
            .collect::<GatewayResult<Vec<_>>>()?;

        Ok(Self {
            headers,
            overwrite: options.overwrite,
        })
    }
}

#[async_trait]
impl<C: Send + Sync> ResponsePolicy<C> for SetHeadersPolicy {
    fn name(&self) -> &str {
        "set_headers"
    }

    async fn transform(&self, mut response: Response, _ctx: &C) -> GatewayResult<Response> {
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if self.overwrite || !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
        Ok(response)
    }
}
