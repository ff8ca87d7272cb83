//! Gateway response value.
//!
//! # Responsibilities
//! - Hold a buffered response produced by an origin or a short-circuiting policy
//! - Carry side-channel [`Properties`] back through the response chains
//! - Convert into an axum response for the host layer

use axum::http::{self, header, HeaderMap, StatusCode, Version};
use axum::response::IntoResponse;
use bytes::Bytes;

use crate::http::Properties;

/// An HTTP response flowing back through the gateway.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    properties: Properties,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: body.into(),
            properties: Properties::new(),
        }
    }

    /// Add a header, builder style.
    pub fn with_header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusCode {
        &mut self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Bytes {
        &mut self.body
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Body as UTF-8 text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Convert into an `http` response. Properties travel in the extensions.
    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        response.extensions_mut().insert(self.properties);
        response
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(response: http::Response<Bytes>) -> Self {
        let (mut parts, body) = response.into_parts();
        let properties = parts.extensions.remove::<Properties>().unwrap_or_default();
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
            properties,
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let (mut parts, body) = self.into_http().into_parts();
        // Properties are in-process only
        parts.extensions.remove::<Properties>();
        axum::response::Response::from_parts(parts, axum::body::Body::from(body))
    }
}
