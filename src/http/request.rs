//! Gateway request value.
//!
//! # Responsibilities
//! - Hold a fully buffered inbound request (method, URI, headers, body)
//! - Carry side-channel [`Properties`] across one dispatch call
//! - Extract routing-relevant information (host, path)
//!
//! # Design Decisions
//! - Body is buffered `Bytes`, so cloning a request is cheap and never
//!   consumes anything the caller still holds
//! - Conversions to and from `http::Request<Bytes>` keep properties in the
//!   message extensions

use axum::http::{self, header, HeaderMap, Method, Uri, Version};
use bytes::Bytes;

use crate::http::Properties;

/// An HTTP request flowing through the gateway.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    properties: Properties,
}

impl Request {
    /// Create a request with empty headers and body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            properties: Properties::new(),
        }
    }

    /// Replace the body, builder style.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header, builder style. Invalid names or values are rejected by
    /// the caller's `HeaderName`/`HeaderValue` construction, not here.
    pub fn with_header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn method_mut(&mut self) -> &mut Method {
        &mut self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn uri_mut(&mut self) -> &mut Uri {
        &mut self.uri
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

    /// The request path (always at least `/`).
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Hostname the request is addressed to.
    ///
    /// Taken from the URI authority for absolute-form requests, otherwise
    /// from the `Host` header with any port removed.
    pub fn host(&self) -> Option<&str> {
        if let Some(host) = self.uri.host() {
            return Some(host);
        }
        self.headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(strip_port)
            .filter(|h| !h.is_empty())
    }

    /// Convert into an `http` request. Properties travel in the extensions.
    pub fn into_http(self) -> http::Request<Bytes> {
        let mut request = http::Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers;
        request.extensions_mut().insert(self.properties);
        request
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (mut parts, body) = request.into_parts();
        let properties = parts.extensions.remove::<Properties>().unwrap_or_default();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
            properties,
        }
    }
}

fn strip_port(host: &str) -> &str {
    // IPv6 literals keep their brackets: "[::1]:8080" -> "[::1]"
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_host_from_absolute_uri() {
        let req = Request::new(Method::GET, "http://api.example.com:8080/v1".parse().unwrap());
        assert_eq!(req.host(), Some("api.example.com"));
        assert_eq!(req.path(), "/v1");
    }

    #[test]
    fn test_host_from_header() {
        let req = Request::new(Method::GET, "/v1".parse().unwrap())
            .with_header(header::HOST, HeaderValue::from_static("api.example.com:8443"));
        assert_eq!(req.host(), Some("api.example.com"));

        let v6 = Request::new(Method::GET, "/".parse().unwrap())
            .with_header(header::HOST, HeaderValue::from_static("[::1]:8080"));
        assert_eq!(v6.host(), Some("[::1]"));

        let none = Request::new(Method::GET, "/".parse().unwrap());
        assert_eq!(none.host(), None);
    }

    #[test]
    fn test_http_conversion_keeps_properties() {
        let mut req = Request::new(Method::POST, "/submit".parse().unwrap()).with_body("payload");
        req.properties_mut().insert("claims", String::from("admin"));

        let http_req = req.into_http();
        assert_eq!(http_req.method(), Method::POST);
        assert_eq!(http_req.body().as_ref(), b"payload");

        let back = Request::from(http_req);
        assert_eq!(back.properties().get::<String>("claims").map(String::as_str), Some("admin"));
    }
}
