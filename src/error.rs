//! Error types for the dispatch pipeline.
//!
//! The core never turns an error into a response on its own. Errors raised by
//! policies and origins travel unchanged up to the caller of
//! [`Gateway::handle`](crate::gateway::Gateway::handle); matcher errors are the
//! one exception and are folded into "no match" during route selection.

use thiserror::Error;

/// Boxed error used by capability implementations for their own failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while dispatching a request.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A request or response policy refused to continue.
    #[error("policy `{policy}` failed: {source}")]
    Policy {
        policy: String,
        #[source]
        source: BoxError,
    },

    /// A matcher could not evaluate the request.
    #[error("matcher `{matcher}` failed: {source}")]
    Matcher {
        matcher: String,
        #[source]
        source: BoxError,
    },

    /// The upstream target could not be derived from the request or options.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    /// Connection or protocol error talking to the upstream.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The upstream did not answer within the origin's deadline.
    #[error("upstream timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A request or response body could not be read.
    #[error("body error: {0}")]
    Body(String),

    /// The inbound body exceeded the configured limit (in bytes).
    #[error("body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// An `http` builder rejected the assembled message.
    #[error("HTTP error: {0}")]
    Http(#[from] axum::http::Error),

    /// `GatewayBuilder::build` was called without a default origin.
    #[error("gateway has no default origin")]
    MissingDefaultOrigin,

    /// Any other failure reported by a capability implementation.
    #[error(transparent)]
    Other(BoxError),
}

impl GatewayError {
    /// Wrap an arbitrary error raised by a policy.
    pub fn policy(policy: impl Into<String>, source: impl Into<BoxError>) -> Self {
        GatewayError::Policy {
            policy: policy.into(),
            source: source.into(),
        }
    }

    /// Wrap an arbitrary error raised by a matcher.
    pub fn matcher(matcher: impl Into<String>, source: impl Into<BoxError>) -> Self {
        GatewayError::Matcher {
            matcher: matcher.into(),
            source: source.into(),
        }
    }

    /// Wrap an arbitrary error.
    pub fn other(source: impl Into<BoxError>) -> Self {
        GatewayError::Other(source.into())
    }
}

/// Result type alias for pipeline operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
