//! Origin subsystem.
//!
//! # Data Flow
//! ```text
//! Request (after request policies)
//!     → url.rs (rewrite target, forward over HTTP, buffer response)
//!     → fixed.rs (answer locally with a configured response)
//!     → Response (into response policies)
//! ```
//!
//! # Design Decisions
//! - Origins own no cross-call state beyond their immutable configuration
//! - No retry, fallback or circuit breaking; failures go back to the caller
//! - Deadlines are per origin, not enforced by the pipeline

pub mod fixed;
pub mod url;

pub use fixed::{FixedOrigin, FixedOriginOptions};
pub use self::url::{UrlOrigin, UrlOriginOptions};

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::http::{Request, Response};

/// Executes a request against a backend and yields its response.
#[async_trait]
pub trait Origin<C: Send + Sync = ()>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn execute(&self, request: Request, ctx: &C) -> GatewayResult<Response>;
}
