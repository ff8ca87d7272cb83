//! Policy Gateway Library
//!
//! An HTTP gateway dispatch core: global request policies, a concurrent
//! route-matching race, per-route policies and origins, global response
//! policies. The same pipeline runs embedded (`Gateway::handle`) or behind
//! the bundled axum host (`HttpServer`).

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod observability;
pub mod origin;
pub mod policy;
pub mod routing;

pub use config::GatewayConfig;
pub use error::{BoxError, GatewayError, GatewayResult};
pub use gateway::{Gateway, GatewayBuilder};
pub use http::{ClientInfo, HttpServer, Properties, Request, Response};
pub use origin::{FixedOrigin, Origin, UrlOrigin};
pub use policy::{
    apply_request_policies, apply_response_policies, PolicyResult, RequestPolicy, ResponsePolicy,
};
pub use routing::{Matcher, Route};
