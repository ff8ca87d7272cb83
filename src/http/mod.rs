//! HTTP values and the host server.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body buffering, client info)
//!     → request.rs (gateway Request value)
//!     → [gateway dispatch pipeline]
//!     → response.rs (gateway Response value → axum response)
//!     → Send to client
//! ```

pub mod properties;
pub mod request;
pub mod response;
pub mod server;

pub use properties::Properties;
pub use request::Request;
pub use response::Response;
pub use server::{ClientInfo, HttpServer};
