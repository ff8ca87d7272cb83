//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → build.rs (matchers, origins, policies → Gateway)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the host binary reads config; the gateway core is built in code

pub mod build;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    GatewayConfig, ListenerConfig, LogFormat, MatcherConfig, ObservabilityConfig, OriginConfig,
    PolicyChainConfig, RequestPolicyConfig, ResponsePolicyConfig, RouteConfig, TimeoutConfig,
    TypedMatcherConfig,
};
pub use validation::{validate_config, ValidationError};
