//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (after global request policies)
//!     → matcher.rs (evaluate match conditions, all routes concurrently)
//!     → route.rs (local request policies → origin → local response policies)
//!     → Return: Response, or no route selected (gateway falls back)
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Selection is a race: the first matcher to answer "yes" wins, regardless
//!   of its position in the route list

pub mod matcher;
pub mod route;

pub use matcher::{
    AllMatcher, HostnameMatcher, HostnameMatcherOptions, Matcher, PathMatcher, PathMatcherOptions,
};
pub use route::{Route, RouteMatcher};
