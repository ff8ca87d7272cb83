//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway, routes, policies, origins produce:
//!     → tracing events (structured log lines)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/exporters is the binary's job
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
