//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pool and heartbeat produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or configured level)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users
//!   and tests pay nothing
//! - Per-endpoint labels use the normalized base URI

pub mod logging;
pub mod metrics;
