//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Caller request fails
//!     → pool.blacklist(endpoint)
//!
//! Heartbeat (active.rs):
//!     Scheduler tick
//!     → snapshot pool.list_blacklisted()
//!     → strategy.rs probes each endpoint (no lock held)
//!     → pool.unblacklist(endpoint) for every Available result
//! ```
//!
//! # Design Decisions
//! - One task drives recovery for every blacklisted endpoint
//! - Probing is best effort: errors and panics are contained per endpoint
//! - Only blacklisted endpoints are probed; healthy ones are never touched

pub mod active;
pub mod state;
pub mod strategy;

pub use active::HeartbeatProber;
pub use state::Availability;
pub use strategy::{AvailabilityStrategy, HttpAvailabilityStrategy};
