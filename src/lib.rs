//! Client-side endpoint pool with health-checked failover.
//!
//! Distributes outbound requests across a fixed set of backend base URIs,
//! excludes endpoints callers report as failing, and periodically re-probes
//! the excluded ones so they can rejoin the rotation.

pub mod config;
pub mod error;
pub mod health;
pub mod load_balancer;
pub mod observability;
pub mod scheduler;

pub use config::PoolConfig;
pub use error::{ConfigurationError, PoolError, ProbeError};
pub use health::{Availability, AvailabilityStrategy, HeartbeatProber, HttpAvailabilityStrategy};
pub use load_balancer::{create_pool, Endpoint, EndpointPool, EndpointPoolFactory, PoolStatus};
pub use scheduler::{CancelHandle, Scheduler, TokioScheduler};
