//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller needs a backend
//!     → pool.rs (get next available endpoint)
//!         - round_robin.rs (advance shared cursor)
//!     → endpoint.rs (build target URI)
//!     → caller issues request with its own transport
//!     → on failure: pool.blacklist(endpoint)
//! ```
//!
//! # Design Decisions
//! - The endpoint set is fixed at construction; only its partition changes
//! - Blacklisted endpoints are excluded until the heartbeat restores them
//! - An empty pool is a normal state, reported as `None`, never an error

pub mod endpoint;
pub mod factory;
pub mod pool;
pub mod round_robin;

pub use endpoint::Endpoint;
pub use factory::{create_pool, EndpointPoolFactory};
pub use pool::{EndpointPool, PoolStatus};
