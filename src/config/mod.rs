//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → PoolConfig (validated, immutable)
//!     → EndpointPoolFactory::create_from_config
//! ```
//!
//! # Design Decisions
//! - Pools are rebuilt from configuration on every start; nothing is persisted
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::HeartbeatConfig;
pub use schema::ObservabilityConfig;
pub use schema::PoolConfig;
