//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Endpoint URIs are checked with the same parser the pool uses

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PoolConfig;
use crate::error::ConfigurationError;
use crate::load_balancer::endpoint::Endpoint;

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one endpoint is required")]
    NoEndpoints,

    #[error("endpoints[{index}]: {source}")]
    Endpoint {
        index: usize,
        #[source]
        source: ConfigurationError,
    },

    #[error("heartbeat.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("heartbeat.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid observability.metrics_address '{0}'")]
    MetricsAddress(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for (index, uri) in config.endpoints.iter().enumerate() {
        if let Err(source) = Endpoint::parse(uri) {
            errors.push(ValidationError::Endpoint { index, source });
        }
    }

    if config.heartbeat.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.heartbeat.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
