//! Error types for pool construction and health probing.

use thiserror::Error;

/// Errors raised while building an endpoint pool.
///
/// Both variants are construction-time failures: once a pool exists, none of
/// its operations fail.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The supplied endpoints or heartbeat settings are invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A required collaborator (the scheduler) could not be obtained.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl PoolError {
    /// Return true for input validation failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, PoolError::Configuration(_))
    }
}

/// Invalid pool input.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No endpoints were supplied.
    #[error("endpoint list must not be empty")]
    NoEndpoints,

    /// An endpoint URI was empty or blank.
    #[error("endpoint URI must not be empty")]
    EmptyUri,

    /// An endpoint URI failed to parse.
    #[error("invalid endpoint URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// The heartbeat interval must be greater than zero.
    #[error("heartbeat interval must be greater than zero")]
    InvalidInterval,
}

/// Unexpected failure while probing a single endpoint.
///
/// An endpoint that simply does not answer is reported as
/// [`Availability::Unavailable`](crate::health::state::Availability), not as an error.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe request could not be constructed or sent.
    #[error("probe request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The transport handle cannot be used for probing.
    #[error("transport error: {0}")]
    Transport(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
