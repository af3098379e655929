//! Probe outcome.
//!
//! # States
//! - Available: endpoint answers and may be returned to the pool
//! - Unavailable: endpoint stays blacklisted until the next heartbeat
//!
//! # State Transitions
//! ```text
//! available → blacklisted: caller reports a failed request
//! blacklisted → available: heartbeat probe reports Available
//! ```

use serde::Serialize;

/// Result of a single availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    /// Return true if the endpoint may serve traffic again.
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }

    /// Metric label for this outcome.
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Unavailable => "unavailable",
        }
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }
}
