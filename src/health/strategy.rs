//! Availability strategies.
//!
//! # Responsibilities
//! - Decide whether one endpoint can serve traffic again
//! - Enforce the probe's own timeout (the pool imposes none)

use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::time;

use crate::error::ProbeError;
use crate::health::state::Availability;
use crate::load_balancer::endpoint::Endpoint;

/// Health check policy invoked for each blacklisted endpoint.
///
/// `T` is the transport handle the heartbeat was configured with; it is
/// passed through unchanged on every probe.
pub trait AvailabilityStrategy<T>: Send + Sync {
    /// Probe `endpoint` using `transport`.
    fn is_endpoint_available<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        transport: &'a T,
    ) -> BoxFuture<'a, Result<Availability, ProbeError>>;
}

/// Probes an endpoint with an HTTP GET below its base URI.
#[derive(Debug, Clone)]
pub struct HttpAvailabilityStrategy {
    path: String,
    timeout: Duration,
}

impl HttpAvailabilityStrategy {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    async fn probe(&self, endpoint: &Endpoint, client: &reqwest::Client) -> Result<Availability, ProbeError> {
        let uri = endpoint.build_uri(&[self.path.as_str()]);
        let response_future = client.get(&uri).send();

        match time::timeout(self.timeout, response_future).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(endpoint = %endpoint, status = %response.status(), "Availability probe failed: non-success status");
                }
                Ok(Availability::from(success))
            }
            Ok(Err(e)) if e.is_builder() => Err(ProbeError::Request(e)),
            Ok(Err(e)) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Availability probe failed: connection error");
                Ok(Availability::Unavailable)
            }
            Err(_) => {
                tracing::warn!(endpoint = %endpoint, timeout = ?self.timeout, "Availability probe failed: timeout");
                Ok(Availability::Unavailable)
            }
        }
    }
}

impl Default for HttpAvailabilityStrategy {
    fn default() -> Self {
        Self::new("/health", Duration::from_secs(5))
    }
}

impl AvailabilityStrategy<reqwest::Client> for HttpAvailabilityStrategy {
    fn is_endpoint_available<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        transport: &'a reqwest::Client,
    ) -> BoxFuture<'a, Result<Availability, ProbeError>> {
        Box::pin(self.probe(endpoint, transport))
    }
}
