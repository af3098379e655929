//! Heartbeat probing of blacklisted endpoints.
//!
//! # Responsibilities
//! - On every tick, probe each blacklisted endpoint
//! - Restore endpoints the strategy reports available
//! - Contain probe errors and panics so one endpoint cannot stop the tick

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;

use crate::health::strategy::AvailabilityStrategy;
use crate::load_balancer::pool::EndpointPool;
use crate::observability::metrics;
use crate::scheduler::ScheduledTask;

/// Periodic recovery task for one pool.
///
/// Holds the pool weakly: once the pool is dropped, ticks do nothing.
pub struct HeartbeatProber<T> {
    pool: Weak<EndpointPool>,
    transport: T,
    strategy: Arc<dyn AvailabilityStrategy<T>>,
}

impl<T> HeartbeatProber<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(pool: Weak<EndpointPool>, transport: T, strategy: Arc<dyn AvailabilityStrategy<T>>) -> Self {
        Self {
            pool,
            transport,
            strategy,
        }
    }

    /// Probe every currently blacklisted endpoint once.
    ///
    /// Returns the number of endpoints restored.
    pub async fn tick(&self) -> usize {
        let Some(pool) = self.pool.upgrade() else {
            return 0;
        };

        let blacklisted = pool.list_blacklisted();
        if blacklisted.is_empty() {
            return 0;
        }

        tracing::debug!(count = blacklisted.len(), "Probing blacklisted endpoints");

        let mut restored = 0;
        for endpoint in &blacklisted {
            // The strategy call itself sits inside the unwind boundary too.
            let probe = async { self.strategy.is_endpoint_available(endpoint, &self.transport).await };

            match AssertUnwindSafe(probe).catch_unwind().await {
                Ok(Ok(availability)) => {
                    metrics::record_probe(availability.as_str());
                    if !availability.is_available() {
                        tracing::debug!(endpoint = %endpoint, "Endpoint still unavailable");
                    } else if pool.restore(endpoint) {
                        metrics::record_recovered(endpoint.base_uri());
                        restored += 1;
                    }
                }
                Ok(Err(e)) => {
                    metrics::record_probe("error");
                    tracing::warn!(endpoint = %endpoint, error = %e, "Availability probe failed");
                }
                Err(_) => {
                    metrics::record_probe("panic");
                    tracing::error!(endpoint = %endpoint, "Availability probe panicked");
                }
            }
        }
        restored
    }

    /// Wrap the prober as a scheduler task.
    pub fn into_task(self) -> ScheduledTask {
        let prober = Arc::new(self);
        Box::new(move || {
            let prober = prober.clone();
            Box::pin(async move {
                prober.tick().await;
            })
        })
    }
}
