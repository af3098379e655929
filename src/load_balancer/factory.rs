//! Pool construction.
//!
//! # Responsibilities
//! - Validate endpoint URIs and the heartbeat interval
//! - Wire the pool to its scheduler, transport and availability strategy
//! - Hand back pools only once their heartbeat is scheduled

use std::sync::Arc;
use std::time::Duration;

use crate::config::PoolConfig;
use crate::error::{ConfigurationError, PoolResult};
use crate::health::active::HeartbeatProber;
use crate::health::strategy::AvailabilityStrategy;
use crate::load_balancer::endpoint::Endpoint;
use crate::load_balancer::pool::EndpointPool;
use crate::observability::metrics;
use crate::scheduler::{Scheduler, TokioScheduler};

/// Builds [`EndpointPool`]s on a shared scheduler.
#[derive(Clone)]
pub struct EndpointPoolFactory {
    scheduler: Arc<dyn Scheduler>,
}

impl EndpointPoolFactory {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Factory scheduling heartbeats on the current tokio runtime.
    pub fn from_runtime() -> PoolResult<Self> {
        let scheduler = TokioScheduler::current()?;
        Ok(Self::new(Arc::new(scheduler)))
    }

    /// Validate `endpoints`, build the pool and schedule its heartbeat.
    pub fn create<T, I, S>(
        &self,
        endpoints: I,
        transport: T,
        strategy: Arc<dyn AvailabilityStrategy<T>>,
        interval: Duration,
    ) -> PoolResult<Arc<EndpointPool>>
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints = parse_endpoints(endpoints)?;
        if interval.is_zero() {
            return Err(ConfigurationError::InvalidInterval.into());
        }

        let count = endpoints.len();
        let pool = Arc::new(EndpointPool::new(endpoints));

        let prober = HeartbeatProber::new(Arc::downgrade(&pool), transport, strategy);
        let handle = self
            .scheduler
            .schedule_with_fixed_delay(prober.into_task(), interval);
        pool.attach_heartbeat(handle);
        metrics::record_available(count);

        tracing::info!(
            endpoints = count,
            heartbeat_interval = ?interval,
            "Endpoint pool created"
        );
        Ok(pool)
    }

    /// Build a pool from a loaded configuration file.
    pub fn create_from_config<T>(
        &self,
        config: &PoolConfig,
        transport: T,
        strategy: Arc<dyn AvailabilityStrategy<T>>,
    ) -> PoolResult<Arc<EndpointPool>>
    where
        T: Send + Sync + 'static,
    {
        self.create(
            &config.endpoints,
            transport,
            strategy,
            config.heartbeat.interval(),
        )
    }
}

impl std::fmt::Debug for EndpointPoolFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointPoolFactory").finish_non_exhaustive()
    }
}

/// Create a pool whose heartbeat runs on the current tokio runtime.
pub fn create_pool<T, I, S>(
    endpoints: I,
    transport: T,
    strategy: Arc<dyn AvailabilityStrategy<T>>,
    heartbeat_interval: Duration,
) -> PoolResult<Arc<EndpointPool>>
where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    EndpointPoolFactory::from_runtime()?.create(endpoints, transport, strategy, heartbeat_interval)
}

fn parse_endpoints<I, S>(uris: I) -> Result<Vec<Endpoint>, ConfigurationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let endpoints = uris
        .into_iter()
        .map(|uri| Endpoint::parse(uri.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if endpoints.is_empty() {
        return Err(ConfigurationError::NoEndpoints);
    }
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PoolError, ProbeError};
    use crate::health::state::Availability;
    use crate::scheduler::{CancelHandle, ScheduledTask};
    use futures_util::future::BoxFuture;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingScheduler {
        intervals: Mutex<Vec<Duration>>,
    }

    struct NoopCancel;

    impl CancelHandle for NoopCancel {
        fn cancel(&self) {}
    }

    impl Scheduler for RecordingScheduler {
        fn schedule_with_fixed_delay(&self, _task: ScheduledTask, interval: Duration) -> Box<dyn CancelHandle> {
            self.intervals.lock().unwrap().push(interval);
            Box::new(NoopCancel)
        }
    }

    struct AlwaysAvailable;

    impl AvailabilityStrategy<()> for AlwaysAvailable {
        fn is_endpoint_available<'a>(&'a self, _: &'a Endpoint, _: &'a ()) -> BoxFuture<'a, Result<Availability, ProbeError>> {
            Box::pin(async { Ok(Availability::Available) })
        }
    }

    fn always() -> Arc<dyn AvailabilityStrategy<()>> {
        Arc::new(AlwaysAvailable)
    }

    fn factory() -> (EndpointPoolFactory, Arc<RecordingScheduler>) {
        let scheduler = Arc::new(RecordingScheduler::default());
        (EndpointPoolFactory::new(scheduler.clone()), scheduler)
    }

    #[test]
    fn test_create_schedules_heartbeat() {
        let (factory, scheduler) = factory();
        let pool = factory
            .create(["https://a.example/", "https://b.example"], (), always(), Duration::from_secs(60))
            .unwrap();

        assert_eq!(pool.size(), 2);
        assert!(!pool.is_closed());
        assert_eq!(pool.get().unwrap().base_uri(), "https://a.example");
        assert_eq!(*scheduler.intervals.lock().unwrap(), vec![Duration::from_secs(60)]);
    }

    #[test]
    fn test_empty_list_rejected() {
        let (factory, scheduler) = factory();
        let err = factory
            .create(Vec::<String>::new(), (), always(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, PoolError::Configuration(ConfigurationError::NoEndpoints)));
        assert!(scheduler.intervals.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_uri_rejected() {
        let (factory, _) = factory();
        let err = factory
            .create(["https://a.example", "::nope::"], (), always(), Duration::from_secs(1))
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            PoolError::Configuration(ConfigurationError::InvalidUri { ref uri, .. }) if uri == "::nope::"
        ));

        let err = factory
            .create(["https://a.example", ""], (), always(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, PoolError::Configuration(ConfigurationError::EmptyUri)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let (factory, _) = factory();
        let err = factory
            .create(["https://a.example"], (), always(), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, PoolError::Configuration(ConfigurationError::InvalidInterval)));
    }

    #[test]
    fn test_no_runtime_is_service_unavailable() {
        let err = create_pool(["https://a.example"], (), always(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, PoolError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_create_from_config() {
        let (factory, scheduler) = factory();
        let mut config = PoolConfig::default();
        config.endpoints = vec!["https://a.example".into(), "https://b.example".into()];
        config.heartbeat.interval_secs = 15;

        let pool = factory.create_from_config(&config, (), always()).unwrap();
        assert_eq!(pool.size(), 2);
        assert_eq!(*scheduler.intervals.lock().unwrap(), vec![Duration::from_secs(15)]);
    }

    struct CapturedGauge(Arc<Mutex<Option<f64>>>);

    impl ::metrics::GaugeFn for CapturedGauge {
        fn increment(&self, _value: f64) {}
        fn decrement(&self, _value: f64) {}
        fn set(&self, value: f64) {
            *self.0.lock().unwrap() = Some(value);
        }
    }

    /// Captures the last value of the availability gauge.
    #[derive(Default)]
    struct AvailableGaugeRecorder {
        last: Arc<Mutex<Option<f64>>>,
    }

    impl ::metrics::Recorder for AvailableGaugeRecorder {
        fn describe_counter(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_gauge(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_histogram(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}

        fn register_counter(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Counter {
            ::metrics::Counter::noop()
        }

        fn register_gauge(&self, key: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Gauge {
            if key.name() == "endpoint_pool_available" {
                ::metrics::Gauge::from_arc(Arc::new(CapturedGauge(self.last.clone())))
            } else {
                ::metrics::Gauge::noop()
            }
        }

        fn register_histogram(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Histogram {
            ::metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_create_records_available_gauge() {
        let (factory, _) = factory();
        let recorder = AvailableGaugeRecorder::default();

        let pool = ::metrics::with_local_recorder(&recorder, || {
            factory.create(["https://a.example", "https://b.example", "https://c.example"], (), always(), Duration::from_secs(1))
        })
        .unwrap();

        assert_eq!(pool.size(), 3);
        assert_eq!(*recorder.last.lock().unwrap(), Some(3.0));
    }
}
