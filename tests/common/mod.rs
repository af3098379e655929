//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use endpoint_pool::scheduler::{CancelHandle, ScheduledTask, Scheduler};
use endpoint_pool::{Availability, AvailabilityStrategy, Endpoint, ProbeError};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` decides the status code and body of every response.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Scheduler that records its task and runs it only when asked.
#[derive(Default)]
pub struct ManualScheduler {
    task: Mutex<Option<ScheduledTask>>,
    pub intervals: Mutex<Vec<Duration>>,
    pub cancels: Arc<AtomicUsize>,
}

impl ManualScheduler {
    /// Run one tick of the scheduled task, if any.
    pub async fn run_tick(&self) {
        let future = {
            let mut task = self.task.lock().unwrap();
            task.as_mut().map(|task| task())
        };
        if let Some(future) = future {
            future.await;
        }
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

struct CountingCancel(Arc<AtomicUsize>);

impl CancelHandle for CountingCancel {
    fn cancel(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_with_fixed_delay(&self, task: ScheduledTask, interval: Duration) -> Box<dyn CancelHandle> {
        *self.task.lock().unwrap() = Some(task);
        self.intervals.lock().unwrap().push(interval);
        Box::new(CountingCancel(self.cancels.clone()))
    }
}

/// Strategy reporting endpoints available once they are marked healthy.
#[derive(Default)]
pub struct StubStrategy {
    healthy: Mutex<HashSet<String>>,
    pub probes: AtomicUsize,
}

impl StubStrategy {
    pub fn mark_healthy(&self, uri: &str) {
        self.healthy.lock().unwrap().insert(uri.trim_end_matches('/').to_string());
    }

    pub fn mark_unhealthy(&self, uri: &str) {
        self.healthy.lock().unwrap().remove(uri.trim_end_matches('/'));
    }
}

impl AvailabilityStrategy<&'static str> for StubStrategy {
    fn is_endpoint_available<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        _transport: &'a &'static str,
    ) -> BoxFuture<'a, Result<Availability, ProbeError>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let healthy = self.healthy.lock().unwrap().contains(endpoint.base_uri());
        Box::pin(async move { Ok(Availability::from(healthy)) })
    }
}
