//! Endpoint pool management.
//!
//! # Responsibilities
//! - Partition a fixed set of endpoints into available and blacklisted
//! - Select available endpoints round-robin
//! - Own the heartbeat's cancel handle
//!
//! # Locking
//! A single reader-writer lock guards the partition. `get`, `has_any` and the
//! listing methods take the read lock; `blacklist` and `unblacklist` take the
//! write lock. Every method takes exactly one lock kind for its whole body and
//! never performs I/O while holding it. The cursor is atomic and advanced
//! under the read lock.

use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::load_balancer::endpoint::Endpoint;
use crate::load_balancer::round_robin::RoundRobinCursor;
use crate::observability::metrics;
use crate::scheduler::CancelHandle;

#[derive(Debug, Default)]
struct Partition {
    available: Vec<Endpoint>,
    blacklisted: Vec<Endpoint>,
}

/// Point-in-time view of a pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub total: usize,
    pub available: Vec<Endpoint>,
    pub blacklisted: Vec<Endpoint>,
    pub closed: bool,
}

/// Client-side pool of backend endpoints with blacklisting.
///
/// Usually built through [`EndpointPoolFactory`](crate::load_balancer::factory::EndpointPoolFactory),
/// which also starts the heartbeat that restores recovered endpoints.
pub struct EndpointPool {
    total: usize,
    partition: RwLock<Partition>,
    cursor: RoundRobinCursor,
    heartbeat: Mutex<Option<Box<dyn CancelHandle>>>,
}

impl EndpointPool {
    /// Create a pool with every endpoint available and no heartbeat attached.
    ///
    /// Duplicates are kept and selected proportionally more often.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self::with_cursor(endpoints, RoundRobinCursor::new())
    }

    pub(crate) fn with_cursor(endpoints: Vec<Endpoint>, cursor: RoundRobinCursor) -> Self {
        Self {
            total: endpoints.len(),
            partition: RwLock::new(Partition {
                available: endpoints,
                blacklisted: Vec::new(),
            }),
            cursor,
            heartbeat: Mutex::new(None),
        }
    }

    /// Number of endpoints the pool was built with.
    pub fn size(&self) -> usize {
        self.total
    }

    /// Select the next available endpoint, or `None` if all are blacklisted.
    pub fn get(&self) -> Option<Endpoint> {
        let partition = self.read();
        match partition.available.len() {
            0 => None,
            1 => Some(partition.available[0].clone()),
            len => {
                let position = self.cursor.advance(self.total);
                Some(partition.available[position % len].clone())
            }
        }
    }

    /// Return true if at least one endpoint is available.
    pub fn has_any(&self) -> bool {
        !self.read().available.is_empty()
    }

    /// Exclude `endpoint` from selection.
    ///
    /// Returns whether any endpoint is still available afterwards. Unknown or
    /// already blacklisted endpoints leave the pool unchanged.
    pub fn blacklist(&self, endpoint: &Endpoint) -> bool {
        let mut partition = self.write();
        if let Some(index) = partition.available.iter().position(|e| e == endpoint) {
            let removed = partition.available.remove(index);
            partition.blacklisted.push(removed);

            let remaining = partition.available.len();
            metrics::record_blacklisted(endpoint.base_uri());
            metrics::record_available(remaining);
            if remaining == 0 {
                tracing::error!(endpoint = %endpoint, total = self.total, "Blacklisted last available endpoint");
            } else {
                tracing::warn!(endpoint = %endpoint, remaining, "Endpoint blacklisted");
            }
        }
        !partition.available.is_empty()
    }

    /// Return a blacklisted endpoint to selection. No-op otherwise.
    pub fn unblacklist(&self, endpoint: &Endpoint) {
        self.restore(endpoint);
    }

    /// Move `endpoint` back to the available set, reporting whether it moved.
    pub(crate) fn restore(&self, endpoint: &Endpoint) -> bool {
        let mut partition = self.write();
        let Some(index) = partition.blacklisted.iter().position(|e| e == endpoint) else {
            return false;
        };
        let restored = partition.blacklisted.remove(index);
        partition.available.push(restored);

        metrics::record_available(partition.available.len());
        tracing::info!(endpoint = %endpoint, available = partition.available.len(), "Endpoint restored");
        true
    }

    /// Snapshot of the blacklisted endpoints.
    pub fn list_blacklisted(&self) -> Vec<Endpoint> {
        self.read().blacklisted.clone()
    }

    /// Snapshot of the available endpoints, in selection order.
    pub fn list_available(&self) -> Vec<Endpoint> {
        self.read().available.clone()
    }

    /// Consistent view of both sets.
    pub fn status(&self) -> PoolStatus {
        let closed = self.is_closed();
        let partition = self.read();
        PoolStatus {
            total: self.total,
            available: partition.available.clone(),
            blacklisted: partition.blacklisted.clone(),
            closed,
        }
    }

    /// Stop the heartbeat. Safe to call any number of times.
    pub fn close(&self) {
        let handle = self
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.cancel();
            tracing::debug!(total = self.total, "Endpoint pool closed");
        }
    }

    /// Return true once `close` has cancelled the heartbeat, or if none was attached.
    pub fn is_closed(&self) -> bool {
        self.heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub(crate) fn attach_heartbeat(&self, handle: Box<dyn CancelHandle>) {
        let previous = self
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Partition> {
        self.partition.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partition> {
        self.partition.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for EndpointPool {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let partition = self.read();
        f.debug_struct("EndpointPool")
            .field("total", &self.total)
            .field("available", &partition.available)
            .field("blacklisted", &partition.blacklisted)
            .field("cursor", &self.cursor.position())
            .finish()
    }
}
