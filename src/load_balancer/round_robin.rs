//! Round-robin cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Monotonically advancing selection cursor.
///
/// The cursor is not tied to endpoint identities; callers take the returned
/// position modulo the number of currently available endpoints. When the
/// cursor reaches its limit it is reset (by compare-and-swap) to a caller
/// supplied value instead of wrapping. Callers racing the reset may see a
/// repeated or skipped position, so rotation is approximately fair rather
/// than strictly cyclic at that point.
#[derive(Debug)]
pub struct RoundRobinCursor {
    counter: AtomicUsize,
    limit: usize,
}

impl RoundRobinCursor {
    /// Cursor bounded by the signed counter range.
    pub fn new() -> Self {
        Self::with_limit(0, isize::MAX as usize)
    }

    /// Cursor starting at `start` that resets once `limit` is reached.
    pub fn with_limit(start: usize, limit: usize) -> Self {
        Self {
            counter: AtomicUsize::new(start),
            limit,
        }
    }

    /// Take the current position and advance.
    pub fn advance(&self, reset_to: usize) -> usize {
        let position = self.counter.fetch_add(1, Ordering::Relaxed);
        if position < self.limit {
            return position;
        }

        // Only the caller that observes its own increment performs the reset.
        let _ = self.counter.compare_exchange(
            position.wrapping_add(1),
            reset_to.wrapping_add(1),
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
        reset_to
    }

    /// Current raw counter value.
    pub fn position(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for RoundRobinCursor {
    fn default() -> Self {
        Self::new()
    }
}
