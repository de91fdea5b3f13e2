//! Unbounded object counter.

use crossbeam::utils::CachePadded;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

use super::{park_until, validate_poll_interval, ObjectCounter};
use crate::error::Result;

/// Counts in-flight objects without ever refusing admission.
///
/// `on_ramp`, `attempt_on_ramp` and `force_on_ramp` are equivalent here.
/// Only [`wait_until_empty`](ObjectCounter::wait_until_empty) blocks.
#[derive(Debug)]
pub struct StandardObjectCounter {
    count: CachePadded<AtomicI64>,
    poll_interval: Duration,
}

impl StandardObjectCounter {
    /// Create a counter that re-checks for quiescence every `poll_interval`.
    pub fn new(poll_interval: Duration) -> Result<Self> {
        validate_poll_interval("standard", poll_interval)?;

        debug!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Standard object counter initialized"
        );

        Ok(Self {
            count: CachePadded::new(AtomicI64::new(0)),
            poll_interval,
        })
    }

    /// Interval between quiescence checks
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl ObjectCounter for StandardObjectCounter {
    fn on_ramp(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn attempt_on_ramp(&self) -> bool {
        self.count.fetch_add(1, Ordering::AcqRel);
        true
    }

    fn force_on_ramp(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn off_ramp(&self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }

    fn count(&self) -> i64 {
        self.count.load(Ordering::Acquire)
    }

    fn wait_until_empty(&self) {
        park_until(self.poll_interval, || self.count() == 0);
        trace!("Standard object counter drained");
    }
}
