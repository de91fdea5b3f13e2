//! # Backpressure Object Counter
//!
//! Bounded in-flight counter. Once `capacity` objects are on-ramped, further
//! `on_ramp` calls park the producer until consumers off-ramp enough objects
//! to free a slot. `force_on_ramp` ignores the bound, so the count may
//! temporarily exceed capacity (e.g. for work that must never be dropped or
//! delayed, or for non-gating children of a [`MultiObjectCounter`]).
//!
//! Blocked producers race for freed slots. At least one of them wins each
//! freed slot, but there is no FIFO ordering between them.
//!
//! [`MultiObjectCounter`]: super::MultiObjectCounter

use crossbeam::utils::CachePadded;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

use super::{park_until, validate_poll_interval, ObjectCounter};
use crate::error::{FlowControlError, Result};

#[derive(Debug)]
pub struct BackpressureObjectCounter {
    /// Name used in diagnostics
    name: String,
    /// Maximum number of objects admitted by `on_ramp`/`attempt_on_ramp`
    capacity: i64,
    /// Interval between admission/quiescence re-checks
    poll_interval: Duration,
    /// Current number of on-ramped objects
    count: CachePadded<AtomicI64>,
    /// Number of `on_ramp` calls that had to wait for capacity
    blocked_on_ramps: AtomicU64,
}

impl BackpressureObjectCounter {
    /// Create a new bounded counter.
    ///
    /// # Arguments
    /// * `name` - Identifier used in log output
    /// * `capacity` - Positive upper bound for conditional admission
    /// * `poll_interval` - How often a blocked caller re-checks its condition
    pub fn new(name: impl Into<String>, capacity: i64, poll_interval: Duration) -> Result<Self> {
        let name = name.into();

        if capacity <= 0 {
            return Err(FlowControlError::InvalidCapacity { name, capacity });
        }
        validate_poll_interval(&name, poll_interval)?;

        debug!(
            counter = %name,
            capacity = capacity,
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Backpressure object counter initialized"
        );

        Ok(Self {
            name,
            capacity,
            poll_interval,
            count: CachePadded::new(AtomicI64::new(0)),
            blocked_on_ramps: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of `on_ramp` calls so far that found the counter at capacity
    pub fn blocked_on_ramps(&self) -> u64 {
        self.blocked_on_ramps.load(Ordering::Relaxed)
    }
}

impl ObjectCounter for BackpressureObjectCounter {
    fn on_ramp(&self) {
        if self.attempt_on_ramp() {
            return;
        }

        let blocked = self.blocked_on_ramps.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            counter = %self.name,
            capacity = self.capacity,
            count = self.count(),
            blocked_on_ramps = blocked,
            "Counter at capacity - on-ramp waiting (backpressure applied)"
        );

        park_until(self.poll_interval, || self.attempt_on_ramp());
    }

    fn attempt_on_ramp(&self) -> bool {
        let capacity = self.capacity;
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < capacity).then_some(current + 1)
            })
            .is_ok()
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
        trace!(counter = %self.name, "Backpressure object counter drained");
    }
}
