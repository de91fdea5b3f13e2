//! # Multi Object Counter
//!
//! Applies one logical on-ramp/off-ramp to an ordered list of counters, so a
//! single object can be accounted against several stages at once (for
//! example a stage's own counter plus a counter shared by a group of stages).
//!
//! The first child is the *gating* counter: only its capacity is consulted
//! by `attempt_on_ramp`. Every other child is force-ramped once the gating
//! counter admits, so all children keep the same count even when a
//! non-gating child is past its own capacity.
//!
//! The composite takes no lock of its own. During `attempt_on_ramp` there
//! is a short window in which the gating child has been ramped and the
//! others have not yet.

use std::sync::Arc;
use tracing::debug;

use super::ObjectCounter;
use crate::error::{FlowControlError, Result};

#[derive(Debug, Clone)]
pub struct MultiObjectCounter {
    counters: Vec<Arc<dyn ObjectCounter>>,
}

impl MultiObjectCounter {
    /// Compose `counters`; the first element becomes the gating counter.
    pub fn new(counters: Vec<Arc<dyn ObjectCounter>>) -> Result<Self> {
        if counters.is_empty() {
            return Err(FlowControlError::EmptyCounterList);
        }

        debug!(children = counters.len(), "Multi object counter initialized");

        Ok(Self { counters })
    }

    /// The counter whose capacity governs conditional admission
    pub fn gating_counter(&self) -> &Arc<dyn ObjectCounter> {
        &self.counters[0]
    }

    /// All children, gating counter first
    pub fn counters(&self) -> &[Arc<dyn ObjectCounter>] {
        &self.counters
    }
}

impl ObjectCounter for MultiObjectCounter {
    fn on_ramp(&self) {
        for counter in &self.counters {
            counter.on_ramp();
        }
    }

    fn attempt_on_ramp(&self) -> bool {
        if !self.gating_counter().attempt_on_ramp() {
            return false;
        }

        for counter in &self.counters[1..] {
            counter.force_on_ramp();
        }
        true
    }

    fn force_on_ramp(&self) {
        for counter in &self.counters {
            counter.force_on_ramp();
        }
    }

    fn off_ramp(&self) {
        for counter in &self.counters {
            counter.off_ramp();
        }
    }

    fn count(&self) -> i64 {
        self.gating_counter().count()
    }

    fn wait_until_empty(&self) {
        self.gating_counter().wait_until_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::{BackpressureObjectCounter, StandardObjectCounter};
    use std::time::Duration;

    fn bounded(name: &str, capacity: i64) -> Arc<BackpressureObjectCounter> {
        Arc::new(BackpressureObjectCounter::new(name, capacity, Duration::from_millis(1)).unwrap())
    }

    #[test]
    fn test_empty_counter_list_rejected() {
        assert_eq!(
            MultiObjectCounter::new(Vec::new()).unwrap_err(),
            FlowControlError::EmptyCounterList
        );
    }

    #[test]
    fn test_events_applied_to_every_child() {
        let a = bounded("a", 10);
        let b = Arc::new(StandardObjectCounter::new(Duration::from_millis(1)).unwrap());
        let children: Vec<Arc<dyn ObjectCounter>> = vec![a.clone(), b.clone()];
        let multi = MultiObjectCounter::new(children).unwrap();

        multi.on_ramp();
        multi.force_on_ramp();
        assert!(multi.attempt_on_ramp());
        assert_eq!((a.count(), b.count(), multi.count()), (3, 3, 3));

        multi.off_ramp();
        assert_eq!((a.count(), b.count(), multi.count()), (2, 2, 2));
    }

    #[test]
    fn test_refused_attempt_touches_no_child() {
        let gate = bounded("gate", 1);
        let other = bounded("other", 100);
        let children: Vec<Arc<dyn ObjectCounter>> = vec![gate.clone(), other.clone()];
        let multi = MultiObjectCounter::new(children).unwrap();

        assert!(multi.attempt_on_ramp());
        assert!(!multi.attempt_on_ramp());
        assert_eq!(gate.count(), 1);
        assert_eq!(other.count(), 1);
    }

    #[test]
    fn test_non_gating_child_forced_past_capacity() {
        let gate = bounded("gate", 10);
        let small = bounded("small", 2);
        let children: Vec<Arc<dyn ObjectCounter>> = vec![gate.clone(), small.clone()];
        let multi = MultiObjectCounter::new(children).unwrap();

        for _ in 0..10 {
            assert!(multi.attempt_on_ramp());
        }
        assert!(!multi.attempt_on_ramp());
        assert_eq!(small.count(), 10);
        assert!(!small.attempt_on_ramp());
    }

    #[test]
    fn test_gating_counter_is_first() {
        let gate = bounded("gate", 3);
        let other = bounded("other", 5);
        let children: Vec<Arc<dyn ObjectCounter>> = vec![gate, other];
        let multi = MultiObjectCounter::new(children).unwrap();

        multi.force_on_ramp();
        multi.force_on_ramp();
        assert_eq!(multi.gating_counter().count(), 2);
        assert_eq!(multi.counters().len(), 2);
    }
}
