//! # Object Counters
//!
//! Thread-safe in-flight counters that provide backpressure between the
//! producer and consumer sides of a pipeline stage.
//!
//! Producers on-ramp an object before handing it to a stage; consumers
//! off-ramp it once the object has been fully processed. Depending on the
//! variant, on-ramping may block until the stage has room.
//!
//! ## Variants
//!
//! - [`StandardObjectCounter`] - unbounded, only `wait_until_empty` blocks
//! - [`BackpressureObjectCounter`] - bounded, `on_ramp` blocks at capacity
//! - [`NoOpObjectCounter`] - stateless stand-in when flow control is disabled
//! - [`MultiObjectCounter`] - applies one logical event to several counters,
//!   gated by the first
//!
//! ## Blocking model
//!
//! Blocking operations poll their condition at a fixed interval, parking the
//! calling thread between checks. A blocked thread that is unparked by
//! someone else simply re-checks its condition earlier: the wait only ends
//! once the condition actually holds. Because every counter waits on its own
//! state alone, counters can be composed without coordinating wakeups across
//! unrelated counters.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tasker_flow::counters::{BackpressureObjectCounter, ObjectCounter};
//!
//! # fn main() -> tasker_flow::Result<()> {
//! let counter = Arc::new(BackpressureObjectCounter::new(
//!     "event_intake",
//!     2,
//!     Duration::from_millis(1),
//! )?);
//!
//! counter.on_ramp();
//! assert!(counter.attempt_on_ramp());
//! assert!(!counter.attempt_on_ramp());
//!
//! counter.off_ramp();
//! counter.off_ramp();
//! counter.wait_until_empty();
//! assert_eq!(counter.count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod backpressure;
pub mod multi;
pub mod no_op;
pub mod standard;

pub use backpressure::BackpressureObjectCounter;
pub use multi::MultiObjectCounter;
pub use no_op::{NoOpObjectCounter, NO_OP_OBJECT_COUNTER};
pub use standard::StandardObjectCounter;

use std::fmt::Debug;
use std::thread;
use std::time::Duration;

/// Admission and release bookkeeping for objects flowing through a stage.
///
/// All operations are safe to call concurrently from any number of threads.
pub trait ObjectCounter: Debug + Send + Sync {
    /// Block until the object can be admitted, then count it.
    ///
    /// Unparking the calling thread does not end the wait.
    fn on_ramp(&self);

    /// Count the object if it can be admitted right now.
    ///
    /// Returns `false` without side effects if it cannot.
    fn attempt_on_ramp(&self) -> bool;

    /// Count the object unconditionally, even past capacity. Never blocks.
    fn force_on_ramp(&self);

    /// Stop counting one object.
    fn off_ramp(&self);

    /// Point-in-time snapshot of the number of on-ramped objects.
    fn count(&self) -> i64;

    /// Block until the count reaches zero.
    ///
    /// Unparking the calling thread does not end the wait.
    fn wait_until_empty(&self);
}

/// Park the current thread in `poll_interval` slices until `ready` holds.
///
/// Spurious wakeups and explicit unparks only cause an early re-check.
pub(crate) fn park_until<F>(poll_interval: Duration, mut ready: F)
where
    F: FnMut() -> bool,
{
    while !ready() {
        thread::park_timeout(poll_interval);
    }
}

pub(crate) fn validate_poll_interval(name: &str, poll_interval: Duration) -> crate::Result<()> {
    if poll_interval.is_zero() {
        return Err(crate::FlowControlError::InvalidPollInterval {
            name: name.to_string(),
        });
    }
    Ok(())
}
