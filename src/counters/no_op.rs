//! Counter used when flow control is disabled.

use std::sync::{Arc, OnceLock};

use super::ObjectCounter;

/// Process-wide no-op counter instance.
pub static NO_OP_OBJECT_COUNTER: NoOpObjectCounter = NoOpObjectCounter;

static SHARED: OnceLock<Arc<NoOpObjectCounter>> = OnceLock::new();

/// Accepts every call and does nothing.
///
/// Lets pipeline code call a counter unconditionally without special-casing
/// disabled flow control. `count` always reports [`NoOpObjectCounter::COUNT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpObjectCounter;

impl NoOpObjectCounter {
    /// Sentinel count signalling that counting is disabled
    pub const COUNT: i64 = -1;

    /// The shared instance
    pub fn instance() -> &'static NoOpObjectCounter {
        &NO_OP_OBJECT_COUNTER
    }

    /// The shared instance, as a trait object handle for counter composition
    pub fn shared() -> Arc<dyn ObjectCounter> {
        SHARED.get_or_init(|| Arc::new(NoOpObjectCounter)).clone()
    }
}

impl ObjectCounter for NoOpObjectCounter {
    fn on_ramp(&self) {}

    fn attempt_on_ramp(&self) -> bool {
        true
    }

    fn force_on_ramp(&self) {}

    fn off_ramp(&self) {}

    fn count(&self) -> i64 {
        Self::COUNT
    }

    fn wait_until_empty(&self) {}
}
