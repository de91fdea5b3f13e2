//! # System Health Monitoring
//!
//! Aggregates per-component saturation into a single "how long has the
//! system been unhealthy" signal.
//!
//! ## Architecture
//!
//! - **Saturation sources**: components owned elsewhere (typically task
//!   schedulers) that expose a capacity and their current unprocessed load
//! - **Health monitor**: checks every source, tracks when each became
//!   saturated, and reports the duration of the current unhealthy stretch
//! - **Escalation**: an optional hook invoked once an unhealthy stretch
//!   outlasts a configured threshold
//! - **Poller**: a tokio task that drives the monitor at a fixed period
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use tasker_flow::health::{HealthMonitor, SaturationSource};
//!
//! struct Scheduler {
//!     load: AtomicI64,
//! }
//!
//! impl SaturationSource for Scheduler {
//!     fn capacity(&self) -> i64 {
//!         10
//!     }
//!
//!     fn current_load(&self) -> i64 {
//!         self.load.load(Ordering::Relaxed)
//!     }
//! }
//!
//! # fn main() -> tasker_flow::Result<()> {
//! let scheduler = Arc::new(Scheduler { load: AtomicI64::new(0) });
//! let monitor = HealthMonitor::new(
//!     vec![scheduler.clone() as Arc<dyn SaturationSource>],
//!     Duration::from_millis(100),
//!     Duration::from_secs(60),
//! )?;
//!
//! let start = Instant::now();
//! assert_eq!(monitor.check_system_health(start), None);
//!
//! scheduler.load.store(10, Ordering::Relaxed);
//! assert_eq!(monitor.check_system_health(start), Some(Duration::ZERO));
//! assert_eq!(
//!     monitor.check_system_health(start + Duration::from_secs(1)),
//!     Some(Duration::from_secs(1))
//! );
//! # Ok(())
//! # }
//! ```

pub mod escalation;
pub mod monitor;
pub mod poller;

pub use escalation::{EscalationHandler, HealthReport, LoggingEscalationHandler, UnhealthyComponent};
pub use monitor::HealthMonitor;
pub use poller::{HealthPoller, HealthPollerHandle};

/// A component whose saturation the [`HealthMonitor`] observes.
///
/// A source is unhealthy while `current_load() >= capacity()`. Both
/// accessors must be side-effect free and callable from the monitor's
/// thread at any time; the values are read as unsynchronized snapshots.
pub trait SaturationSource: Send + Sync {
    /// Name used in health reports and log output
    fn name(&self) -> &str {
        "unnamed"
    }

    /// Fixed positive bound on unprocessed work
    fn capacity(&self) -> i64;

    /// Current amount of unprocessed work
    fn current_load(&self) -> i64;

    /// Whether the source is currently saturated
    fn is_saturated(&self) -> bool {
        self.current_load() >= self.capacity()
    }
}
