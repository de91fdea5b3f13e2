#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tasker Flow
//!
//! Flow control and health aggregation for Tasker processing pipelines.
//!
//! ## Overview
//!
//! Pipeline stages hand units of work to each other through queues. Without
//! backpressure a fast producer grows those queues without bound; with
//! careless backpressure the pipeline deadlocks. This crate provides the
//! in-process primitives the pipeline assembly layer uses to get this right:
//!
//! - **Object counters** track how many objects are in flight in a stage and
//!   block, refuse or force admission depending on the call
//! - **Composite counters** account one object against several stages while a
//!   single gating counter decides admission
//! - **Health monitoring** turns per-stage saturation into one system-wide
//!   "unhealthy for how long" signal
//!
//! ## Module Organization
//!
//! - [`counters`] - `ObjectCounter` trait and its variants
//! - [`health`] - Saturation sources, health monitor, escalation and poller
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use tasker_flow::counters::{MultiObjectCounter, ObjectCounter};
//! use tasker_flow::FlowControlConfig;
//!
//! # fn main() -> tasker_flow::Result<()> {
//! let config = FlowControlConfig::default();
//!
//! let stage = config.bounded_counter("event_hasher", 10)?;
//! let group = config.bounded_counter("intake_group", 100)?;
//! let gate = MultiObjectCounter::new(vec![stage.clone(), group.clone()])?;
//!
//! if gate.attempt_on_ramp() {
//!     // hand the object to the stage, which off-ramps once done
//!     gate.off_ramp();
//! }
//! gate.wait_until_empty();
//! assert_eq!(group.count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod counters;
pub mod error;
pub mod health;
pub mod logging;

pub use config::{BackpressureConfig, ConfigManager, FlowControlConfig, HealthMonitorConfig};
pub use counters::{
    BackpressureObjectCounter, MultiObjectCounter, NoOpObjectCounter, ObjectCounter,
    StandardObjectCounter,
};
pub use error::{FlowControlError, Result};
pub use health::{EscalationHandler, HealthMonitor, HealthPoller, HealthReport, SaturationSource};
