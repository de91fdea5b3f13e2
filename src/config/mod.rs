//! # Flow Control Configuration
//!
//! Serde-backed settings for object counters and the health monitor, loaded
//! from a TOML/YAML file with environment overrides (see [`ConfigManager`]).
//!
//! ## Example
//!
//! ```toml
//! enabled = true
//!
//! [backpressure]
//! default_capacity = 500
//! poll_interval_ms = 1
//!
//! [health_monitor]
//! poll_period_ms = 100
//! escalation_threshold_seconds = 300
//! report_period_seconds = 10
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::counters::{BackpressureObjectCounter, NoOpObjectCounter, ObjectCounter};
use crate::error::Result;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Effectively "never": ten thousand days
const NEVER_ESCALATE_SECONDS: u64 = 10_000 * 24 * 60 * 60;

/// Root flow-control configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowControlConfig {
    /// When false, every counter handed out is the shared no-op counter
    pub enabled: bool,

    /// Bounded counter settings
    pub backpressure: BackpressureConfig,

    /// Health monitor settings
    pub health_monitor: HealthMonitorConfig,
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backpressure: BackpressureConfig::default(),
            health_monitor: HealthMonitorConfig::default(),
        }
    }
}

impl FlowControlConfig {
    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.backpressure.validate()?;
        self.health_monitor.validate()?;
        Ok(())
    }

    /// Counter for a stage named `name`.
    ///
    /// Returns the shared no-op counter when flow control is disabled,
    /// otherwise a fresh bounded counter with the configured capacity.
    pub fn counter(&self, name: &str) -> Result<Arc<dyn ObjectCounter>> {
        if !self.enabled {
            return Ok(NoOpObjectCounter::shared());
        }
        self.bounded_counter(name, self.backpressure.default_capacity)
    }

    /// Bounded counter with an explicit capacity and the configured poll interval
    pub fn bounded_counter(&self, name: &str, capacity: i64) -> Result<Arc<dyn ObjectCounter>> {
        Ok(Arc::new(BackpressureObjectCounter::new(
            name,
            capacity,
            self.backpressure.poll_interval(),
        )?))
    }
}

/// Bounded counter configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackpressureConfig {
    /// Capacity given to counters that do not specify their own
    pub default_capacity: i64,
    /// How often blocked callers re-check their condition
    pub poll_interval_ms: u64,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            default_capacity: 1000,
            poll_interval_ms: 1,
        }
    }
}

impl BackpressureConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_capacity <= 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "backpressure.default_capacity".to_string(),
                value: self.default_capacity.to_string(),
                context: "capacity must be positive".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "backpressure.poll_interval_ms".to_string(),
                value: "0".to_string(),
                context: "poll interval must be at least 1ms".to_string(),
            });
        }
        Ok(())
    }
}

/// Health monitor configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthMonitorConfig {
    /// Period between health checks
    pub poll_period_ms: u64,
    /// Unhealthy duration that triggers escalation
    pub escalation_threshold_seconds: u64,
    /// Minimum time between two unhealthy-state log reports
    pub report_period_seconds: u64,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            poll_period_ms: 100,
            escalation_threshold_seconds: NEVER_ESCALATE_SECONDS,
            report_period_seconds: 10,
        }
    }
}

impl HealthMonitorConfig {
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    pub fn escalation_threshold(&self) -> Duration {
        Duration::from_secs(self.escalation_threshold_seconds)
    }

    pub fn report_period(&self) -> Duration {
        Duration::from_secs(self.report_period_seconds)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_period_ms == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "health_monitor.poll_period_ms".to_string(),
                value: "0".to_string(),
                context: "poll period must be at least 1ms".to_string(),
            });
        }
        Ok(())
    }
}
