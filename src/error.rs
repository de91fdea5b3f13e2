//! Error types for the flow-control core.
//!
//! Counter and monitor operations never fail at runtime. Every variant here
//! describes a construction-time programming error or a configuration
//! problem, and is surfaced eagerly by the constructor that detects it.

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowControlError {
    #[error("Invalid capacity {capacity} for counter '{name}': capacity must be positive")]
    InvalidCapacity { name: String, capacity: i64 },
    #[error("Invalid poll interval for '{name}': poll interval must be non-zero")]
    InvalidPollInterval { name: String },
    #[error("Multi-object counter requires at least one child counter")]
    EmptyCounterList,
    #[error("Invalid health monitor configuration: {0}")]
    InvalidHealthMonitorConfig(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<ConfigurationError> for FlowControlError {
    fn from(error: ConfigurationError) -> Self {
        FlowControlError::ConfigurationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FlowControlError>;
