//! Health reports and escalation of prolonged unhealthiness.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::error;

/// A saturated component as observed during a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnhealthyComponent {
    pub name: String,
    pub load: i64,
    pub capacity: i64,
    /// How long this component has been continuously saturated
    pub unhealthy_for: Duration,
}

/// Snapshot of system health taken during a check that found it unhealthy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Duration of the current unbroken unhealthy stretch
    pub unhealthy_duration: Duration,
    /// Currently saturated components, in monitor order
    pub components: Vec<UnhealthyComponent>,
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unhealthy for {}ms:",
            self.unhealthy_duration.as_millis()
        )?;
        for component in &self.components {
            write!(
                f,
                " {} ({}/{}, {}ms)",
                component.name,
                component.load,
                component.capacity,
                component.unhealthy_for.as_millis()
            )?;
        }
        Ok(())
    }
}

/// Reaction to the system staying unhealthy past the escalation threshold.
///
/// Invoked at most once per unbroken unhealthy stretch, from the monitor's
/// polling thread.
pub trait EscalationHandler: Send + Sync {
    fn escalate(&self, report: &HealthReport);
}

impl<F> EscalationHandler for F
where
    F: Fn(&HealthReport) + Send + Sync,
{
    fn escalate(&self, report: &HealthReport) {
        self(report)
    }
}

/// Escalation that only records the event in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEscalationHandler;

impl EscalationHandler for LoggingEscalationHandler {
    fn escalate(&self, report: &HealthReport) {
        error!(
            unhealthy_ms = report.unhealthy_duration.as_millis() as u64,
            unhealthy_components = report.components.len(),
            report = %report,
            "🚨 System unhealthy beyond escalation threshold"
        );
    }
}
