//! # Health Monitor
//!
//! Tracks how long the system has continuously had at least one saturated
//! component.
//!
//! Each component carries its own onset: the instant it became saturated
//! within its current saturated stretch. The system-wide onset is the
//! earliest onset among the components that are saturated *now*. So if A
//! saturates at t0 and B at t1 > t0, the monitor reports time since t0 until
//! A recovers, then time since t1 for as long as B stays saturated. The
//! reported duration never drops back to zero while some component remains
//! saturated.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::escalation::{EscalationHandler, HealthReport, UnhealthyComponent};
use super::SaturationSource;
use crate::config::HealthMonitorConfig;
use crate::error::{FlowControlError, Result};

/// Default minimum time between two unhealthy-state log reports
pub const DEFAULT_REPORT_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct MonitorState {
    /// Per-component saturation onset, `None` while healthy
    onsets: Vec<Option<Instant>>,
    /// Onset currently in force, `None` while the system is healthy
    unhealthy_since: Option<Instant>,
    /// Result of the most recent check
    unhealthy_duration: Duration,
    /// When the unhealthy components were last logged
    last_report: Option<Instant>,
    /// Whether the current unhealthy stretch has already been escalated
    escalated: bool,
}

/// A saturated component observed during one check
struct Saturation {
    index: usize,
    load: i64,
    capacity: i64,
}

pub struct HealthMonitor {
    components: Vec<Arc<dyn SaturationSource>>,
    poll_period: Duration,
    escalation_threshold: Duration,
    report_period: Duration,
    escalation_handler: Option<Arc<dyn EscalationHandler>>,
    state: Mutex<MonitorState>,
}

impl HealthMonitor {
    /// Create a monitor over `components`.
    ///
    /// # Arguments
    /// * `components` - Saturation sources to observe, in report order
    /// * `poll_period` - How often the monitor is expected to be polled
    /// * `escalation_threshold` - Unhealthy duration after which the
    ///   escalation handler (if any) is invoked
    pub fn new(
        components: Vec<Arc<dyn SaturationSource>>,
        poll_period: Duration,
        escalation_threshold: Duration,
    ) -> Result<Self> {
        if poll_period.is_zero() {
            return Err(FlowControlError::InvalidHealthMonitorConfig(
                "poll period must be non-zero".to_string(),
            ));
        }

        debug!(
            components = components.len(),
            poll_period_ms = poll_period.as_millis() as u64,
            escalation_threshold_secs = escalation_threshold.as_secs(),
            "Health monitor initialized"
        );

        let onsets = vec![None; components.len()];
        Ok(Self {
            components,
            poll_period,
            escalation_threshold,
            report_period: DEFAULT_REPORT_PERIOD,
            escalation_handler: None,
            state: Mutex::new(MonitorState {
                onsets,
                ..MonitorState::default()
            }),
        })
    }

    /// Create a monitor with periods and threshold taken from configuration
    pub fn from_config(
        components: Vec<Arc<dyn SaturationSource>>,
        config: &HealthMonitorConfig,
    ) -> Result<Self> {
        Ok(Self::new(components, config.poll_period(), config.escalation_threshold())?
            .with_report_period(config.report_period()))
    }

    /// Set the minimum time between two unhealthy-state log reports
    pub fn with_report_period(mut self, report_period: Duration) -> Self {
        self.report_period = report_period;
        self
    }

    /// Install the handler invoked when an unhealthy stretch reaches the
    /// escalation threshold
    pub fn with_escalation_handler(mut self, handler: Arc<dyn EscalationHandler>) -> Self {
        self.escalation_handler = Some(handler);
        self
    }

    /// Check every component and update the unhealthy-duration signal.
    ///
    /// Returns:
    /// - `Some(now - onset)` while at least one component is saturated
    /// - `Some(Duration::ZERO)` on the single check that observes the
    ///   system becoming healthy again
    /// - `None` on every other healthy check
    ///
    /// Intended for a single periodic caller.
    pub fn check_system_health(&self, now: Instant) -> Option<Duration> {
        let (duration, escalation) = {
            let mut state = self.state.lock();

            let saturated = self.observe(&mut state, now);

            let Some(onset) = Self::earliest_onset(&state, &saturated) else {
                return self.mark_healthy(&mut state);
            };

            let duration = now.saturating_duration_since(onset);
            state.unhealthy_since = Some(onset);
            state.unhealthy_duration = duration;

            let report_due = state
                .last_report
                .map_or(true, |last| now.saturating_duration_since(last) >= self.report_period);
            if report_due {
                state.last_report = Some(now);
                let report = self.build_report(&state, &saturated, now, duration);
                warn!(
                    unhealthy_ms = duration.as_millis() as u64,
                    unhealthy_components = report.components.len(),
                    report = %report,
                    "System unhealthy"
                );
            }

            let escalation = match &self.escalation_handler {
                Some(handler) if !state.escalated && duration >= self.escalation_threshold => {
                    state.escalated = true;
                    Some((
                        Arc::clone(handler),
                        self.build_report(&state, &saturated, now, duration),
                    ))
                }
                _ => None,
            };

            (duration, escalation)
        };

        if let Some((handler, report)) = escalation {
            handler.escalate(&report);
        }

        Some(duration)
    }

    /// Duration computed by the most recent check, zero if never unhealthy
    /// or healthy at the last check
    pub fn unhealthy_duration(&self) -> Duration {
        self.state.lock().unhealthy_duration
    }

    /// Onset of the current unhealthy stretch, as of the last check
    pub fn unhealthy_since(&self) -> Option<Instant> {
        self.state.lock().unhealthy_since
    }

    /// Saturated components as of the last check, with durations measured
    /// up to `now`
    pub fn unhealthy_components(&self, now: Instant) -> Vec<UnhealthyComponent> {
        let state = self.state.lock();
        state
            .onsets
            .iter()
            .enumerate()
            .filter_map(|(index, onset)| {
                let onset = (*onset)?;
                let component = &self.components[index];
                Some(UnhealthyComponent {
                    name: component.name().to_string(),
                    load: component.current_load(),
                    capacity: component.capacity(),
                    unhealthy_for: now.saturating_duration_since(onset),
                })
            })
            .collect()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn poll_period(&self) -> Duration {
        self.poll_period
    }

    pub fn escalation_threshold(&self) -> Duration {
        self.escalation_threshold
    }

    pub fn report_period(&self) -> Duration {
        self.report_period
    }

    /// Refresh per-component onsets and return the saturated components
    fn observe(&self, state: &mut MonitorState, now: Instant) -> Vec<Saturation> {
        let mut saturated = Vec::new();
        for (index, (component, onset)) in
            self.components.iter().zip(state.onsets.iter_mut()).enumerate()
        {
            let capacity = component.capacity();
            let load = component.current_load();
            if load >= capacity {
                onset.get_or_insert(now);
                saturated.push(Saturation {
                    index,
                    load,
                    capacity,
                });
            } else {
                *onset = None;
            }
        }
        saturated
    }

    fn earliest_onset(state: &MonitorState, saturated: &[Saturation]) -> Option<Instant> {
        saturated
            .iter()
            .filter_map(|saturation| state.onsets[saturation.index])
            .min()
    }

    fn mark_healthy(&self, state: &mut MonitorState) -> Option<Duration> {
        let onset = state.unhealthy_since.take()?;

        info!(
            unhealthy_ms = state.unhealthy_duration.as_millis() as u64,
            "✅ System healthy again"
        );
        debug!(?onset, "Cleared unhealthy onset");

        state.unhealthy_duration = Duration::ZERO;
        state.last_report = None;
        state.escalated = false;
        Some(Duration::ZERO)
    }

    fn build_report(
        &self,
        state: &MonitorState,
        saturated: &[Saturation],
        now: Instant,
        duration: Duration,
    ) -> HealthReport {
        let components = saturated
            .iter()
            .map(|saturation| UnhealthyComponent {
                name: self.components[saturation.index].name().to_string(),
                load: saturation.load,
                capacity: saturation.capacity,
                unhealthy_for: state.onsets[saturation.index]
                    .map(|onset| now.saturating_duration_since(onset))
                    .unwrap_or_default(),
            })
            .collect();

        HealthReport {
            unhealthy_duration: duration,
            components,
        }
    }
}

impl fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("HealthMonitor")
            .field("components", &names)
            .field("poll_period", &self.poll_period)
            .field("escalation_threshold", &self.escalation_threshold)
            .field("report_period", &self.report_period)
            .field("escalation_handler", &self.escalation_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    struct TestScheduler {
        name: String,
        capacity: i64,
        load: AtomicI64,
    }

    impl TestScheduler {
        fn new(name: &str, capacity: i64) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                capacity,
                load: AtomicI64::new(0),
            })
        }

        fn set_load(&self, load: i64) {
            self.load.store(load, Ordering::SeqCst);
        }
    }

    impl SaturationSource for TestScheduler {
        fn name(&self) -> &str {
            &self.name
        }

        fn capacity(&self) -> i64 {
            self.capacity
        }

        fn current_load(&self) -> i64 {
            self.load.load(Ordering::SeqCst)
        }
    }

    fn monitor(schedulers: &[Arc<TestScheduler>]) -> HealthMonitor {
        let components: Vec<Arc<dyn SaturationSource>> = schedulers
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn SaturationSource>)
            .collect();
        HealthMonitor::new(components, Duration::from_millis(100), Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_zero_poll_period_rejected() {
        assert!(matches!(
            HealthMonitor::new(Vec::new(), Duration::ZERO, Duration::from_secs(1)),
            Err(FlowControlError::InvalidHealthMonitorConfig(_))
        ));
    }

    #[test]
    fn test_no_components_is_always_healthy() {
        let monitor = monitor(&[]);
        assert_eq!(monitor.check_system_health(Instant::now()), None);
        assert_eq!(monitor.unhealthy_duration(), Duration::ZERO);
    }

    #[test]
    fn test_load_equal_to_capacity_is_unhealthy() {
        let scheduler = TestScheduler::new("a", 10);
        let monitor = monitor(&[scheduler.clone()]);
        let start = Instant::now();

        scheduler.set_load(9);
        assert_eq!(monitor.check_system_health(start), None);

        scheduler.set_load(10);
        assert_eq!(monitor.check_system_health(start), Some(Duration::ZERO));
        assert_eq!(monitor.unhealthy_since(), Some(start));
    }

    #[test]
    fn test_recovery_reported_once() {
        let scheduler = TestScheduler::new("a", 10);
        let monitor = monitor(&[scheduler.clone()]);
        let start = Instant::now();

        scheduler.set_load(15);
        monitor.check_system_health(start);
        assert_eq!(
            monitor.check_system_health(start + Duration::from_millis(5)),
            Some(Duration::from_millis(5))
        );
        assert_eq!(monitor.unhealthy_duration(), Duration::from_millis(5));

        scheduler.set_load(0);
        let later = start + Duration::from_millis(10);
        assert_eq!(monitor.check_system_health(later), Some(Duration::ZERO));
        assert_eq!(monitor.unhealthy_duration(), Duration::ZERO);
        assert_eq!(monitor.unhealthy_since(), None);
        assert_eq!(monitor.check_system_health(later), None);
    }

    #[test]
    fn test_unhealthy_components_snapshot() {
        let a = TestScheduler::new("a", 10);
        let b = TestScheduler::new("b", 5);
        let monitor = monitor(&[a.clone(), b.clone()]);
        let start = Instant::now();

        b.set_load(7);
        monitor.check_system_health(start);

        let components = monitor.unhealthy_components(start + Duration::from_secs(2));
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "b");
        assert_eq!(components[0].load, 7);
        assert_eq!(components[0].capacity, 5);
        assert_eq!(components[0].unhealthy_for, Duration::from_secs(2));
    }

    #[test]
    fn test_escalation_once_per_unhealthy_stretch() {
        let scheduler = TestScheduler::new("a", 1);
        let escalations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&escalations);
        let handler = move |report: &HealthReport| {
            assert_eq!(report.components.len(), 1);
            counter.fetch_add(1, Ordering::SeqCst);
        };

        let components: Vec<Arc<dyn SaturationSource>> = vec![scheduler.clone()];
        let monitor = HealthMonitor::new(components, Duration::from_millis(10), Duration::from_secs(5))
            .unwrap()
            .with_escalation_handler(Arc::new(handler));
        let start = Instant::now();

        scheduler.set_load(1);
        monitor.check_system_health(start);
        monitor.check_system_health(start + Duration::from_secs(4));
        assert_eq!(escalations.load(Ordering::SeqCst), 0);

        monitor.check_system_health(start + Duration::from_secs(5));
        monitor.check_system_health(start + Duration::from_secs(6));
        assert_eq!(escalations.load(Ordering::SeqCst), 1);

        scheduler.set_load(0);
        monitor.check_system_health(start + Duration::from_secs(7));
        scheduler.set_load(1);
        monitor.check_system_health(start + Duration::from_secs(8));
        monitor.check_system_health(start + Duration::from_secs(20));
        assert_eq!(escalations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_lists_component_names() {
        let monitor = monitor(&[TestScheduler::new("hasher", 3)]);
        let text = format!("{monitor:?}");
        assert!(text.contains("hasher"));
    }
}
