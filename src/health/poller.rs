//! # Health Poller
//!
//! Background tokio task that drives a [`HealthMonitor`] at its poll period
//! and hands every non-`None` result to a callback (for example to raise an
//! alert or slow down intake).

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::HealthMonitor;

pub struct HealthPoller;

impl HealthPoller {
    /// Spawn the polling task on the current tokio runtime.
    ///
    /// `on_result` receives the unhealthy duration on every unhealthy check
    /// and `Duration::ZERO` once when the system recovers.
    pub fn spawn<F>(monitor: Arc<HealthMonitor>, on_result: F) -> HealthPollerHandle
    where
        F: Fn(std::time::Duration) + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let poll_period = monitor.poll_period();

        let task = tokio::spawn(async move {
            let mut interval = time::interval(poll_period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                poll_period_ms = poll_period.as_millis() as u64,
                components = monitor.component_count(),
                "🩺 Health poller started"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Some(duration) = monitor.check_system_health(Instant::now()) {
                            on_result(duration);
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Health poller stopped");
        });

        HealthPollerHandle {
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Handle to a running [`HealthPoller`] task
#[derive(Debug)]
pub struct HealthPollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl HealthPollerHandle {
    /// Signal the poller to stop and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Health poller task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for HealthPollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown_tx.send(true);
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::SaturationSource;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Stage {
        load: AtomicI64,
    }

    impl SaturationSource for Stage {
        fn capacity(&self) -> i64 {
            4
        }

        fn current_load(&self) -> i64 {
            self.load.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_poller_reports_unhealthy_and_recovery() {
        let stage = Arc::new(Stage {
            load: AtomicI64::new(4),
        });
        let components: Vec<Arc<dyn SaturationSource>> = vec![stage.clone()];
        let monitor = Arc::new(
            HealthMonitor::new(components, Duration::from_millis(5), Duration::from_secs(60)).unwrap(),
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = HealthPoller::spawn(Arc::clone(&monitor), move |duration| {
            let _ = tx.send(duration);
        });

        let first = time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(first < Duration::from_secs(5));

        stage.load.store(0, Ordering::SeqCst);
        let recovered = time::timeout(Duration::from_secs(5), async {
            while let Some(duration) = rx.recv().await {
                if duration.is_zero() && monitor.unhealthy_since().is_none() {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap();
        assert!(recovered);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let monitor = Arc::new(
            HealthMonitor::new(Vec::new(), Duration::from_millis(5), Duration::from_secs(60)).unwrap(),
        );
        let handle = HealthPoller::spawn(monitor, |_| {});
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }
}
