//! Shared helpers for flow-control integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tasker_flow::SaturationSource;

/// Poll `condition` until it holds or `timeout` elapses
pub fn eventually(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Spawn `body` on a thread and expose whether it has returned yet
pub fn spawn_tracked<F>(body: F) -> (thread::JoinHandle<()>, Arc<AtomicBool>)
where
    F: FnOnce() + Send + 'static,
{
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    let handle = thread::spawn(move || {
        body();
        flag.store(true, Ordering::SeqCst);
    });
    (handle, done)
}

/// Scheduler stand-in with a fixed capacity and adjustable load
pub struct TestScheduler {
    name: String,
    capacity: i64,
    load: AtomicI64,
}

impl TestScheduler {
    pub fn new(name: &str, capacity: i64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            capacity,
            load: AtomicI64::new(0),
        })
    }

    pub fn set_load(&self, load: i64) {
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
