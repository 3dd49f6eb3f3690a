//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use metronome_timers::{
    validate_cron_expression, JobCallback, TimerDriver, TimerError, TimerHandle,
};

/// A timer driver that mints handles without spawning anything and
/// records every cancellation, so tests can assert exactly-once
/// cancellation and outstanding-timer counts.
pub(crate) struct FakeDriver {
    next_id: AtomicU64,
    started: Mutex<Vec<u64>>,
    cancelled: Mutex<HashMap<u64, usize>>,
}

impl FakeDriver {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            started: Mutex::new(Vec::new()),
            cancelled: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a started handle directly, bypassing the schedule kinds.
    pub(crate) fn mint(&self) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(id);
        TimerHandle::new(id)
    }

    /// How many times the handle with `id` has been cancelled.
    pub(crate) fn cancelled_count(&self, id: u64) -> usize {
        self.cancelled.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub(crate) fn started_count(&self) -> usize {
        self.started.lock().unwrap().len()
    }
}

impl TimerDriver for FakeDriver {
    fn start_timeout(&self, _delay: Duration, _callback: JobCallback) -> TimerHandle {
        self.mint()
    }

    fn start_interval(&self, _period: Duration, _callback: JobCallback) -> TimerHandle {
        self.mint()
    }

    fn start_cron(
        &self,
        expression: &str,
        _callback: JobCallback,
    ) -> Result<TimerHandle, TimerError> {
        validate_cron_expression(expression)?;
        Ok(self.mint())
    }

    fn cancel(&self, handle: TimerHandle) {
        handle.cancel();
        *self.cancelled.lock().unwrap().entry(handle.id()).or_insert(0) += 1;
    }

    fn outstanding(&self) -> usize {
        let started = self.started.lock().unwrap().len();
        let cancelled = self.cancelled.lock().unwrap().len();
        started - cancelled
    }
}
