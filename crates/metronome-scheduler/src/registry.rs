//! The scheduler registry: the process-wide store mapping job names to
//! live timer handles.
//!
//! The registry never starts a timer. Callers (the lifecycle
//! orchestrator at bootstrap, or [`ScheduleService`](crate::ScheduleService)
//! for dynamic adds) start schedules through the timer driver and hand
//! the resulting handle to [`SchedulerRegistry::add`]; the registry only
//! stores handles and knows how to cancel them. This keeps scheduling
//! policy (cron parsing, interval semantics) out of the store, and tests
//! can drive it with handles minted by a fake driver.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use metronome_timers::{TimerDriver, TimerHandle};

use crate::{JobInfo, JobKind, ScheduleError};

struct JobRecord {
    handle: TimerHandle,
    info: JobInfo,
}

/// Store mapping `(kind, name)` to live timer handles plus metadata.
///
/// Each [`JobKind`] is an independent namespace. Mutation is synchronous
/// and immediately visible; the interior `RwLock` only guards against the
/// registry being shared across threads, not against concurrent
/// registry/timer interleaving (timer callbacks never touch the registry
/// mid-operation).
///
/// # Example
///
/// ```ignore
/// let registry = SchedulerRegistry::new(driver.clone());
/// let handle = driver.start_timeout(delay, callback);
/// registry.add(JobKind::Timeout, "warmup", handle, true)?;
/// assert!(registry.does_exist(JobKind::Timeout, "warmup"));
/// registry.remove(JobKind::Timeout, "warmup")?;
/// ```
pub struct SchedulerRegistry {
    driver: Arc<dyn TimerDriver>,
    jobs: RwLock<HashMap<JobKind, HashMap<String, JobRecord>>>,
}

impl SchedulerRegistry {
    /// Create an empty registry that cancels handles through `driver`.
    pub fn new(driver: Arc<dyn TimerDriver>) -> Self {
        Self {
            driver,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a job record for an already-started schedule.
    ///
    /// The record is visible to lookups as soon as this returns.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateName`] if `(kind, name)` is
    /// already registered. The pre-existing record and its handle are
    /// untouched; the caller owns the rejected handle and is responsible
    /// for cancelling it.
    pub fn add(
        &self,
        kind: JobKind,
        name: &str,
        handle: TimerHandle,
        created_dynamically: bool,
    ) -> Result<(), ScheduleError> {
        let mut jobs = self.jobs.write().unwrap();
        let namespace = jobs.entry(kind).or_default();
        if namespace.contains_key(name) {
            return Err(ScheduleError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }

        debug!(kind = %kind, job = %name, dynamic = created_dynamically, "job registered");
        namespace.insert(
            name.to_string(),
            JobRecord {
                handle,
                info: JobInfo::new(name.to_string(), kind, created_dynamically),
            },
        );
        Ok(())
    }

    /// Get the live handle for a job.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] if no such job is registered.
    pub fn get(&self, kind: JobKind, name: &str) -> Result<TimerHandle, ScheduleError> {
        let jobs = self.jobs.read().unwrap();
        jobs.get(&kind)
            .and_then(|namespace| namespace.get(name))
            .map(|record| record.handle.clone())
            .ok_or_else(|| ScheduleError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    /// Get the metadata for a job.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] if no such job is registered.
    pub fn job(&self, kind: JobKind, name: &str) -> Result<JobInfo, ScheduleError> {
        let jobs = self.jobs.read().unwrap();
        jobs.get(&kind)
            .and_then(|namespace| namespace.get(name))
            .map(|record| record.info.clone())
            .ok_or_else(|| ScheduleError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    /// Snapshot of all registered names in a kind's namespace.
    ///
    /// Order is unspecified. Later mutation does not affect a returned
    /// snapshot.
    pub fn names(&self, kind: JobKind) -> Vec<String> {
        let jobs = self.jobs.read().unwrap();
        jobs.get(&kind)
            .map(|namespace| namespace.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Non-throwing existence check.
    pub fn does_exist(&self, kind: JobKind, name: &str) -> bool {
        let jobs = self.jobs.read().unwrap();
        jobs.get(&kind)
            .map(|namespace| namespace.contains_key(name))
            .unwrap_or(false)
    }

    /// Cancel a job's handle and remove its record.
    ///
    /// The write lock is held across cancel and removal, so no caller can
    /// observe a removed name with a running timer or a cancelled handle
    /// that is still queryable.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] if no such job is registered;
    /// a second remove for the same name fails cleanly.
    pub fn remove(&self, kind: JobKind, name: &str) -> Result<(), ScheduleError> {
        let mut jobs = self.jobs.write().unwrap();
        let record = jobs
            .get_mut(&kind)
            .and_then(|namespace| namespace.remove(name))
            .ok_or_else(|| ScheduleError::NotFound {
                kind,
                name: name.to_string(),
            })?;

        self.driver.cancel(record.handle);
        debug!(kind = %kind, job = %name, "job cancelled and removed");
        Ok(())
    }

    /// Cancel every handle across all kinds and clear every namespace.
    ///
    /// Invoked once by the lifecycle orchestrator at shutdown. Handle
    /// cancellation is infallible, so the sweep always completes: after
    /// this returns, [`names`](Self::names) is empty for every kind and
    /// the driver reports zero outstanding timers.
    pub fn drain_all(&self) {
        let mut jobs = self.jobs.write().unwrap();
        let mut cancelled = 0usize;
        for (kind, namespace) in jobs.drain() {
            for (name, record) in namespace {
                debug!(kind = %kind, job = %name, "draining job");
                self.driver.cancel(record.handle);
                cancelled += 1;
            }
        }
        debug!(count = cancelled, "registry drained");
    }

    /// Total number of registered jobs across all kinds.
    pub fn job_count(&self) -> usize {
        let jobs = self.jobs.read().unwrap();
        jobs.values().map(HashMap::len).sum()
    }
}
