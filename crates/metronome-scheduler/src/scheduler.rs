//! The runtime schedule API exposed to the hosting application.
//!
//! [`ScheduleService`] owns the timer driver and the registry. Its add
//! wrappers start a schedule and register the resulting handle in one
//! call; gets, lists, and deletes go straight to the registry.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use metronome_timers::{JobCallback, TimerDriver, TimerHandle, TokioTimerDriver};

use crate::{JobKind, ScheduleError, ScheduleSpec, SchedulerConfig, SchedulerRegistry};

/// Runtime API for adding, querying, and cancelling scheduled jobs.
///
/// One instance lives for the application's life, created at bootstrap
/// and shared (behind an `Arc`) with any component that needs dynamic
/// scheduling. All operations are synchronous.
pub struct ScheduleService {
    driver: Arc<dyn TimerDriver>,
    registry: Arc<SchedulerRegistry>,
}

impl ScheduleService {
    /// Create a service backed by a [`TokioTimerDriver`] evaluating cron
    /// expressions in the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimezone`] if the configured
    /// timezone is not a valid IANA identifier.
    pub fn new(config: SchedulerConfig) -> Result<Self, ScheduleError> {
        let timezone = config.parse_timezone()?;
        Ok(Self::with_driver(Arc::new(TokioTimerDriver::new(timezone))))
    }

    /// Create a service over a caller-supplied timer driver.
    pub fn with_driver(driver: Arc<dyn TimerDriver>) -> Self {
        let registry = Arc::new(SchedulerRegistry::new(driver.clone()));
        Self { driver, registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> Arc<SchedulerRegistry> {
        self.registry.clone()
    }

    /// Start the schedule described by `spec`.
    pub(crate) fn start_schedule(
        &self,
        spec: &ScheduleSpec,
        callback: JobCallback,
    ) -> Result<TimerHandle, ScheduleError> {
        match spec {
            ScheduleSpec::Timeout { delay } => Ok(self.driver.start_timeout(*delay, callback)),
            ScheduleSpec::Interval { period } => Ok(self.driver.start_interval(*period, callback)),
            ScheduleSpec::Cron { expression } => {
                Ok(self.driver.start_cron(expression, callback)?)
            }
        }
    }

    /// Register an already-started handle, cancelling it if the name is
    /// taken so a rejected add never leaks a running timer.
    pub(crate) fn install(
        &self,
        kind: JobKind,
        name: &str,
        handle: TimerHandle,
        created_dynamically: bool,
    ) -> Result<(), ScheduleError> {
        if let Err(err) = self
            .registry
            .add(kind, name, handle.clone(), created_dynamically)
        {
            self.driver.cancel(handle);
            return Err(err);
        }
        info!(kind = %kind, job = %name, dynamic = created_dynamically, "schedule registered");
        Ok(())
    }

    fn add(
        &self,
        name: &str,
        spec: ScheduleSpec,
        callback: JobCallback,
    ) -> Result<(), ScheduleError> {
        let kind = spec.kind();
        let handle = self.start_schedule(&spec, callback)?;
        self.install(kind, name, handle, true)
    }

    /// Start and register a one-shot timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateName`] if a timeout named `name`
    /// already exists; the existing timeout is unaffected.
    pub fn add_timeout(
        &self,
        name: &str,
        delay: Duration,
        callback: JobCallback,
    ) -> Result<(), ScheduleError> {
        self.add(name, ScheduleSpec::Timeout { delay }, callback)
    }

    /// Start and register a recurring interval.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateName`] if an interval named
    /// `name` already exists; the existing interval is unaffected.
    pub fn add_interval(
        &self,
        name: &str,
        period: Duration,
        callback: JobCallback,
    ) -> Result<(), ScheduleError> {
        self.add(name, ScheduleSpec::Interval { period }, callback)
    }

    /// Start and register a cron job.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidCron`] if the expression does not
    /// parse (nothing is registered), or
    /// [`ScheduleError::DuplicateName`] if a cron job named `name`
    /// already exists.
    pub fn add_cron_job(
        &self,
        name: &str,
        expression: &str,
        callback: JobCallback,
    ) -> Result<(), ScheduleError> {
        self.add(
            name,
            ScheduleSpec::Cron {
                expression: expression.to_string(),
            },
            callback,
        )
    }

    /// Get the live handle of a registered timeout.
    pub fn get_timeout(&self, name: &str) -> Result<TimerHandle, ScheduleError> {
        self.registry.get(JobKind::Timeout, name)
    }

    /// Get the live handle of a registered interval.
    pub fn get_interval(&self, name: &str) -> Result<TimerHandle, ScheduleError> {
        self.registry.get(JobKind::Interval, name)
    }

    /// Get the live handle of a registered cron job.
    pub fn get_cron_job(&self, name: &str) -> Result<TimerHandle, ScheduleError> {
        self.registry.get(JobKind::Cron, name)
    }

    /// Names of all registered timeouts.
    pub fn get_timeouts(&self) -> Vec<String> {
        self.registry.names(JobKind::Timeout)
    }

    /// Names of all registered intervals.
    pub fn get_intervals(&self) -> Vec<String> {
        self.registry.names(JobKind::Interval)
    }

    /// Names of all registered cron jobs.
    pub fn get_cron_jobs(&self) -> Vec<String> {
        self.registry.names(JobKind::Cron)
    }

    /// Non-throwing existence check across any kind.
    pub fn does_exist(&self, kind: JobKind, name: &str) -> bool {
        self.registry.does_exist(kind, name)
    }

    /// Cancel and remove a registered timeout.
    pub fn delete_timeout(&self, name: &str) -> Result<(), ScheduleError> {
        self.registry.remove(JobKind::Timeout, name)
    }

    /// Cancel and remove a registered interval.
    pub fn delete_interval(&self, name: &str) -> Result<(), ScheduleError> {
        self.registry.remove(JobKind::Interval, name)
    }

    /// Cancel and remove a registered cron job.
    pub fn delete_cron_job(&self, name: &str) -> Result<(), ScheduleError> {
        self.registry.remove(JobKind::Cron, name)
    }
}
