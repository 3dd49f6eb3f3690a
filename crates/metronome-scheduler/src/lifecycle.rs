//! Application lifecycle coordination.
//!
//! [`SchedulerOrchestrator`] bridges the hosting application's start and
//! stop hooks to the scheduler: at bootstrap it scans declarations,
//! filters them through the scope guard, and registers each surviving
//! one; at shutdown it drains the registry, cancelling every timer the
//! scheduler created.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::{scope_guard, ScheduleError, ScheduleScanner, ScheduleService};

/// Wires schedule discovery and teardown into the application lifecycle.
pub struct SchedulerOrchestrator {
    service: Arc<ScheduleService>,
    scanner: ScheduleScanner,
    drained: AtomicBool,
}

impl SchedulerOrchestrator {
    /// Create an orchestrator over a service and a populated scanner.
    pub fn new(service: Arc<ScheduleService>, scanner: ScheduleScanner) -> Self {
        Self {
            service,
            scanner,
            drained: AtomicBool::new(false),
        }
    }

    /// Register every declared schedule.
    ///
    /// Declarations owned by per-request components are dropped with a
    /// warning. Every other declaration is started and registered; when
    /// this returns `Ok`, all bootstrap-declared jobs are live, so the
    /// application may signal readiness and dynamic adds cannot race
    /// bootstrap registration.
    ///
    /// # Errors
    ///
    /// A failure starting any schedule (a malformed cron expression, or
    /// two declarations claiming the same name) is fatal: the error is
    /// returned instead of the job being silently skipped. Jobs
    /// registered before the failure stay in the registry and are
    /// released by [`on_application_shutdown`](Self::on_application_shutdown).
    pub fn on_application_bootstrap(&self) -> Result<(), ScheduleError> {
        let declarations = self.scanner.scan();
        info!(count = declarations.len(), "scanning schedule declarations");

        let mut registered = 0usize;
        for scanned in declarations {
            if !scope_guard::admit(&scanned) {
                continue;
            }

            let declaration = scanned.declaration;
            let kind = declaration.spec.kind();
            let handle = self
                .service
                .start_schedule(&declaration.spec, declaration.callback.clone())
                .map_err(|err| {
                    error!(
                        kind = %kind,
                        job = %declaration.name,
                        component = %scanned.component,
                        error = %err,
                        "failed to start declared schedule"
                    );
                    err
                })?;
            self.service
                .install(kind, &declaration.name, handle, false)?;
            registered += 1;
        }

        info!(count = registered, "bootstrap schedules registered");
        Ok(())
    }

    /// Cancel and remove every job the scheduler owns.
    ///
    /// Drains at most once; later calls are no-ops, and calling without
    /// a prior bootstrap is safe (the registry is simply empty).
    pub fn on_application_shutdown(&self) {
        if self.drained.swap(true, Ordering::SeqCst) {
            return;
        }
        let registry = self.service.registry();
        let count = registry.job_count();
        registry.drain_all();
        info!(count, "scheduler shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use metronome_timers::{job_fn, TimerDriver};

    use super::*;
    use crate::testing::FakeDriver;
    use crate::{JobDeclaration, JobKind, OwnerLifetime, ScheduleProvider};

    struct Component {
        name: &'static str,
        lifetime: OwnerLifetime,
        declarations: Vec<JobDeclaration>,
    }

    impl ScheduleProvider for Component {
        fn component_name(&self) -> &str {
            self.name
        }

        fn lifetime(&self) -> OwnerLifetime {
            self.lifetime
        }

        fn schedules(&self) -> Vec<JobDeclaration> {
            self.declarations.clone()
        }
    }

    fn harness(providers: Vec<Component>) -> (Arc<FakeDriver>, Arc<ScheduleService>, SchedulerOrchestrator) {
        let driver = Arc::new(FakeDriver::new());
        let service = Arc::new(ScheduleService::with_driver(driver.clone()));
        let mut scanner = ScheduleScanner::new();
        for provider in providers {
            scanner.register(Arc::new(provider));
        }
        let orchestrator = SchedulerOrchestrator::new(service.clone(), scanner);
        (driver, service, orchestrator)
    }

    #[test]
    fn test_bootstrap_registers_singleton_declarations() {
        let (_, service, orchestrator) = harness(vec![Component {
            name: "ReportsComponent",
            lifetime: OwnerLifetime::Singleton,
            declarations: vec![
                JobDeclaration::cron("nightly", "run", "0 0 2 * * *", job_fn(|| async {})),
                JobDeclaration::timeout(
                    "warmup",
                    "warm",
                    Duration::from_secs(5),
                    job_fn(|| async {}),
                ),
            ],
        }]);

        orchestrator.on_application_bootstrap().unwrap();

        assert!(service.does_exist(JobKind::Cron, "nightly"));
        assert!(service.does_exist(JobKind::Timeout, "warmup"));
        assert!(!service.registry().job(JobKind::Cron, "nightly").unwrap().created_dynamically);
    }

    #[test]
    fn test_bootstrap_skips_per_request_declarations() {
        let (driver, service, orchestrator) = harness(vec![Component {
            name: "RequestHandler",
            lifetime: OwnerLifetime::PerRequest,
            declarations: vec![JobDeclaration::interval(
                "session-expiry",
                "expire",
                Duration::from_secs(300),
                job_fn(|| async {}),
            )],
        }]);

        orchestrator.on_application_bootstrap().unwrap();

        assert!(!service.does_exist(JobKind::Interval, "session-expiry"));
        assert_eq!(driver.started_count(), 0);
    }

    #[test]
    fn test_bootstrap_invalid_cron_is_fatal() {
        let (_, _, orchestrator) = harness(vec![Component {
            name: "BrokenComponent",
            lifetime: OwnerLifetime::Singleton,
            declarations: vec![JobDeclaration::cron(
                "bad",
                "run",
                "definitely not cron",
                job_fn(|| async {}),
            )],
        }]);

        let err = orchestrator.on_application_bootstrap().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidCron(_)));
    }

    #[test]
    fn test_bootstrap_duplicate_declaration_is_fatal() {
        let (driver, _, orchestrator) = harness(vec![Component {
            name: "TwiceComponent",
            lifetime: OwnerLifetime::Singleton,
            declarations: vec![
                JobDeclaration::timeout("same", "a", Duration::from_secs(1), job_fn(|| async {})),
                JobDeclaration::timeout("same", "b", Duration::from_secs(2), job_fn(|| async {})),
            ],
        }]);

        let err = orchestrator.on_application_bootstrap().unwrap_err();
        assert!(matches!(err, ScheduleError::DuplicateName { .. }));
        // The colliding start was cancelled; the first registration remains.
        assert_eq!(driver.outstanding(), 1);
    }

    #[test]
    fn test_shutdown_drains_exactly_once() {
        let (driver, service, orchestrator) = harness(vec![Component {
            name: "ReportsComponent",
            lifetime: OwnerLifetime::Singleton,
            declarations: vec![JobDeclaration::cron(
                "nightly",
                "run",
                "0 0 2 * * *",
                job_fn(|| async {}),
            )],
        }]);

        orchestrator.on_application_bootstrap().unwrap();
        let handle = service.get_cron_job("nightly").unwrap();

        orchestrator.on_application_shutdown();
        assert!(service.get_cron_jobs().is_empty());
        assert_eq!(driver.outstanding(), 0);
        assert_eq!(driver.cancelled_count(handle.id()), 1);

        // A second shutdown never double-cancels.
        orchestrator.on_application_shutdown();
        assert_eq!(driver.cancelled_count(handle.id()), 1);
    }

    #[test]
    fn test_shutdown_without_bootstrap_is_safe() {
        let (driver, _, orchestrator) = harness(vec![]);
        orchestrator.on_application_shutdown();
        assert_eq!(driver.outstanding(), 0);
    }
}
