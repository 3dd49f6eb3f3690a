//! Process-local scheduled-task registry.
//!
//! Application components declare named timeouts, intervals, and cron
//! jobs; this crate registers them at bootstrap, exposes a runtime API
//! to add, query, and cancel jobs, and cancels every timer it created
//! exactly once at shutdown.
//!
//! The main pieces:
//!
//! - [`ScheduleScanner`] collects [`JobDeclaration`]s from components
//!   implementing [`ScheduleProvider`]
//! - [`scope_guard`] rejects declarations owned by per-request components
//! - [`SchedulerRegistry`] maps `(kind, name)` to live timer handles
//! - [`ScheduleService`] is the runtime add/get/delete API
//! - [`SchedulerOrchestrator`] wires bootstrap and shutdown together
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use metronome_scheduler::{
//!     ScheduleScanner, ScheduleService, SchedulerConfig, SchedulerOrchestrator,
//! };
//!
//! let service = Arc::new(ScheduleService::new(SchedulerConfig::default())?);
//!
//! let mut scanner = ScheduleScanner::new();
//! scanner.register(Arc::new(ReportsComponent::new()));
//!
//! let orchestrator = SchedulerOrchestrator::new(service.clone(), scanner);
//! orchestrator.on_application_bootstrap()?;
//!
//! // Dynamic jobs at any point after bootstrap:
//! service.add_timeout("reindex", Duration::from_secs(30), job_fn(|| async {
//!     reindex().await;
//! }))?;
//!
//! // At shutdown, every live timer is cancelled:
//! orchestrator.on_application_shutdown();
//! ```

mod config;
mod error;
mod lifecycle;
mod registry;
mod scanner;
mod scheduler;
pub mod scope_guard;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::SchedulerConfig;
pub use error::ScheduleError;
pub use lifecycle::SchedulerOrchestrator;
pub use registry::SchedulerRegistry;
pub use scanner::{ScheduleProvider, ScheduleScanner};
pub use scheduler::ScheduleService;
pub use types::{
    JobDeclaration, JobInfo, JobKind, OwnerLifetime, ScannedDeclaration, ScheduleSpec,
};

// Re-export the timer capability surface so hosting applications only
// need one crate in scope.
pub use metronome_timers::{
    job_fn, validate_cron_expression, JobCallback, TimerDriver, TimerError, TimerHandle,
    TokioTimerDriver,
};
