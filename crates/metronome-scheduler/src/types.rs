//! Core job types: kinds, schedule specs, declarations, and metadata.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use metronome_timers::JobCallback;

/// The three kinds of scheduled work.
///
/// Each kind is an independent name namespace: a `"foo"` timeout and a
/// `"foo"` interval may coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// One-shot work fired after a delay.
    Timeout,
    /// Recurring work fired at a fixed period.
    Interval,
    /// Recurring work fired on a cron expression.
    Cron,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Timeout => write!(f, "timeout"),
            JobKind::Interval => write!(f, "interval"),
            JobKind::Cron => write!(f, "cron job"),
        }
    }
}

/// When and how often a job fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleSpec {
    /// Fire once after `delay`.
    Timeout { delay: Duration },
    /// Fire every `period`.
    Interval { period: Duration },
    /// Fire on each occurrence of a six-field cron expression.
    Cron { expression: String },
}

impl ScheduleSpec {
    /// The kind namespace this spec belongs to.
    pub fn kind(&self) -> JobKind {
        match self {
            ScheduleSpec::Timeout { .. } => JobKind::Timeout,
            ScheduleSpec::Interval { .. } => JobKind::Interval,
            ScheduleSpec::Cron { .. } => JobKind::Cron,
        }
    }
}

/// Instantiation lifetime of the component owning a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerLifetime {
    /// One instance for the application's life.
    Singleton,
    /// A fresh instance per unit of work.
    PerRequest,
}

/// A scheduled-work declaration emitted by a component.
///
/// Carries everything needed to start the schedule: a registry name, the
/// declaring method's name (used in diagnostics), the schedule spec, and
/// the callback already bound to its owning component.
#[derive(Clone)]
pub struct JobDeclaration {
    /// Registry name, unique within the spec's kind namespace.
    pub name: String,
    /// Name of the declaring method, for diagnostics.
    pub method: String,
    /// When and how often the job fires.
    pub spec: ScheduleSpec,
    /// The work to execute on each firing.
    pub callback: JobCallback,
}

impl JobDeclaration {
    /// Declare a one-shot timeout.
    pub fn timeout(
        name: impl Into<String>,
        method: impl Into<String>,
        delay: Duration,
        callback: JobCallback,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            spec: ScheduleSpec::Timeout { delay },
            callback,
        }
    }

    /// Declare a recurring interval.
    pub fn interval(
        name: impl Into<String>,
        method: impl Into<String>,
        period: Duration,
        callback: JobCallback,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            spec: ScheduleSpec::Interval { period },
            callback,
        }
    }

    /// Declare a cron job.
    pub fn cron(
        name: impl Into<String>,
        method: impl Into<String>,
        expression: impl Into<String>,
        callback: JobCallback,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            spec: ScheduleSpec::Cron {
                expression: expression.into(),
            },
            callback,
        }
    }
}

impl fmt::Debug for JobDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDeclaration")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// A declaration stamped with its owning component's identity, as
/// produced by the scanner.
#[derive(Debug, Clone)]
pub struct ScannedDeclaration {
    /// Name of the owning component.
    pub component: String,
    /// The owning component's instantiation lifetime.
    pub lifetime: OwnerLifetime,
    /// The declaration itself.
    pub declaration: JobDeclaration,
}

/// Metadata about a registered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Registry name.
    pub name: String,
    /// Kind namespace.
    pub kind: JobKind,
    /// Whether the job was added through the runtime API rather than
    /// discovered at bootstrap.
    pub created_dynamically: bool,
    /// When the job entered the registry.
    pub registered_at: DateTime<Utc>,
}

impl JobInfo {
    pub(crate) fn new(name: String, kind: JobKind, created_dynamically: bool) -> Self {
        Self {
            name,
            kind,
            created_dynamically,
            registered_at: Utc::now(),
        }
    }
}
