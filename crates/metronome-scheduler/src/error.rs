//! Error types for the scheduler crate.
//!
//! All registry errors are synchronous: they surface at the call site,
//! never later from a timer task.

use thiserror::Error;

use metronome_timers::TimerError;

use crate::JobKind;

/// Errors that can occur during scheduler operations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A job with the same name already exists in that kind's namespace.
    /// Overwriting would leak the previous timer, so the add is refused.
    #[error("{kind} \"{name}\" already exists in the registry")]
    DuplicateName {
        /// Kind namespace of the collision.
        kind: JobKind,
        /// The name that is already taken.
        name: String,
    },

    /// No job with the given name exists in that kind's namespace.
    #[error(
        "no {kind} was found with the name \"{name}\"; \
         register one from a schedule declaration at bootstrap or through the dynamic add API"
    )]
    NotFound {
        /// Kind namespace that was searched.
        kind: JobKind,
        /// The missing name.
        name: String,
    },

    /// A cron expression failed to parse. Fatal at bootstrap: a scheduled
    /// task that silently never runs is a correctness defect.
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    /// The configured timezone is not a valid IANA identifier.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

impl From<TimerError> for ScheduleError {
    fn from(err: TimerError) -> Self {
        match err {
            TimerError::InvalidCron { .. } => ScheduleError::InvalidCron(err.to_string()),
        }
    }
}
