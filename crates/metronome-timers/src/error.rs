//! Error types for the timer capability.

use thiserror::Error;

/// Errors that can occur when starting a schedule.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The cron expression could not be parsed.
    #[error("invalid cron expression '{expression}': {message}")]
    InvalidCron {
        /// The expression that failed to parse.
        expression: String,
        /// Parser diagnostic.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimerError::InvalidCron {
            expression: "not a cron".to_string(),
            message: "expected six fields".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("not a cron"));
        assert!(rendered.contains("expected six fields"));
    }
}
