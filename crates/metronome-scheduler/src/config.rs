//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use crate::ScheduleError;

/// Configuration for the schedule service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Timezone cron expressions are evaluated in (IANA identifier,
    /// e.g. "America/New_York"). Defaults to "UTC".
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
        }
    }
}

impl SchedulerConfig {
    /// Parse the configured timezone string into a `chrono_tz::Tz`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimezone`] if the string is not a
    /// valid IANA timezone identifier.
    pub fn parse_timezone(&self) -> Result<chrono_tz::Tz, ScheduleError> {
        self.default_timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ScheduleError::InvalidTimezone(self.default_timezone.clone()))
    }
}
