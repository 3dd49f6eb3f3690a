//! Tokio-backed timer driver.
//!
//! Each started schedule is one spawned task that races its next due
//! time against the handle's cancellation token. Cron occurrences are
//! computed with the `cron` crate and evaluated in the driver's
//! timezone.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use cron::Schedule;
use tokio::time::{interval_at, sleep, Instant};
use tracing::trace;

use crate::{JobCallback, TimerDriver, TimerError, TimerHandle};

/// Validate a cron expression without starting a schedule.
///
/// Expressions use the six-field format: second minute hour day-of-month
/// month day-of-week.
///
/// # Errors
///
/// Returns [`TimerError::InvalidCron`] if the expression is not valid.
///
/// # Example
///
/// ```
/// use metronome_timers::validate_cron_expression;
///
/// assert!(validate_cron_expression("0 0 * * * *").is_ok()); // Every hour
/// assert!(validate_cron_expression("0 30 4 * * *").is_ok()); // 4:30 AM daily
/// assert!(validate_cron_expression("invalid").is_err());
/// ```
pub fn validate_cron_expression(expression: &str) -> Result<(), TimerError> {
    parse_cron(expression).map(|_| ())
}

fn parse_cron(expression: &str) -> Result<Schedule, TimerError> {
    Schedule::from_str(expression).map_err(|e| TimerError::InvalidCron {
        expression: expression.to_string(),
        message: e.to_string(),
    })
}

/// Timer driver backed by spawned tokio tasks.
///
/// Must be used from within a tokio runtime. The driver tracks how many
/// handles it has issued that are not yet cancelled; a handle whose
/// one-shot timeout has already fired still counts as outstanding until
/// it is cancelled, since its owner has not released it.
pub struct TokioTimerDriver {
    timezone: Tz,
    next_id: AtomicU64,
    live: AtomicUsize,
}

impl TokioTimerDriver {
    /// Create a driver that evaluates cron expressions in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            next_id: AtomicU64::new(1),
            live: AtomicUsize::new(0),
        }
    }

    fn issue(&self) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        TimerHandle::new(id)
    }
}

impl TimerDriver for TokioTimerDriver {
    fn start_timeout(&self, delay: Duration, callback: JobCallback) -> TimerHandle {
        let handle = self.issue();
        let token = handle.token();
        let id = handle.id();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(delay) => {
                    trace!(timer = id, "timeout due");
                    callback().await;
                }
            }
        });

        handle
    }

    fn start_interval(&self, period: Duration, callback: JobCallback) -> TimerHandle {
        let handle = self.issue();
        let token = handle.token();
        let id = handle.id();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        trace!(timer = id, "interval tick");
                        callback().await;
                    }
                }
            }
        });

        handle
    }

    fn start_cron(
        &self,
        expression: &str,
        callback: JobCallback,
    ) -> Result<TimerHandle, TimerError> {
        let schedule = parse_cron(expression)?;
        let timezone = self.timezone;
        let handle = self.issue();
        let token = handle.token();
        let id = handle.id();

        tokio::spawn(async move {
            loop {
                // A schedule with no future occurrences is done.
                let Some(next) = schedule.upcoming(timezone).next() else {
                    break;
                };
                let now = Utc::now().with_timezone(&timezone);
                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = sleep(wait) => {
                        trace!(timer = id, occurrence = %next, "cron occurrence due");
                        callback().await;
                    }
                }
            }
        });

        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        if !handle.is_cancelled() {
            handle.cancel();
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn outstanding(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    use super::*;
    use crate::job_fn;

    fn counting_callback() -> (Arc<AtomicU32>, JobCallback) {
        let counter = Arc::new(AtomicU32::new(0));
        let cloned = counter.clone();
        let callback = job_fn(move || {
            let c = cloned.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        (counter, callback)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timeout_fires_once() {
        let driver = TokioTimerDriver::new(chrono_tz::UTC);
        let (counter, callback) = counting_callback();

        let handle = driver.start_timeout(Duration::from_millis(10), callback);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        driver.cancel(handle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancelled_timeout_never_fires() {
        let driver = TokioTimerDriver::new(chrono_tz::UTC);
        let (counter, callback) = counting_callback();

        let handle = driver.start_timeout(Duration::from_millis(20), callback);
        driver.cancel(handle);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_interval_ticks_repeatedly() {
        let driver = TokioTimerDriver::new(chrono_tz::UTC);
        let (counter, callback) = counting_callback();

        let handle = driver.start_interval(Duration::from_millis(10), callback);
        tokio::time::sleep(Duration::from_millis(105)).await;
        driver.cancel(handle);

        let ticks = counter.load(Ordering::SeqCst);
        assert!(ticks >= 2, "expected at least 2 ticks, got {ticks}");

        // No further ticks after cancellation.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), ticks);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cron_invalid_expression() {
        let driver = TokioTimerDriver::new(chrono_tz::UTC);
        let (_, callback) = counting_callback();

        let result = driver.start_cron("not a cron", callback);
        assert!(matches!(result, Err(TimerError::InvalidCron { .. })));
        assert_eq!(driver.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cron_valid_expression_registers() {
        let driver = TokioTimerDriver::new(chrono_tz::UTC);
        let (_, callback) = counting_callback();

        let handle = driver.start_cron("0 0 * * * *", callback).unwrap();
        assert_eq!(driver.outstanding(), 1);
        driver.cancel(handle);
        assert_eq!(driver.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_outstanding_counts_uncancelled_handles() {
        let driver = TokioTimerDriver::new(chrono_tz::UTC);
        let (_, callback) = counting_callback();

        let a = driver.start_timeout(Duration::from_secs(60), callback.clone());
        let b = driver.start_interval(Duration::from_secs(60), callback);
        assert_eq!(driver.outstanding(), 2);

        driver.cancel(a);
        assert_eq!(driver.outstanding(), 1);
        driver.cancel(b);
        assert_eq!(driver.outstanding(), 0);
    }

    #[test]
    fn test_validate_cron_expression() {
        assert!(validate_cron_expression("0 0 * * * *").is_ok());
        assert!(validate_cron_expression("*/10 * * * * *").is_ok());
        assert!(validate_cron_expression("0 0 0 * * SUN").is_ok());
        assert!(validate_cron_expression("").is_err());
        assert!(validate_cron_expression("invalid").is_err());
    }
}
