//! The timer driver contract.
//!
//! A [`TimerDriver`] starts timeout, interval, and cron schedules and
//! cancels them through opaque [`TimerHandle`]s. The production
//! implementation is [`TokioTimerDriver`](crate::TokioTimerDriver);
//! tests substitute fakes that mint handles without spawning tasks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::TimerError;

/// The unit of work executed when a schedule fires.
///
/// Callbacks take no arguments and are already bound to whatever state
/// they need. Use [`job_fn`] to build one from an async closure.
pub type JobCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure into a [`JobCallback`].
///
/// # Example
///
/// ```
/// use metronome_timers::job_fn;
///
/// let callback = job_fn(|| async {
///     // runs every time the schedule fires
/// });
/// callback();
/// ```
pub fn job_fn<F, Fut>(f: F) -> JobCallback
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || {
        let fut: BoxFuture<'static, ()> = Box::pin(f());
        fut
    })
}

/// Opaque reference to a running schedule.
///
/// Handles are cheap to clone; clones share the same cancellation state.
/// A handle stays valid until its driver cancels it.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    token: CancellationToken,
}

impl TimerHandle {
    /// Mint a fresh handle. Intended for [`TimerDriver`] implementations.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
        }
    }

    /// Driver-assigned identifier for this schedule.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether this handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The cancellation token driving this schedule's task.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the schedule behind this handle.
    ///
    /// Intended for [`TimerDriver`] implementations; callers go through
    /// [`TimerDriver::cancel`] so the driver can release its bookkeeping.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Uniform start/cancel contract over timeout, interval, and cron
/// primitives.
pub trait TimerDriver: Send + Sync {
    /// Start a one-shot schedule that fires `callback` once after `delay`.
    fn start_timeout(&self, delay: Duration, callback: JobCallback) -> TimerHandle;

    /// Start a recurring schedule that fires `callback` every `period`,
    /// first firing one period after the call.
    fn start_interval(&self, period: Duration, callback: JobCallback) -> TimerHandle;

    /// Start a schedule that fires `callback` on each occurrence of a
    /// cron expression (six fields: sec min hour day month weekday).
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidCron`] if the expression does not parse.
    fn start_cron(&self, expression: &str, callback: JobCallback)
        -> Result<TimerHandle, TimerError>;

    /// Cancel a schedule. Safe to call at most once per handle; after it
    /// returns, the handle's callback never fires again.
    fn cancel(&self, handle: TimerHandle);

    /// Number of started schedules that have not been cancelled.
    fn outstanding(&self) -> usize;
}
