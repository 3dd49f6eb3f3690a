//! Timer capability for the metronome scheduler.
//!
//! This crate wraps the platform's delay, interval, and cron primitives
//! behind a uniform start/cancel contract:
//!
//! - **Timeouts**: fire a callback once after a delay
//! - **Intervals**: fire a callback at a fixed period
//! - **Cron**: fire a callback on a cron schedule, evaluated in a
//!   configurable timezone via `chrono-tz`
//!
//! Every started schedule is represented by an opaque [`TimerHandle`].
//! Cancelling a handle is immediate and unconditional: once cancelled,
//! its callback never fires again, even if it was already due.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use metronome_timers::{job_fn, TimerDriver, TokioTimerDriver};
//!
//! let driver = TokioTimerDriver::new(chrono_tz::UTC);
//! let handle = driver.start_interval(
//!     Duration::from_secs(60),
//!     job_fn(|| async { do_work().await }),
//! );
//!
//! // Later:
//! driver.cancel(handle);
//! ```

mod driver;
mod error;
mod tokio_driver;

pub use driver::{job_fn, JobCallback, TimerDriver, TimerHandle};
pub use error::TimerError;
pub use tokio_driver::{validate_cron_expression, TokioTimerDriver};
