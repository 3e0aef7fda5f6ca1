//! uptick-scheduler — drives check cycles.
//!
//! Each cycle runs the service checker, summarizes the batch, hands the
//! report to an optional callback and persists the batch. Cycles never
//! overlap.
//!
//! # Modes
//!
//! - [`Scheduler::run_once`]: one cycle, then an [`ExitStatus`].
//! - [`Scheduler::run`]: a cycle immediately, then one per interval until
//!   the shutdown channel fires. A shutdown signal only prevents the next
//!   cycle; a cycle already in progress completes and is persisted.

pub mod error;
pub mod scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::{ExitStatus, ReportCallback, Scheduler, SchedulerState};
