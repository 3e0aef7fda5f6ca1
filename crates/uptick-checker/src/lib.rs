//! uptick-checker — runs check cycles and summarizes them.
//!
//! A cycle walks every configured service and endpoint in order, one
//! request at a time, pausing for the throttle delay between endpoints.
//! The resulting [`CheckBatch`](uptick_core::CheckBatch) is folded into a
//! [`Report`] for display and logging.

pub mod checker;
pub mod report;

pub use checker::ServiceChecker;
pub use report::{DownEntry, Report, summarize};
