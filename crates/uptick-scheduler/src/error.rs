//! Scheduler error types.

use thiserror::Error;

/// Infrastructure failures that abort a cycle.
///
/// Endpoint failures are never errors; they are DOWN results.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to persist results: {0}")]
    Store(#[from] uptick_store::StoreError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
