//! uptick-store — durable snapshot of the latest check batch.
//!
//! The snapshot is a single JSON document replaced atomically on every
//! cycle: it is written to a temporary file in the same directory and
//! renamed over the previous one, so readers see either the old or the
//! new document, never a partial one.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{ResultStore, Snapshot};
