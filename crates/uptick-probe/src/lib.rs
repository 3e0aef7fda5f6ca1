//! uptick-probe — endpoint probing for the uptick poller.
//!
//! Provides a single-attempt HTTP probe, a retrying wrapper with
//! exponential backoff, and the round-robin identity rotation used to
//! vary the `User-Agent` between requests.
//!
//! # Architecture
//!
//! ```text
//! RetryingProbe<P: Probe>
//!   ├── P::probe(url, timeout, identity) → ProbeOutcome   (one attempt)
//!   ├── backoff_delay(base, max, attempt) between failures
//!   └── CheckResult from the deciding attempt
//!
//! IdentityRotator
//!   ├── next_identity() → round-robin over configured user agents
//!   └── throttle_delay() → fixed pause between endpoint checks
//! ```
//!
//! Probes never fail: timeouts, connection errors and HTTP error codes
//! are all reported as classified DOWN outcomes.

pub mod error;
pub mod identity;
pub mod probe;
pub mod retry;

pub use error::{ProbeInitError, ProbeInitResult};
pub use identity::IdentityRotator;
pub use probe::{HttpProbe, Probe};
pub use retry::{RetryPolicy, RetryingProbe, backoff_delay};
