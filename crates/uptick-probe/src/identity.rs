//! Request identity rotation and throttling.
//!
//! The rotator is owned by the service checker and advanced once per
//! endpoint check. It is not thread-safe on its own; the checker keeps it
//! behind a lock held for the duration of a cycle.

use std::time::Duration;

/// Identity used when no user agents are configured.
pub const FALLBACK_IDENTITY: &str = concat!("uptick/", env!("CARGO_PKG_VERSION"));

/// Round-robin cursor over the configured user agents.
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    identities: Vec<String>,
    cursor: usize,
    delay: Duration,
}

impl IdentityRotator {
    pub fn new(identities: Vec<String>, delay: Duration) -> Self {
        Self {
            identities,
            cursor: 0,
            delay,
        }
    }

    /// Return the next identity, wrapping to the first after the last.
    pub fn next_identity(&mut self) -> String {
        if self.identities.is_empty() {
            return FALLBACK_IDENTITY.to_string();
        }
        let identity = self.identities[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.identities.len();
        identity
    }

    /// Fixed pause between consecutive endpoint checks.
    pub fn throttle_delay(&self) -> Duration {
        self.delay
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
