//! Probe construction errors.

use thiserror::Error;

pub type ProbeInitResult<T> = Result<T, ProbeInitError>;

/// Errors that can occur while building the HTTP client.
///
/// Individual probe attempts never produce errors; see `ProbeOutcome`.
#[derive(Debug, Error)]
pub enum ProbeInitError {
    #[error("failed to configure TLS: {0}")]
    Tls(#[from] rustls::Error),
}
