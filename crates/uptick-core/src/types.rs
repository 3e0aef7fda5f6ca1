//! Shared types used across uptick crates.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability verdict for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Up => "✓",
            Status::Down => "✗",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a probe attempt did not count as UP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// No response within the configured timeout.
    Timeout,
    /// DNS failure, refused or reset connection, TLS failure, bad URL.
    ConnectionError,
    /// The server answered with a status code >= 400.
    HttpError,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionError => "connection-error",
            ErrorKind::HttpError => "http-error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A monitored service: a named, ordered group of endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub description: String,
    pub endpoints: Vec<String>,
}

impl Service {
    pub fn new(name: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            endpoints,
        }
    }
}

/// Total endpoint count across a set of services.
pub fn endpoint_count(services: &[Service]) -> usize {
    services.iter().map(|s| s.endpoints.len()).sum()
}

/// Outcome of one HTTP attempt against one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub url: String,
    /// Absent when no response was received.
    pub status_code: Option<u16>,
    /// Wall-clock duration of the attempt.
    pub latency: Duration,
    /// `None` means the attempt succeeded.
    pub error: Option<ErrorKind>,
    /// Underlying error text, when there is one.
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ProbeOutcome {
    /// A response was received; UP when the code is below 400.
    pub fn response(url: impl Into<String>, status_code: u16, latency: Duration) -> Self {
        Self {
            url: url.into(),
            status_code: Some(status_code),
            latency,
            error: (status_code >= 400).then_some(ErrorKind::HttpError),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn timeout(url: impl Into<String>, latency: Duration) -> Self {
        Self {
            url: url.into(),
            status_code: None,
            latency,
            error: Some(ErrorKind::Timeout),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn connection_error(
        url: impl Into<String>,
        latency: Duration,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code: None,
            latency,
            error: Some(ErrorKind::ConnectionError),
            detail: Some(detail.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.error.is_none()
    }

    pub fn status(&self) -> Status {
        if self.is_up() { Status::Up } else { Status::Down }
    }
}

/// Final verdict for one endpoint in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub service: String,
    pub url: String,
    pub status: Status,
    pub status_code: Option<u16>,
    /// Latency of the attempt that produced the verdict, 2 decimals.
    pub response_time_ms: f64,
    #[serde(default)]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CheckResult {
    /// Fold the deciding attempt into a result for `service`.
    pub fn from_outcome(service: impl Into<String>, outcome: ProbeOutcome) -> Self {
        let status = outcome.status();
        Self {
            service: service.into(),
            url: outcome.url,
            status,
            status_code: outcome.status_code,
            response_time_ms: round_millis(outcome.latency),
            error: outcome.error,
            error_detail: outcome.detail,
            timestamp: outcome.timestamp,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }
}

/// All results of one cycle, in configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckBatch {
    pub timestamp: DateTime<Utc>,
    pub results: Vec<CheckResult>,
}

impl CheckBatch {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            results: Vec::new(),
        }
    }

    pub fn with_capacity(timestamp: DateTime<Utc>, capacity: usize) -> Self {
        Self {
            timestamp,
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter()
    }

    pub fn all_up(&self) -> bool {
        self.results.iter().all(CheckResult::is_up)
    }
}

/// Milliseconds rounded to two decimals.
pub fn round_millis(d: Duration) -> f64 {
    (d.as_secs_f64() * 100_000.0).round() / 100.0
}
