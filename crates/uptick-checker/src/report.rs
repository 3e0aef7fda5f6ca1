//! Availability report — summary statistics over one batch.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use uptick_core::{CheckBatch, ErrorKind};

/// Read-only summary of a [`CheckBatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub checked_at: DateTime<Utc>,
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// Share of UP endpoints, rounded to one decimal. 0.0 for an empty batch.
    pub up_percentage: f64,
    pub down_entries: Vec<DownEntry>,
}

/// A DOWN endpoint, highlighted in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownEntry {
    pub service: String,
    pub url: String,
    pub status_code: Option<u16>,
    pub error: Option<ErrorKind>,
}

impl DownEntry {
    fn reason(&self) -> String {
        match (self.error, self.status_code) {
            (Some(ErrorKind::HttpError), Some(code)) => format!("http-error {code}"),
            (Some(kind), _) => kind.label().to_string(),
            (None, Some(code)) => format!("status {code}"),
            (None, None) => "DOWN".to_string(),
        }
    }
}

/// Summarize a batch. Pure: the same batch always yields the same report.
pub fn summarize(batch: &CheckBatch) -> Report {
    let total = batch.len();
    let up = batch.iter().filter(|r| r.is_up()).count();
    let down = total - up;

    let down_entries = batch
        .iter()
        .filter(|r| !r.is_up())
        .map(|r| DownEntry {
            service: r.service.clone(),
            url: r.url.clone(),
            status_code: r.status_code,
            error: r.error,
        })
        .collect();

    Report {
        checked_at: batch.timestamp,
        total,
        up,
        down,
        up_percentage: percentage(up, total),
        down_entries,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

impl Report {
    pub fn all_up(&self) -> bool {
        self.down == 0
    }

    /// Console/log rendering of the report.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("\n=== Availability Report ===\n");
        out.push_str(&format!("Total Endpoints Checked: {}\n", self.total));
        out.push_str(&format!("UP: {} ({:.1}%)\n", self.up, self.up_percentage));
        out.push_str(&format!("DOWN: {}\n", self.down));

        for entry in &self.down_entries {
            out.push_str(&format!(
                "  ✗ {} - {} - {}\n",
                entry.service,
                entry.url,
                entry.reason()
            ));
        }

        out.push_str(&format!(
            "Check Time: {}\n",
            self.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&"=".repeat(40));
        out.push('\n');

        out
    }

    /// Machine-readable rendering of the same report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
