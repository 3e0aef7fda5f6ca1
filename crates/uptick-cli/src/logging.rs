//! Log output: console plus an optional plain-text log file.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Workspace crates log at debug; dependencies stay at info.
const DEFAULT_FILTER: &str = "info,uptick=debug,uptick_core=debug,uptick_probe=debug,\
uptick_checker=debug,uptick_store=debug,uptick_scheduler=debug";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the process.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("invalid default log filter")?;

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}

/// Append-only appender writing to exactly `path`.
fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("log file path {} has no file name", path.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_appender_writes_to_exact_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/availability_log.txt");

        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"line\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn default_filter_enables_debug_for_every_workspace_crate() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        assert_eq!(
            filter.max_level_hint(),
            Some(tracing_subscriber::filter::LevelFilter::DEBUG)
        );

        let manifest = include_str!("../../../Cargo.toml");
        let members = manifest
            .lines()
            .filter_map(|l| l.trim().strip_prefix("\"crates/"))
            .filter_map(|l| l.split('"').next());
        for member in members {
            // The binary logs under its bin name.
            let crate_name = if member == "uptick-cli" { "uptick" } else { member };
            let target = format!("{}=debug", crate_name.replace('-', "_"));
            assert!(
                DEFAULT_FILTER.split(',').any(|d| d == target),
                "{target} missing from default filter"
            );
        }
    }

    #[test]
    fn file_appender_rejects_directory_path() {
        assert!(file_appender(Path::new("/")).is_err());
    }
}
