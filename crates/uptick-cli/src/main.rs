//! uptick — availability poller for third-party HTTP endpoints.
//!
//! # Usage
//!
//! ```text
//! uptick --config uptick.toml            # poll every check_interval_minutes
//! uptick --config uptick.toml --once     # one cycle; exit 1 if anything is DOWN
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use uptick_checker::Report;
use uptick_core::UptickConfig;
use uptick_probe::HttpProbe;
use uptick_scheduler::Scheduler;
use uptick_store::ResultStore;

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "uptick",
    about = "Availability poller for third-party HTTP endpoints",
    version
)]
struct Cli {
    /// Run a single check cycle and exit; exit code 1 if any endpoint is DOWN.
    #[arg(long)]
    once: bool,

    /// Configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long, default_value = "uptick.toml")]
    config: PathBuf,

    /// Where the latest results snapshot is written.
    #[arg(short, long, default_value = "latest_results.json")]
    output: PathBuf,

    /// Plain-text log file, appended to alongside console output.
    #[arg(long, default_value = "availability_log.txt")]
    log_file: PathBuf,

    /// Log to the console only.
    #[arg(long)]
    no_log_file: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = logging::init((!cli.no_log_file).then_some(cli.log_file.as_path()))?;

    println!("uptick availability monitor v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "=".repeat(45));

    let config = UptickConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    info!(
        path = %cli.config.display(),
        services = config.services.len(),
        endpoints = config.endpoint_count(),
        interval_minutes = config.check_interval_minutes,
        "configuration loaded"
    );

    let store = ResultStore::new(&cli.output);
    match store.load() {
        Ok(Some(previous)) => info!(
            last_check = %previous.last_check,
            results = previous.results.len(),
            "previous snapshot found"
        ),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "previous snapshot unreadable; it will be replaced"),
    }

    let probe = HttpProbe::new().context("failed to build HTTP client")?;
    let scheduler = Scheduler::from_config(&config, probe, store)
        .with_callback(Arc::new(|report: &Report| print!("{report}")));

    if cli.once {
        let status = scheduler.run_once().await;
        info!(exit_code = status.code(), "single check finished");
        return Ok(ExitCode::from(status.code()));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(shutdown_tx));

    scheduler.run(shutdown_rx).await;
    Ok(ExitCode::SUCCESS)
}

/// First signal stops scheduling; a second one exits immediately.
async fn forward_shutdown(shutdown_tx: watch::Sender<bool>) {
    shutdown_signal().await;
    info!("shutdown signal received; finishing current cycle");
    let _ = shutdown_tx.send(true);

    shutdown_signal().await;
    warn!("second shutdown signal; exiting without waiting");
    std::process::exit(130);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_select_continuous_mode() {
        let cli = Cli::try_parse_from(["uptick"]).unwrap();
        assert!(!cli.once);
        assert!(!cli.no_log_file);
        assert_eq!(cli.config, PathBuf::from("uptick.toml"));
        assert_eq!(cli.output, PathBuf::from("latest_results.json"));
        assert_eq!(cli.log_file, PathBuf::from("availability_log.txt"));
    }

    #[test]
    fn once_flag_and_paths() {
        let cli = Cli::try_parse_from([
            "uptick",
            "--once",
            "-c",
            "/etc/uptick/config.json",
            "--output",
            "/var/lib/uptick/latest.json",
            "--no-log-file",
        ])
        .unwrap();
        assert!(cli.once);
        assert!(cli.no_log_file);
        assert_eq!(cli.config, PathBuf::from("/etc/uptick/config.json"));
        assert_eq!(cli.output, PathBuf::from("/var/lib/uptick/latest.json"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["uptick", "--forever"]).is_err());
    }

    #[test]
    fn sample_config_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/uptick.toml");
        let config = UptickConfig::from_file(&path).unwrap();
        assert!(config.endpoint_count() > 0);
        assert!(!config.user_agents.is_empty());
    }
}
