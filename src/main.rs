mod config;
mod core;
mod db;
mod report;
mod rpc;
mod signals;

use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::AnalysisError;
use crate::core::pipeline::{AnalysisContext, run_analysis};
use crate::report::RankedReport;
use crate::rpc::MoneroRpc;

const USAGE: &str = "Usage: ringrank <tx_hash>";

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the ranked table
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ringrank=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(tx_hash) = tx_hash_arg(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(1);
    };

    let config_path = std::env::var("RINGRANK_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = Config::load(&config_path);
    tracing::debug!("Config: {:?}", config);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match rt.block_on(analyze(&config, tx_hash)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

/// The single positional argument, trimmed. Anything else is a usage error.
fn tx_hash_arg(args: &[String]) -> Option<&str> {
    match args {
        [tx_hash] if !tx_hash.trim().is_empty() => Some(tx_hash.trim()),
        _ => None,
    }
}

async fn analyze(config: &Config, tx_hash: &str) -> Result<(), AnalysisError> {
    let url = config.daemon_url();
    let rpc = MoneroRpc::new(&url, Duration::from_secs(config.daemon.timeout_secs))
        .map_err(AnalysisError::TxFetch)?;
    tracing::info!("Monero daemon RPC at {url}");

    let ctx = AnalysisContext::new(rpc, config.analysis.clone());
    let report = run_analysis(&ctx, tx_hash).await?;
    emit(&report, config)
}

fn emit(report: &RankedReport, config: &Config) -> Result<(), AnalysisError> {
    println!();
    print!("{}", report::table::render_table(report));
    println!();
    print!("{}", report::table::render_summary(report));
    report::persist(report, &config.report)?;
    println!("Saved → {}", config.report.csv_path);
    Ok(())
}
