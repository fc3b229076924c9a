mod args;
mod report;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use rampup::http::HttpTransport;
use rampup::{CancelHandle, RunError};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_LOG_FILTER: &str = "rampup=info";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        )
        .init();

    if let Some(addr) = args.prometheus {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("starting Prometheus exporter")?;
        info!("Serving metrics on {addr}");
    }

    let config = args.run_config();
    config.validate()?;

    let transport = Arc::new(HttpTransport::with_timeout(args.timeout)?);

    let handle = CancelHandle::new();
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; stopping the run.");
                handle.cancel();
            }
        });
    }

    info!(
        "Load testing {} from {} to {} concurrent requests over {}",
        config.endpoint,
        config.start_concurrency,
        config.max_concurrency,
        humantime::format_duration(config.total_duration)
    );

    let (report, cancelled) =
        match rampup::run_with_cancel(&config, transport, handle.signal()).await {
            Ok(report) => (report, false),
            Err(RunError::Cancelled { report }) => (report, true),
            Err(err) => return Err(err.into()),
        };

    let output_file = args.output_file();
    report::write_html(&report, &output_file)?;
    info!(
        "Interactive performance report saved to '{}'.",
        output_file.display()
    );

    if let Some(json_file) = &args.json_file {
        report::write_json(&report, json_file)?;
        info!("Raw report saved to '{}'.", json_file.display());
    }

    if cancelled {
        anyhow::bail!(
            "run cancelled after {} completed level(s); partial report written",
            report.len()
        );
    }

    Ok(())
}
