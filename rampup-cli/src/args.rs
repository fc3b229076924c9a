use clap::Parser;
use rampup::{Payload, RunConfig};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Ramp concurrent load against an HTTP endpoint and report latency for every level.
#[derive(Debug, Parser)]
#[command(name = "rampup", version, about)]
pub struct Args {
    /// Endpoint every request is POSTed to.
    #[arg(long)]
    pub url: String,

    /// JSON payload sent with each request.
    #[arg(long, default_value = "{}", value_parser = parse_payload)]
    pub payload: Payload,

    /// Initial number of concurrent requests.
    #[arg(long)]
    pub start_requests: u32,

    /// Maximum number of concurrent requests.
    #[arg(long)]
    pub max_requests: u32,

    /// Total duration of the test, e.g. `30`, `30s` or `2m`.
    #[arg(long, value_parser = parse_duration)]
    pub duration: Duration,

    /// Number of concurrency levels. Derived from the duration when omitted.
    #[arg(long)]
    pub levels: Option<NonZeroUsize>,

    /// Minimum pause between levels, applied when a level overruns its share of the duration.
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    pub cooldown: Duration,

    /// Per-request timeout.
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// HTML report path. Defaults to `Load_Test_<start>_<max>_<duration>sec.html`.
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Also write the raw report as JSON.
    #[arg(long)]
    pub json_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this address while the test runs.
    #[arg(long)]
    pub prometheus: Option<SocketAddr>,
}

impl Args {
    pub fn run_config(&self) -> RunConfig {
        let config = RunConfig::new(
            self.url.clone(),
            self.payload.clone(),
            self.start_requests,
            self.max_requests,
            self.duration,
        )
        .cooldown(self.cooldown);

        match self.levels {
            Some(levels) => config.levels(levels),
            None => config,
        }
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_file.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "Load_Test_{}_{}_{}sec.html",
                self.start_requests,
                self.max_requests,
                self.duration.as_secs()
            ))
        })
    }
}

fn parse_payload(s: &str) -> Result<Payload, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON payload: {e}"))
}

/// Bare numbers are seconds; anything else goes through `humantime`.
fn parse_duration(s: &str) -> Result<Duration, String> {
    match s.parse::<u64>() {
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => humantime::parse_duration(s).map_err(|e| e.to_string()),
    }
}
