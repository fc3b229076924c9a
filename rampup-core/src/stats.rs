use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSecondsWithFrac};
use std::fmt;
use std::time::Duration;

/// Summary statistics for one concurrency level.
///
/// Latency fields only cover successful requests and are `None` when nothing succeeded.
/// Durations serialize as fractional milliseconds.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub concurrency_level: u32,
    pub count_succeeded: usize,
    pub count_failed: usize,
    #[serde_as(as = "Option<DurationMilliSecondsWithFrac<f64>>")]
    pub mean_latency: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSecondsWithFrac<f64>>")]
    pub max_latency: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSecondsWithFrac<f64>>")]
    pub p95_latency: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSecondsWithFrac<f64>>")]
    pub min_latency: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSecondsWithFrac<f64>>")]
    pub p50_latency: Option<Duration>,
    /// Successful requests per second of batch wall-clock time. `None` for a zero-length batch.
    pub throughput_requests_per_second: Option<f64>,
    pub error_rate: f64,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub wall_clock_duration: Duration,
    /// Distribution of successful latencies. Holds at least one bucket whenever a request
    /// succeeded and is empty when none did.
    pub latency_histogram_buckets: Vec<HistogramBucket>,
}

/// Equal-width latency bin, `[lower, upper)`. The last bin of a histogram also holds `upper`.
///
/// Only successful latencies are binned, so a level where every request failed has no buckets.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub lower: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub upper: Duration,
    pub count: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Concurrency={}, Ok={}, Err={}, mean={}, p95={}, max={}, TPS={}",
            self.concurrency_level,
            self.count_succeeded,
            self.count_failed,
            Latency(self.mean_latency),
            Latency(self.p95_latency),
            Latency(self.max_latency),
            match self.throughput_requests_per_second {
                Some(tps) => format!("{tps:.2}"),
                None => "n/a".to_string(),
            },
        )
    }
}

/// Ordered per-level summaries of a run.
///
/// `partial` is set when the run was cancelled before every planned level finished.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub endpoint: String,
    pub partial: bool,
    pub summaries: Vec<BatchSummary>,
}

impl RunReport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            partial: false,
            summaries: vec![],
        }
    }

    pub fn push(&mut self, summary: BatchSummary) {
        self.summaries.push(summary);
    }

    pub fn into_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Concurrency levels in the order they ran.
    pub fn levels(&self) -> Vec<u32> {
        self.summaries.iter().map(|s| s.concurrency_level).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.endpoint)?;
        for summary in &self.summaries {
            writeln!(f, "  {summary}")?;
        }
        if self.partial {
            writeln!(f, "  (cancelled; partial report)")?;
        }
        Ok(())
    }
}

/// Display helper for latencies that may be absent.
pub struct Latency(pub Option<Duration>);

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(latency) => write!(f, "{:.2}ms", latency.as_secs_f64() * 1e3),
            None => write!(f, "n/a"),
        }
    }
}
