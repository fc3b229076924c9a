//! Reduces a finished batch into its summary statistics.
use rampup_core::{
    BatchResult, BatchSummary, HistogramBucket, DEFAULT_HISTOGRAM_BINS, P50_PERCENTILE,
    P95_PERCENTILE,
};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Summarize a batch using [`DEFAULT_HISTOGRAM_BINS`] latency buckets.
pub fn summarize(batch: &BatchResult) -> BatchSummary {
    summarize_with_bins(batch, DEFAULT_HISTOGRAM_BINS)
}

/// Summarize a batch. Pure: the same batch always yields the same summary.
///
/// Latency statistics only consider successful requests; failures are counted but the time a
/// failed request took says nothing about the service.
pub fn summarize_with_bins(batch: &BatchResult, bins: NonZeroUsize) -> BatchSummary {
    let mut latencies: Vec<Duration> = batch
        .outcomes()
        .iter()
        .filter(|o| o.succeeded)
        .map(|o| o.elapsed_latency)
        .collect();
    latencies.sort_unstable();

    let count_succeeded = latencies.len();
    let count_failed = batch.len() - count_succeeded;
    let error_rate = if batch.is_empty() {
        0.
    } else {
        count_failed as f64 / batch.len() as f64
    };

    BatchSummary {
        concurrency_level: batch.concurrency_level(),
        count_succeeded,
        count_failed,
        mean_latency: mean(&latencies),
        max_latency: latencies.last().copied(),
        p95_latency: nearest_rank(&latencies, P95_PERCENTILE),
        min_latency: latencies.first().copied(),
        p50_latency: nearest_rank(&latencies, P50_PERCENTILE),
        throughput_requests_per_second: throughput(count_succeeded, batch.wall_clock_duration()),
        error_rate,
        wall_clock_duration: batch.wall_clock_duration(),
        latency_histogram_buckets: histogram(&latencies, bins),
    }
}

fn mean(latencies: &[Duration]) -> Option<Duration> {
    if latencies.is_empty() {
        return None;
    }

    let total: u128 = latencies.iter().map(Duration::as_nanos).sum();
    let mean = total / latencies.len() as u128;
    Some(Duration::from_nanos(mean as u64))
}

/// Nearest-rank percentile over an ascending slice: rank `ceil(p/100 * n)`, 1-indexed.
fn nearest_rank(sorted: &[Duration], percentile: u32) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }

    let n = sorted.len();
    let rank = (percentile as usize * n).div_ceil(100).clamp(1, n);
    Some(sorted[rank - 1])
}

fn throughput(count: usize, wall_clock: Duration) -> Option<f64> {
    if wall_clock.is_zero() {
        None
    } else {
        Some(count as f64 / wall_clock.as_secs_f64())
    }
}

/// Equal-width buckets spanning the observed `[min, max]` of an ascending slice.
fn histogram(sorted: &[Duration], bins: NonZeroUsize) -> Vec<HistogramBucket> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return vec![];
    };

    if min == max {
        return vec![HistogramBucket {
            lower: min,
            upper: max,
            count: sorted.len(),
        }];
    }

    let bins = bins.get() as u128;
    let span = (max - min).as_nanos();
    let edge = |i: u128| min + Duration::from_nanos((span * i / bins) as u64);

    let mut buckets: Vec<HistogramBucket> = (0..bins)
        .map(|i| HistogramBucket {
            lower: edge(i),
            upper: if i + 1 == bins { max } else { edge(i + 1) },
            count: 0,
        })
        .collect();

    for latency in sorted {
        let idx = ((*latency - min).as_nanos() * bins / span).min(bins - 1);
        buckets[idx as usize].count += 1;
    }

    buckets
}
