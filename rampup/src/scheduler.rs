//! Walks the ramp plan one level at a time.
mod plan;

pub use plan::{plan, RampPlan};

use crate::cancel::CancelSignal;
use crate::error::RunError;
use crate::executor::BatchExecutor;
use crate::stats::summarize;
use crate::transport::Transport;
use rampup_core::{Latency, RunConfig, RunReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

#[cfg(feature = "metrics")]
const CONCURRENCY_LEVEL: &str = "rampup_concurrency_level";

/// Run every level of the config's ramp plan to completion.
pub async fn run<T: Transport>(config: &RunConfig, transport: Arc<T>) -> Result<RunReport, RunError> {
    run_with_cancel(config, transport, CancelSignal::never()).await
}

/// Run the ramp plan, stopping early once `cancel` is raised.
///
/// Each level owns an equal slot of `total_duration`: its batch runs, then the scheduler waits out
/// the rest of the slot, so the whole ramp takes roughly `total_duration`. Between two levels the
/// wait is never shorter than the configured cooldown, which only stretches the run when a batch
/// overruns its slot.
///
/// Levels never overlap: each batch finishes and is summarized before the next one starts, so a
/// level's throughput is not skewed by leftover load. A level where every request failed is still
/// recorded and the run moves on. On cancellation the levels completed so far are returned in a
/// partial report through [`RunError::Cancelled`].
#[instrument(name = "ramp", skip_all, fields(endpoint = %config.endpoint))]
pub async fn run_with_cancel<T: Transport>(
    config: &RunConfig,
    transport: Arc<T>,
    mut cancel: CancelSignal,
) -> Result<RunReport, RunError> {
    let plan = RampPlan::for_config(config)?;
    info!(
        "Ramping over {} level(s) with step {}: {:?}",
        plan.len(),
        plan.step(),
        plan.levels()
    );

    let slot = level_slot(config, &plan);
    debug!("Each level gets {}", humantime::format_duration(slot));

    let executor = BatchExecutor::new(transport, &config.endpoint, config.payload.clone());
    let mut report = RunReport::new(&config.endpoint);

    for (idx, level) in plan.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(cancelled(report));
        }
        let level_start = Instant::now();

        info!("Running with {level} concurrent requests...");
        #[cfg(feature = "metrics")]
        metrics::gauge!(CONCURRENCY_LEVEL).set(level as f64);

        let batch = match executor.execute_until(level, cancel.cancelled()).await {
            Ok(batch) => batch,
            Err(aborted) => {
                debug!("Abandoned {aborted:?}");
                return Err(cancelled(report));
            }
        };

        let summary = summarize(&batch);
        if summary.count_succeeded == 0 {
            warn!("All {level} requests failed; continuing with the next level.");
        } else {
            info!(
                "Average response time with {level} users: {}",
                Latency(summary.mean_latency)
            );
        }
        debug!("{summary}");
        report.push(summary);

        let last = idx + 1 == plan.len();
        let mut pause = slot.saturating_sub(level_start.elapsed());
        if !last {
            pause = pause.max(config.cooldown);
        }
        if !pause.is_zero() {
            trace!("Waiting {} before moving on", humantime::format_duration(pause));
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(report)),
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    info!("Ramp complete");
    Ok(report)
}

/// Equal share of the run's duration for every level of `plan`.
fn level_slot(config: &RunConfig, plan: &RampPlan) -> Duration {
    let levels = u32::try_from(plan.len()).unwrap_or(u32::MAX).max(1);
    config.total_duration / levels
}

fn cancelled(report: RunReport) -> RunError {
    warn!("Run cancelled after {} level(s)", report.len());
    RunError::Cancelled {
        report: report.into_partial(),
    }
}
