//! Runs one concurrency level.
use crate::transport::Transport;
use rampup_core::{BatchResult, Payload, RequestOutcome};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[cfg(feature = "metrics")]
const REQUEST_SUCCESS: &str = "rampup_requests_success";
#[cfg(feature = "metrics")]
const REQUEST_ERROR: &str = "rampup_requests_error";
#[cfg(feature = "metrics")]
const REQUEST_LATENCY: &str = "rampup_request_latency";

/// A batch abandoned because the run was cancelled while requests were in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchAborted {
    pub concurrency_level: u32,
    pub completed: usize,
}

/// Dispatches batches of concurrent requests to a single endpoint.
pub struct BatchExecutor<T> {
    transport: Arc<T>,
    endpoint: Arc<str>,
    payload: Arc<Payload>,
}

impl<T: Transport> BatchExecutor<T> {
    pub fn new(transport: Arc<T>, endpoint: &str, payload: Payload) -> Self {
        Self {
            transport,
            endpoint: Arc::from(endpoint),
            payload: Arc::new(payload),
        }
    }

    /// Send `concurrency_level` concurrent requests and wait for every one of them.
    ///
    /// Always yields exactly `concurrency_level` outcomes, in completion order.
    pub async fn execute(&self, concurrency_level: u32) -> BatchResult {
        match self
            .dispatch(concurrency_level, std::future::pending::<Infallible>())
            .await
        {
            Ok(batch) => batch,
            Err((never, _)) => match never {},
        }
    }

    /// Like [`execute`](Self::execute), but gives up on the batch once `cancelled` resolves,
    /// aborting whatever is still in flight.
    pub async fn execute_until<C>(
        &self,
        concurrency_level: u32,
        cancelled: C,
    ) -> Result<BatchResult, BatchAborted>
    where
        C: Future<Output = ()>,
    {
        self.dispatch(concurrency_level, cancelled)
            .await
            .map_err(|((), completed)| BatchAborted {
                concurrency_level,
                completed,
            })
    }

    /// Runs the batch until every request is back or `cancelled` yields a reason to stop, which is
    /// handed back along with the number of requests that had completed.
    async fn dispatch<C, E>(
        &self,
        concurrency_level: u32,
        cancelled: C,
    ) -> Result<BatchResult, (E, usize)>
    where
        C: Future<Output = E>,
    {
        let mut tasks = JoinSet::new();

        let start = Instant::now();
        for _ in 0..concurrency_level {
            let transport = self.transport.clone();
            let endpoint = self.endpoint.clone();
            let payload = self.payload.clone();
            tasks.spawn(async move { transport.send(&endpoint, &payload).await });
        }
        trace!("{concurrency_level} requests in flight");

        let mut outcomes = Vec::with_capacity(concurrency_level as usize);
        tokio::pin!(cancelled);

        loop {
            tokio::select! {
                biased;

                reason = &mut cancelled => {
                    debug!(
                        "Aborting batch of {concurrency_level} with {} request(s) complete",
                        outcomes.len()
                    );
                    tasks.shutdown().await;
                    return Err((reason, outcomes.len()));
                }

                joined = tasks.join_next() => match joined {
                    Some(Ok(outcome)) => {
                        record(&outcome);
                        outcomes.push(outcome);
                    }
                    Some(Err(err)) => {
                        // NOTE: A panicking transport still has to account for its slot in the batch.
                        error!("Request task failed: {err}");
                        let outcome = RequestOutcome::failure(
                            start.elapsed(),
                            format!("request task failed: {err}"),
                        );
                        record(&outcome);
                        outcomes.push(outcome);
                    }
                    None => break,
                },
            }
        }

        let wall_clock = start.elapsed();
        debug!(
            "Batch of {concurrency_level} finished in {}",
            humantime::format_duration(wall_clock)
        );

        Ok(BatchResult::new(concurrency_level, outcomes, wall_clock))
    }
}

#[cfg(feature = "metrics")]
fn record(outcome: &RequestOutcome) {
    metrics::histogram!(REQUEST_LATENCY).record(outcome.elapsed_latency.as_secs_f64());
    if outcome.succeeded {
        metrics::counter!(REQUEST_SUCCESS).increment(1);
    } else {
        metrics::counter!(REQUEST_ERROR).increment(1);
    }
}

#[cfg(not(feature = "metrics"))]
fn record(_outcome: &RequestOutcome) {}
