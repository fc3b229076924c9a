use crate::transport::{from_fn, Transport};
use rampup_core::RequestOutcome;
use rand_distr::{Distribution, SkewNormal};
use std::time::Duration;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Every request succeeds after `latency`.
pub fn fixed(latency: Duration) -> impl Transport {
    from_fn(move |_, _| async move {
        tokio::time::sleep(latency).await;
        RequestOutcome::success(latency)
    })
}

/// Every request fails immediately, as against an unreachable endpoint.
pub fn refused() -> impl Transport {
    from_fn(|_, _| async { RequestOutcome::failure(Duration::ZERO, "connection refused") })
}

/// Skewed latency around `mean`.
pub fn jittered(mean: Duration, std: Duration) -> impl Transport {
    from_fn(move |_, _| {
        let normal = SkewNormal::new(mean.as_secs_f64(), std.as_secs_f64(), 20.).unwrap();
        let latency = Duration::from_secs_f64(normal.sample(&mut rand::thread_rng()).max(0.));
        async move {
            tokio::time::sleep(latency).await;
            RequestOutcome::success(latency)
        }
    })
}
