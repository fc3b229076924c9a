mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;
    use rampup::prelude::*;
    use serde_json::json;
    use std::num::NonZeroUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn config(path: &str, payload: serde_json::Value, start: u32, max: u32) -> RunConfig {
        RunConfig::new(mock_url(path), payload, start, max, Duration::from_millis(300))
            .levels(NonZeroUsize::new(3).unwrap())
            .cooldown(Duration::from_millis(50))
    }

    fn transport() -> Arc<HttpTransport> {
        Arc::new(HttpTransport::with_timeout(Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn ramp_delay_endpoint() {
        init().await;

        let report = run(&config("/delay/ms/10", json!({}), 2, 10), transport())
            .await
            .unwrap();

        assert!(!report.partial);
        assert_eq!(report.levels(), vec![2, 6, 10]);
        for summary in &report.summaries {
            assert_eq!(summary.count_failed, 0);
            assert!(summary.p95_latency.unwrap() >= Duration::from_millis(10));
            assert!(summary.throughput_requests_per_second.unwrap() > 0.);
        }
    }

    #[tokio::test]
    async fn ramp_calculate_power() {
        init().await;

        let payload = json!({"number": 3.0, "power": 4});
        let report = run(&config("/calculate-power", payload, 5, 5), transport())
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.summaries[0].count_succeeded, 5);
    }

    #[tokio::test]
    async fn invalid_payload_counts_as_failure() {
        init().await;

        let report = run(&config("/calculate-square", json!({}), 1, 3), transport())
            .await
            .unwrap();

        assert_eq!(report.levels(), vec![1, 2, 3]);
        assert!(report.summaries.iter().all(|s| s.count_succeeded == 0));
    }

    #[tokio::test]
    async fn server_errors_recorded_per_level() {
        init().await;

        let report = run(&config("/fail", json!({}), 4, 8), transport())
            .await
            .unwrap();

        assert_eq!(report.len(), 3);
        for summary in &report.summaries {
            assert_eq!(summary.count_failed, summary.concurrency_level as usize);
            assert_eq!(summary.mean_latency, None);
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint() {
        let config = RunConfig::new(
            "http://127.0.0.1:1/nothing",
            json!({}),
            1,
            2,
            Duration::from_millis(200),
        )
        .cooldown(Duration::ZERO);

        let report = run(&config, transport()).await.unwrap();

        assert_eq!(report.levels(), vec![1, 2]);
        assert!(report.summaries.iter().all(|s| s.count_succeeded == 0));
    }

    #[tokio::test]
    async fn cancel_mid_run() {
        init().await;

        let handle = CancelHandle::new();
        let config = RunConfig::new(
            mock_url("/delay/ms/20"),
            json!({}),
            1,
            5,
            Duration::from_secs(5),
        )
        .levels(NonZeroUsize::new(5).unwrap());

        let canceller = {
            let handle = handle.clone();
            tokio::spawn(async move {
                // One second per level: lands while level 2 waits out its slot.
                tokio::time::sleep(Duration::from_millis(1_500)).await;
                handle.cancel();
            })
        };

        let err = run_with_cancel(&config, transport(), handle.signal())
            .await
            .unwrap_err();
        canceller.await.unwrap();

        let report = err.into_partial_report().unwrap();
        assert!(report.partial);
        assert_eq!(report.levels(), vec![1, 2]);
    }

    #[tokio::test]
    async fn run_lasts_total_duration() {
        init().await;

        let config = RunConfig::new(mock_url("/delay/ms/5"), json!({}), 1, 4, Duration::from_secs(2))
            .levels(NonZeroUsize::new(4).unwrap());
        let start = std::time::Instant::now();
        let report = run(&config, transport()).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(report.levels(), vec![1, 2, 3, 4]);
        assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[tokio::test]
    async fn rate_limited_endpoint_degrades() {
        init().await;

        let config = RunConfig::new(
            mock_url("/max/20/delay/ms/1/scenario/ramp"),
            json!({}),
            10,
            200,
            Duration::from_millis(200),
        )
        .levels(NonZeroUsize::new(2).unwrap())
        .cooldown(Duration::ZERO);

        let report = run(&config, transport()).await.unwrap();
        let last = report.summaries.last().unwrap();

        assert_eq!(last.concurrency_level, 200);
        assert!(last.count_failed > 0);
    }
}
