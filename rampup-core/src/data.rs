use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

/// Result of a single request attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOutcome {
    pub elapsed_latency: Duration,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl RequestOutcome {
    pub fn success(elapsed_latency: Duration) -> Self {
        Self {
            elapsed_latency,
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(elapsed_latency: Duration, detail: impl Into<String>) -> Self {
        Self {
            elapsed_latency,
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }

    /// Time a fallible request from just before it is polled to just after it resolves.
    ///
    /// An `Err` becomes a failed outcome carrying the error's message, so a transport built on top
    /// of this never raises past its own boundary.
    pub async fn timed<F, R, E>(request: F) -> Self
    where
        F: Future<Output = Result<R, E>>,
        E: Display,
    {
        let start = Instant::now();
        let res = request.await;
        let elapsed = start.elapsed();

        match res {
            Ok(_) => Self::success(elapsed),
            Err(err) => Self::failure(elapsed, err.to_string()),
        }
    }
}

/// Every outcome of one concurrency level, in completion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchResult {
    concurrency_level: u32,
    outcomes: Vec<RequestOutcome>,
    wall_clock_duration: Duration,
}

impl BatchResult {
    pub fn new(
        concurrency_level: u32,
        outcomes: Vec<RequestOutcome>,
        wall_clock_duration: Duration,
    ) -> Self {
        Self {
            concurrency_level,
            outcomes,
            wall_clock_duration,
        }
    }

    pub fn concurrency_level(&self) -> u32 {
        self.concurrency_level
    }

    /// Outcomes in the order the requests completed, not the order they were dispatched.
    pub fn outcomes(&self) -> &[RequestOutcome] {
        &self.outcomes
    }

    pub fn wall_clock_duration(&self) -> Duration {
        self.wall_clock_duration
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn error_count(&self) -> usize {
        self.len() - self.success_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Refused;

    impl Display for Refused {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "connection refused")
        }
    }

    #[tokio::test]
    async fn timed_captures_errors() {
        let ok = RequestOutcome::timed(async { Ok::<_, Refused>(()) }).await;
        assert!(ok.succeeded);
        assert_eq!(ok.error_detail, None);

        let err = RequestOutcome::timed(async { Err::<(), _>(Refused) }).await;
        assert!(!err.succeeded);
        assert_eq!(err.error_detail.as_deref(), Some("connection refused"));
    }

    #[test]
    fn counts() {
        let batch = BatchResult::new(
            3,
            vec![
                RequestOutcome::success(Duration::from_millis(3)),
                RequestOutcome::failure(Duration::from_millis(1), "HTTP 500"),
                RequestOutcome::success(Duration::from_millis(2)),
            ],
            Duration::from_millis(3),
        );

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.success_count(), 2);
        assert_eq!(batch.error_count(), 1);
    }
}
