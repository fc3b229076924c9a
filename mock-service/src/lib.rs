use axum::{
    debug_handler,
    extract::{Json, Path},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    time::{Duration, Instant},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub fn router() -> Router {
    Router::new()
        .route("/calculate-power", post(calculate_power))
        .route("/calculate-square", post(calculate_square))
        .route("/delay/ms/:delay_ms", get(delay).post(delay))
        .route("/fail", get(fail).post(fail))
        .route(
            "/max/:max_tps/delay/ms/:delay_ms/scenario/:scenario_name",
            get(max).post(max),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn run(addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!("Mock service listening on {addr}");
    axum::serve(listener, router()).await
}

/** Calculation endpoints **/

#[derive(Debug, Deserialize)]
pub struct PowerRequest {
    pub number: f64,
    pub power: i32,
}

#[derive(Debug, Deserialize)]
pub struct SquareRequest {
    pub number: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Calculation {
    pub result: f64,
    /// Seconds the handler spent computing the result.
    pub process_time: f64,
}

#[debug_handler]
pub async fn calculate_power(Json(payload): Json<PowerRequest>) -> Json<Calculation> {
    timed(async move { payload.number.powi(payload.power) }).await
}

#[debug_handler]
pub async fn calculate_square(Json(payload): Json<SquareRequest>) -> Json<Calculation> {
    timed(async move { payload.number.powi(2) }).await
}

async fn timed<F: Future<Output = f64>>(func: F) -> Json<Calculation> {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    let start = Instant::now();
    let result = func.await;
    let process_time = start.elapsed();
    info!("Response time: {:?}", process_time);

    Json(Calculation {
        result,
        process_time: process_time.as_secs_f64(),
    })
}

/** Latency and failure endpoints **/

#[debug_handler]
pub async fn delay(Path(delay_ms): Path<u64>) {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

#[debug_handler]
pub async fn fail() -> StatusCode {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    StatusCode::INTERNAL_SERVER_ERROR
}

lazy_static! {
    static ref MAX_MAP: Arc<RwLock<HashMap<String, DefaultDirectRateLimiter>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Succeeds up to `max_tps` per scenario name, then errors.
#[debug_handler]
pub async fn max(
    Path((max_tps, delay_ms, scenario_name)): Path<(u32, u64, String)>,
) -> Result<(), StatusCode> {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let max_tps = NonZeroU32::new(max_tps).ok_or(StatusCode::BAD_REQUEST)?;

    {
        let map = MAX_MAP
            .read()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if let Some(limiter) = map.get(&scenario_name) {
            return limiter
                .check()
                .map_err(|_| StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    // NOTE: Installed under the write lock so concurrent first requests share one limiter.
    let mut map = MAX_MAP
        .write()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let res = map
        .entry(scenario_name)
        .or_insert_with_key(|scenario_name| {
            debug!("Starting limiter for {scenario_name} at {max_tps} TPS");
            rate_limiter(max_tps)
        })
        .check()
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE);
    res
}

/** Utils **/

pub fn rate_limiter(tps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(tps))
}

/** TPS Printer **/

static TPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn tps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let transactions = TPS_MEASURE.swap(0, Ordering::Relaxed);
        info!("{transactions} TPS");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let res = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn power() {
        let (status, body) =
            post_json("/calculate-power", serde_json::json!({"number": 2.0, "power": 10})).await;
        assert_eq!(status, StatusCode::OK);

        let calc: Calculation = serde_json::from_slice(&body).unwrap();
        assert_eq!(calc.result, 1024.);
        assert!(calc.process_time >= 0.);
    }

    #[tokio::test]
    async fn square() {
        let (status, body) =
            post_json("/calculate-square", serde_json::json!({"number": 1.5})).await;
        assert_eq!(status, StatusCode::OK);

        let calc: Calculation = serde_json::from_slice(&body).unwrap();
        assert_eq!(calc.result, 2.25);
    }

    #[tokio::test]
    async fn bad_payload_is_rejected() {
        let (status, _) = post_json("/calculate-square", serde_json::json!({"num": 1})).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn fail_is_server_error() {
        let (status, _) = post_json("/fail", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_share_a_limiter() {
        let tasks: Vec<_> = (0..10)
            .map(|_| {
                tokio::spawn(post_json(
                    "/max/2/delay/ms/5/scenario/shared-first-burst",
                    serde_json::json!({}),
                ))
            })
            .collect();

        let mut ok = 0;
        let mut limited = 0;
        for task in tasks {
            match task.await.unwrap().0 {
                StatusCode::OK => ok += 1,
                StatusCode::SERVICE_UNAVAILABLE => limited += 1,
                status => panic!("unexpected {status}"),
            }
        }

        assert!(ok <= 2, "{ok} requests got through a 2 TPS limit");
        assert_eq!(ok + limited, 10);
    }

    #[tokio::test]
    async fn max_rejects_zero_tps() {
        let (status, _) = post_json("/max/0/delay/ms/0/scenario/zero-tps", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delay_accepts_posted_payload() {
        let (status, _) = post_json("/delay/ms/1", serde_json::json!({"number": 3})).await;
        assert_eq!(status, StatusCode::OK);
    }
}
