#![cfg_attr(docsrs, feature(doc_cfg))]
//! Concurrency ramp-up load generation.
//!
//! A run walks a [`RampPlan`] of increasing concurrency levels. For each level the
//! [`BatchExecutor`] dispatches that many concurrent requests through a [`Transport`], waits for
//! every one of them, and the batch is reduced by [`summarize`] into a [`BatchSummary`] appended
//! to the [`RunReport`].
//!
//! ```no_run
//! use rampup::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RunConfig::new(
//!         "http://localhost:8000/calculate-square",
//!         serde_json::json!({"number": 4}),
//!         10,
//!         50,
//!         Duration::from_secs(30),
//!     );
//!
//!     let transport = rampup::transport::from_fn(|_endpoint, _payload| async {
//!         RequestOutcome::success(Duration::from_millis(1))
//!     });
//!
//!     let report = rampup::run(&config, Arc::new(transport)).await.unwrap();
//!     println!("{report}");
//! }
//! ```

pub mod cancel;
pub mod executor;
pub mod scheduler;
pub mod stats;
pub mod transport;

mod error;
#[cfg(test)]
mod testing;

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod http;

pub use cancel::{CancelHandle, CancelSignal};
pub use error::RunError;
pub use executor::BatchExecutor;
pub use scheduler::{plan, run, run_with_cancel, RampPlan};
pub use stats::summarize;
pub use transport::Transport;

pub use rampup_core::{
    BatchResult, BatchSummary, ConfigError, HistogramBucket, Latency, Payload, RequestOutcome,
    RunConfig, RunReport,
};

pub mod prelude {
    pub use crate::cancel::{CancelHandle, CancelSignal};
    pub use crate::error::RunError;
    pub use crate::scheduler::{run, run_with_cancel, RampPlan};
    pub use crate::transport::Transport;
    pub use rampup_core::{BatchSummary, Payload, RequestOutcome, RunConfig, RunReport};

    #[cfg(feature = "http")]
    pub use crate::http::HttpTransport;
}
