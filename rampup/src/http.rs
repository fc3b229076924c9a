//! HTTP transport backed by `reqwest`.
use crate::transport::Transport;
use rampup_core::{Payload, RequestOutcome, DEFAULT_REQUEST_TIMEOUT};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum HttpError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),
}

/// POSTs the payload as JSON. Any non-2xx response counts as a failed request.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Every request fails once `timeout` elapses, so no batch can hang on a silent server.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client. It should carry a timeout.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        endpoint: &str,
        payload: &Payload,
    ) -> impl Future<Output = RequestOutcome> + Send {
        let request = self.client.post(endpoint).json(payload);

        RequestOutcome::timed(async move {
            let res = request.send().await?;
            let status = res.status();
            if status.is_success() {
                Ok::<_, HttpError>(())
            } else {
                Err(HttpError::Status(status))
            }
        })
    }
}
