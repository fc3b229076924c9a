//! The capability the engine sends requests through.
use rampup_core::{Payload, RequestOutcome};
use std::future::Future;

/// Sends one request and reports how long it took and whether it succeeded.
///
/// Implementations own every transport concern (connections, timeouts, retries, TLS). They must
/// resolve in bounded time and must not fail past their own boundary: every failure is reported
/// as a `RequestOutcome` with `succeeded = false`.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, endpoint: &str, payload: &Payload)
        -> impl Future<Output = RequestOutcome> + Send;
}

/// Transport backed by a plain function or closure.
pub struct FnTransport<F>(F);

/// Use a closure as a [`Transport`].
///
/// ```
/// use rampup::{transport::from_fn, RequestOutcome};
/// use std::time::Duration;
///
/// let transport = from_fn(|_endpoint, _payload| async {
///     RequestOutcome::success(Duration::from_millis(3))
/// });
/// ```
pub fn from_fn<F, Fut>(func: F) -> FnTransport<F>
where
    F: Fn(&str, &Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RequestOutcome> + Send + 'static,
{
    FnTransport(func)
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(&str, &Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RequestOutcome> + Send + 'static,
{
    fn send(
        &self,
        endpoint: &str,
        payload: &Payload,
    ) -> impl Future<Output = RequestOutcome> + Send {
        (self.0)(endpoint, payload)
    }
}
