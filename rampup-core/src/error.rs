use thiserror::Error;

/// Rejected [`RunConfig`](crate::RunConfig). Raised before any request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start concurrency ({start}) exceeds max concurrency ({max})")]
    StartExceedsMax { start: u32, max: u32 },

    #[error("concurrency bounds must be positive")]
    ZeroConcurrency,

    #[error("total duration must be positive")]
    ZeroDuration,
}
