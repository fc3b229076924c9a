use rampup_core::{ConfigError, RunReport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    /// The run was cancelled. Levels that finished before the cancellation are kept.
    #[error("Run cancelled after {} completed level(s)", report.len())]
    Cancelled { report: RunReport },
}

impl RunError {
    /// The partial report of a cancelled run.
    pub fn partial_report(&self) -> Option<&RunReport> {
        match self {
            RunError::Cancelled { report } => Some(report),
            RunError::Config(_) => None,
        }
    }

    pub fn into_partial_report(self) -> Option<RunReport> {
        match self {
            RunError::Cancelled { report } => Some(report),
            RunError::Config(_) => None,
        }
    }
}
