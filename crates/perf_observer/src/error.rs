//! Error types for the performance observer.

use thiserror::Error;

/// Errors surfaced by configuration parsing and platform integration.
///
/// Monitoring itself never fails: `start()` and `stop()` degrade to a log
/// line instead. These errors only come out of the parsing helpers and out of
/// [`EventSource::subscribe`](crate::EventSource::subscribe).
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A metric tag outside the known set
    #[error("Unknown metric kind: {0}")]
    UnknownMetric(String),

    /// Options or entry JSON could not be decoded
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// The platform event source refused the subscription
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Result type for observer operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
