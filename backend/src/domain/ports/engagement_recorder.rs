//! Driving port for the engagement recorder.
//!
//! HTTP handlers call this trait and decide themselves what to do with a
//! failure: recording is best-effort, so the pixel and the redirect are
//! served whatever the result. The policy of ignoring errors lives at that
//! boundary, not inside the recorder.

use async_trait::async_trait;

use crate::domain::engagement::{EngagementKey, FetchSignals};

/// Errors surfaced by recorder implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordingError {
    /// The backing store rejected or could not receive the operation.
    #[error("engagement recording failed: {message}")]
    Storage { message: String },
}

impl RecordingError {
    /// Create a storage error with the given message.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Port for recording engagement signals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementRecorder: Send + Sync {
    /// Record one pixel fetch: classify it and fold it into the open state
    /// for the key.
    async fn record_open(
        &self,
        key: EngagementKey,
        signals: FetchSignals,
    ) -> Result<(), RecordingError>;

    /// Record one click: append it to the click log and confirm the open
    /// state for the key, creating it if no pixel was ever fetched.
    async fn record_click(
        &self,
        key: EngagementKey,
        destination: String,
        signals: FetchSignals,
    ) -> Result<(), RecordingError>;
}
