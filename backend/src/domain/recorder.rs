//! Engagement recorder service.
//!
//! Implements the driving port over any [`EngagementRepository`]. The open
//! path classifies the fetch and issues exactly one atomic upsert; the click
//! path appends to the click log and then confirms the open state through
//! the same merge primitive by contributing a genuine verdict. A click is
//! proof of a human even when the pixel never fired, so the confirm upsert
//! runs whether or not a prior open exists, and even when the click append
//! itself failed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::classifier::ProxySignatures;
use crate::domain::engagement::{ClickEvent, EngagementKey, FetchSignals, OpenObservation};
use crate::domain::ports::{
    EngagementRecorder, EngagementRepository, EngagementRepositoryError, RecordingError,
};

/// Recorder service owning the reconciliation flow.
#[derive(Clone)]
pub struct EngagementService<R> {
    repository: Arc<R>,
    signatures: ProxySignatures,
}

impl<R> EngagementService<R> {
    /// Create a service over the given store and signature set.
    pub fn new(repository: Arc<R>, signatures: ProxySignatures) -> Self {
        Self {
            repository,
            signatures,
        }
    }
}

fn map_repository_error(error: EngagementRepositoryError) -> RecordingError {
    RecordingError::storage(error.to_string())
}

#[async_trait]
impl<R> EngagementRecorder for EngagementService<R>
where
    R: EngagementRepository,
{
    async fn record_open(
        &self,
        key: EngagementKey,
        signals: FetchSignals,
    ) -> Result<(), RecordingError> {
        let suspect = self
            .signatures
            .classify(&signals.user_agent, signals.client_ip, &signals.via);
        let observation = OpenObservation::from_signals(key, Utc::now(), signals, suspect);

        self.repository
            .upsert_open(&observation)
            .await
            .map_err(map_repository_error)
    }

    async fn record_click(
        &self,
        key: EngagementKey,
        destination: String,
        signals: FetchSignals,
    ) -> Result<(), RecordingError> {
        let clicked_at = Utc::now();
        let click = ClickEvent {
            key: key.clone(),
            url: destination,
            clicked_at,
        };
        let click_result = self.repository.insert_click(&click).await;

        // The click itself is the strongest evidence of a human: feed it
        // through the merge as a genuine observation so it both confirms an
        // existing suspect record and materializes one from nothing.
        let observation = OpenObservation::from_signals(key, clicked_at, signals, false);
        let open_result = self.repository.upsert_open(&observation).await;

        click_result.and(open_result).map_err(map_repository_error)
    }
}
