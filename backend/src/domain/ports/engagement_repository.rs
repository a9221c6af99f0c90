//! Driven port for engagement record storage.
//!
//! The [`EngagementRepository`] trait is the reconciliation core's only view
//! of storage. Each operation is a single atomic request: the upsert carries
//! its merge semantics with it rather than being decomposed into a read and
//! a write, so concurrent signals for the same key cannot lose updates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::engagement::{ClickEvent, OpenObservation, OpenRecord};

/// Errors raised by engagement storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngagementRepositoryError {
    /// The store could not be reached.
    #[error("engagement store connection failed: {message}")]
    Connection { message: String },
    /// A statement failed during execution.
    #[error("engagement store query failed: {message}")]
    Query { message: String },
}

impl EngagementRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Stored-record totals reported by the health surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementCounts {
    pub opens: i64,
    pub clicks: i64,
}

/// Port for engagement record storage.
///
/// Implementations own the records exclusively; the core never caches or
/// mutates copies across requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Insert-or-merge the open state for the observation's key.
    ///
    /// Merge semantics follow [`OpenRecord::merge`]: open time takes the
    /// maximum, descriptive fields take the latest observation, and the
    /// suspect flag takes the logical AND. The whole operation must be one
    /// atomic request to the store.
    async fn upsert_open(
        &self,
        observation: &OpenObservation,
    ) -> Result<(), EngagementRepositoryError>;

    /// Append one click to the log. Clicks are never deduplicated.
    async fn insert_click(&self, click: &ClickEvent) -> Result<(), EngagementRepositoryError>;

    /// Totals of stored open and click records.
    async fn counts(&self) -> Result<EngagementCounts, EngagementRepositoryError>;
}

/// Process-local store applying the same reconciliation as the database
/// adapter.
///
/// Serves two roles: the storage backend when no database is configured
/// (records live for the process lifetime only) and a behavioural double in
/// tests.
#[derive(Debug, Default)]
pub struct InMemoryEngagementRepository {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    opens: HashMap<(i64, String), OpenRecord>,
    clicks: Vec<ClickEvent>,
}

impl InMemoryEngagementRepository {
    /// Current open state for a key, if any signal has been recorded.
    pub fn open_state(&self, subject_id: i64, recipient: &str) -> Option<OpenRecord> {
        let state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.opens.get(&(subject_id, recipient.to_owned())).cloned()
    }

    /// Snapshot of the click log, oldest first.
    pub fn click_log(&self) -> Vec<ClickEvent> {
        let state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.clicks.clone()
    }
}

#[async_trait]
impl EngagementRepository for InMemoryEngagementRepository {
    async fn upsert_open(
        &self,
        observation: &OpenObservation,
    ) -> Result<(), EngagementRepositoryError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let slot = (
            observation.key.subject_id(),
            observation.key.recipient().to_owned(),
        );
        match state.opens.get_mut(&slot) {
            Some(record) => record.merge(observation),
            None => {
                state
                    .opens
                    .insert(slot, OpenRecord::from_observation(observation));
            }
        }
        Ok(())
    }

    async fn insert_click(&self, click: &ClickEvent) -> Result<(), EngagementRepositoryError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.clicks.push(click.clone());
        Ok(())
    }

    async fn counts(&self) -> Result<EngagementCounts, EngagementRepositoryError> {
        let state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(EngagementCounts {
            opens: state.opens.len() as i64,
            clicks: state.clicks.len() as i64,
        })
    }
}
