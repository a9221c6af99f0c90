//! Ports connecting the reconciliation core to its collaborators.

mod engagement_recorder;
mod engagement_repository;

pub use engagement_recorder::{EngagementRecorder, RecordingError};
pub use engagement_repository::{
    EngagementCounts, EngagementRepository, EngagementRepositoryError,
    InMemoryEngagementRepository,
};

#[cfg(test)]
pub use engagement_recorder::MockEngagementRecorder;
#[cfg(test)]
pub use engagement_repository::MockEngagementRepository;
