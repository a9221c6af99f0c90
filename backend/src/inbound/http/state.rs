//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend
//! only on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EngagementRecorder, EngagementRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Recording path used by the tracking endpoints.
    pub recorder: Arc<dyn EngagementRecorder>,
    /// Direct storage access for the health surface.
    pub repository: Arc<dyn EngagementRepository>,
}

impl HttpState {
    /// Bundle the port implementations handlers work against.
    pub fn new(
        recorder: Arc<dyn EngagementRecorder>,
        repository: Arc<dyn EngagementRepository>,
    ) -> Self {
        Self {
            recorder,
            repository,
        }
    }
}
