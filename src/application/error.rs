//! Errors surfaced by the dashboard controller.

use crate::domain::foundation::SegmentId;
use crate::ports::{GatewayError, StorageError, QUOTA_EXCEEDED_MESSAGE};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Rate limiting outlasted the retry budget somewhere in the run.
    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded,

    #[error("a pipeline run is already in progress")]
    PipelineBusy,

    #[error("segment not found: {0}")]
    SegmentNotFound(SegmentId),

    #[error("no segments have been discovered")]
    NoSegments,

    #[error(transparent)]
    Gateway(GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DashboardError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, DashboardError::QuotaExceeded)
    }
}

impl From<GatewayError> for DashboardError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::QuotaExceeded => DashboardError::QuotaExceeded,
            other => DashboardError::Gateway(other),
        }
    }
}
