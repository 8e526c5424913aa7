//! Events pushed to the presentation layer.
//!
//! Broadcast on a `tokio::sync::broadcast` channel; slow subscribers lag and
//! lose old events rather than blocking the controller.

use serde::Serialize;

use crate::domain::foundation::SegmentId;
use crate::domain::{PipelineState, SegmentStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    PipelineStateChanged {
        state: PipelineState,
    },
    ContextUpdated {
        domain_name: String,
        version: String,
    },
    SegmentsReplaced {
        count: usize,
    },
    SelectionChanged {
        segment_id: Option<SegmentId>,
    },
    RecommendationsUpdated {
        count: usize,
    },
    ProfileReady {
        segment_id: SegmentId,
    },
    SegmentStatusChanged {
        segment_id: SegmentId,
        status: SegmentStatus,
    },
    /// Transient notice; followed by `NoticeCleared` once it expires.
    DeploymentSucceeded {
        segment_id: SegmentId,
        message: String,
    },
    NoticeCleared,
    ErrorRaised {
        message: String,
    },
    Log {
        message: String,
    },
}
