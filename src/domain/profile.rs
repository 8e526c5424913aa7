//! Per-segment profiling results (persona and friction).

use serde::{Deserialize, Serialize};

use super::foundation::{SegmentId, Timestamp};

/// Narrative persona behind a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDetails {
    pub backstory: String,
    pub motivation: String,
    pub churn_risks: Vec<String>,
}

/// Friction observed for a segment in its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionAnalysis {
    pub friction_score: f64,
    pub primary_gaps: Vec<String>,
}

/// Both profiling results, tagged with the segment they were computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentProfile {
    pub segment_id: SegmentId,
    pub persona: PersonaDetails,
    pub friction: FrictionAnalysis,
    pub computed_at: Timestamp,
}

impl SegmentProfile {
    pub fn new(segment_id: SegmentId, persona: PersonaDetails, friction: FrictionAnalysis) -> Self {
        Self {
            segment_id,
            persona,
            friction,
            computed_at: Timestamp::now(),
        }
    }

    /// Returns true if this profile belongs to the given segment.
    pub fn is_for(&self, segment_id: &SegmentId) -> bool {
        &self.segment_id == segment_id
    }
}
