//! Merchandising recommendations.
//!
//! Recomputed whenever segments, reviews or the domain context change;
//! never persisted.

use serde::{Deserialize, Serialize};

/// Label/value pair describing the expected metric movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLift {
    pub label: String,
    pub value: String,
}

/// A suggested merchandising action for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchandisingRecommendation {
    pub title: String,
    pub target_segment: String,
    pub action: String,
    pub rationale: String,
    pub roi_projection: String,
    pub metric_lift: MetricLift,
    pub strategy_type: String,
    pub confidence: f64,
    pub complexity: String,
}
