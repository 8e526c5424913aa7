//! ShopperSegment - a discovered behavioral archetype.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CampaignManifest, SegmentStatus};
use crate::domain::foundation::{SegmentId, Timestamp};

/// Headline KPIs estimated for a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentKpis {
    pub estimated_aov: f64,
    pub ltv_potential: String,
    /// Percentage.
    pub retention_likelihood: f64,
    /// Percentage.
    pub churn_propensity: f64,
}

/// A discovered cluster of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopperSegment {
    pub id: SegmentId,
    pub name: String,
    pub description: String,
    pub rationale: String,
    pub characteristics: Vec<String>,
    pub affinity_scores: BTreeMap<String, f64>,
    pub kpis: SegmentKpis,
    pub growth_trend: String,
    pub preferred_channels: Vec<String>,
    pub sample_size: u64,
    pub pattern_stability_index: f64,
    pub volatility_index: f64,
    pub status: SegmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<CampaignManifest>,
    pub last_updated: Timestamp,
}

impl ShopperSegment {
    /// Resets the segment to a freshly discovered state.
    ///
    /// Any earlier strategy status or manifest is discarded.
    pub fn mark_discovered(&mut self, at: Timestamp) {
        self.status = SegmentStatus::Discovery;
        self.manifest = None;
        self.last_updated = at;
    }

    /// Attaches a manifest and moves the segment to Active Strategy.
    pub fn deploy(&mut self, manifest: CampaignManifest, at: Timestamp) {
        self.manifest = Some(manifest);
        self.status = SegmentStatus::ActiveStrategy;
        self.last_updated = at;
    }

    /// Changes status without touching the manifest.
    pub fn set_status(&mut self, status: SegmentStatus, at: Timestamp) {
        self.status = status;
        self.last_updated = at;
    }

    pub fn is_active_strategy(&self) -> bool {
        self.status == SegmentStatus::ActiveStrategy
    }
}
