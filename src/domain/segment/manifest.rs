//! Campaign manifest synthesized when a segment is deployed.

use serde::{Deserialize, Serialize};

/// One step of the activation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationStep {
    pub step: String,
    pub status: String,
    pub delay: String,
}

/// Projected outcome of running the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedMetrics {
    pub lift: String,
    pub roi: String,
    pub reach: String,
    pub volatility_risk: String,
}

/// Activation plan for deploying a segment as a live strategy.
///
/// Owned by the segment it was synthesized for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignManifest {
    pub activation_plan: Vec<ActivationStep>,
    pub technical_hook: String,
    pub ad_copy_draft: String,
    /// Opaque payload handed to downstream tooling.
    pub implementation_payload: String,
    pub projected_metrics: ProjectedMetrics,
}
