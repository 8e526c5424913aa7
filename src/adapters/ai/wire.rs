//! Wire shapes returned by the model and their conversion into domain types.
//!
//! Maps travel as key/value lists because the provider's schema dialect has
//! no free-form object keys.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

use crate::domain::foundation::{ReviewId, SegmentId, Timestamp};
use crate::domain::{
    LatentCorrelator, LearnedDomainContext, Review, SegmentKpis, SegmentStatus, ShopperSegment,
};

#[derive(Debug, Deserialize)]
pub struct WeightPair {
    pub feature: String,
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub struct AffinityPair {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainDnaWire {
    pub domain_name: String,
    #[serde(default)]
    pub lexicon: Vec<String>,
    #[serde(default)]
    pub behavioral_rules: Vec<String>,
    #[serde(default)]
    pub behavioral_weights: Vec<WeightPair>,
    #[serde(default)]
    pub latent_correlators: Vec<LatentCorrelator>,
    #[serde(default)]
    pub segment_prototypes: Vec<String>,
    #[serde(default)]
    pub historical_friction_points: Vec<String>,
    pub maturity_index: f64,
}

impl DomainDnaWire {
    /// Builds the context, keeping only weights for known headers.
    pub fn into_context(
        self,
        headers: &[String],
        prior: Option<&LearnedDomainContext>,
    ) -> LearnedDomainContext {
        let behavioral_weights: BTreeMap<String, f64> = self
            .behavioral_weights
            .into_iter()
            .map(|pair| (pair.feature, pair.weight))
            .collect();

        let mut context = LearnedDomainContext {
            domain_name: self.domain_name,
            lexicon: self.lexicon,
            behavioral_rules: self.behavioral_rules,
            behavioral_weights,
            latent_correlators: self.latent_correlators,
            segment_prototypes: self.segment_prototypes,
            historical_friction_points: self.historical_friction_points,
            maturity_index: self.maturity_index,
            last_learned: Timestamp::now(),
            version: LearnedDomainContext::next_version(prior),
        };

        context.retain_known_features(headers);
        if let Err(err) = context.validate() {
            tracing::warn!(error = %err, "Clamping maturity index returned by model");
            context.maturity_index = context.maturity_index.clamp(0.0, 100.0);
        }
        context
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentWire {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub affinity_scores: Vec<AffinityPair>,
    pub kpis: SegmentKpis,
    #[serde(default)]
    pub growth_trend: String,
    #[serde(default)]
    pub preferred_channels: Vec<String>,
    #[serde(default)]
    pub sample_size: f64,
    #[serde(default)]
    pub pattern_stability_index: f64,
    #[serde(default)]
    pub volatility_index: f64,
}

/// Converts model segments, giving blank or repeated ids a positional id.
pub fn into_segments(wires: Vec<SegmentWire>, at: Timestamp) -> Vec<ShopperSegment> {
    let mut seen = HashSet::new();

    wires
        .into_iter()
        .enumerate()
        .map(|(index, wire)| {
            let id = match SegmentId::new(wire.id) {
                Ok(id) if !seen.contains(&id) => id,
                _ => SegmentId::positional(index),
            };
            seen.insert(id.clone());

            ShopperSegment {
                id,
                name: wire.name,
                description: wire.description,
                rationale: wire.rationale,
                characteristics: wire.characteristics,
                affinity_scores: wire
                    .affinity_scores
                    .into_iter()
                    .map(|pair| (pair.key, pair.value))
                    .collect(),
                kpis: wire.kpis,
                growth_trend: wire.growth_trend,
                preferred_channels: wire.preferred_channels,
                sample_size: wire.sample_size.max(0.0).round() as u64,
                pattern_stability_index: wire.pattern_stability_index,
                volatility_index: wire.volatility_index,
                status: SegmentStatus::Discovery,
                manifest: None,
                last_updated: at,
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ReviewWire {
    #[serde(default)]
    pub id: String,
    pub rating: f64,
    pub content: String,
    #[serde(default)]
    pub category: String,
}

pub fn into_reviews(wires: Vec<ReviewWire>) -> Vec<Review> {
    wires
        .into_iter()
        .enumerate()
        .map(|(index, wire)| Review {
            id: ReviewId::new(wire.id).unwrap_or_else(|_| ReviewId::positional(index)),
            rating: wire.rating,
            content: wire.content,
            category: wire.category,
        })
        .collect()
}
