//! Learned domain context ("Domain DNA").
//!
//! The inferred schema describing a dataset's behavioral vocabulary and
//! feature weights. Exactly one context is live per process; every synthesis
//! replaces it wholesale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::foundation::{Timestamp, ValidationError};

/// A latent cause-and-effect pattern the model observed in the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentCorrelator {
    pub trigger: String,
    pub result: String,
    pub logic: String,
}

/// Inferred behavioral schema for the ingested dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedDomainContext {
    pub domain_name: String,
    pub lexicon: Vec<String>,
    pub behavioral_rules: Vec<String>,
    /// Feature name (an ingested header) to weight.
    pub behavioral_weights: BTreeMap<String, f64>,
    pub latent_correlators: Vec<LatentCorrelator>,
    pub segment_prototypes: Vec<String>,
    pub historical_friction_points: Vec<String>,
    /// Percentage, 0-100.
    pub maturity_index: f64,
    pub last_learned: Timestamp,
    pub version: String,
}

impl LearnedDomainContext {
    /// Checks the maturity index is a percentage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=100.0).contains(&self.maturity_index) {
            return Err(ValidationError::out_of_range(
                "maturity_index",
                0.0,
                100.0,
                self.maturity_index,
            ));
        }
        Ok(())
    }

    /// Parses the numeric part of a `vN` version tag.
    pub fn version_number(&self) -> Option<u32> {
        self.version.strip_prefix('v')?.parse().ok()
    }

    /// Version tag for a context synthesized on top of `prior`.
    pub fn next_version(prior: Option<&LearnedDomainContext>) -> String {
        let current = prior.and_then(|p| p.version_number()).unwrap_or(0);
        format!("v{}", current + 1)
    }

    /// Weights restricted to the given header names.
    pub fn retain_known_features(&mut self, headers: &[String]) {
        self.behavioral_weights
            .retain(|feature, _| headers.iter().any(|h| h == feature));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures;

    #[test]
    fn default_context_is_valid() {
        assert!(fixtures::default_domain_context().validate().is_ok());
    }

    #[test]
    fn maturity_above_hundred_is_rejected() {
        let mut ctx = fixtures::default_domain_context();
        ctx.maturity_index = 120.0;
        assert!(matches!(
            ctx.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn next_version_increments_prior() {
        let mut ctx = fixtures::default_domain_context();
        ctx.version = "v4".to_string();

        assert_eq!(LearnedDomainContext::next_version(Some(&ctx)), "v5");
        assert_eq!(LearnedDomainContext::next_version(None), "v1");
    }

    #[test]
    fn unparseable_version_restarts_numbering() {
        let mut ctx = fixtures::default_domain_context();
        ctx.version = "seed".to_string();
        assert_eq!(LearnedDomainContext::next_version(Some(&ctx)), "v1");
    }

    #[test]
    fn unknown_features_are_dropped() {
        let mut ctx = fixtures::default_domain_context();
        ctx.behavioral_weights.insert("not_a_header".to_string(), 0.9);
        let headers = vec!["spend_amount".to_string(), "frequency".to_string()];

        ctx.retain_known_features(&headers);

        assert!(ctx.behavioral_weights.keys().all(|k| headers.contains(k)));
        assert!(ctx.behavioral_weights.contains_key("spend_amount"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(fixtures::default_domain_context()).unwrap();
        assert!(json.get("domainName").is_some());
        assert!(json.get("behavioralWeights").unwrap().is_object());
        assert!(json.get("maturityIndex").is_some());
    }
}
