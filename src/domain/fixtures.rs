//! Built-in defaults used when durable storage holds nothing yet.

use std::collections::BTreeMap;

use super::dna::{LatentCorrelator, LearnedDomainContext};
use super::foundation::{ReviewId, SegmentId, Timestamp};
use super::review::Review;
use super::segment::{
    ActivationStep, CampaignManifest, ProjectedMetrics, SegmentKpis, SegmentStatus,
    ShopperSegment,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn scores(items: &[(&str, f64)]) -> BTreeMap<String, f64> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Retail context shown before any dataset has been ingested.
pub fn default_domain_context() -> LearnedDomainContext {
    LearnedDomainContext {
        domain_name: "General Retail".to_string(),
        lexicon: strings(&["basket", "repeat purchase", "promo sensitivity", "lapse"]),
        behavioral_rules: strings(&[
            "Frequent buyers respond to loyalty perks over discounts",
            "Long gaps since last purchase precede churn",
        ]),
        behavioral_weights: scores(&[
            ("spend_amount", 0.35),
            ("frequency", 0.3),
            ("last_purchase_days", 0.2),
            ("is_promo_user", 0.15),
        ]),
        latent_correlators: vec![LatentCorrelator {
            trigger: "Promo exposure".to_string(),
            result: "Basket size spike".to_string(),
            logic: "Discount-led shoppers front-load purchases during campaigns".to_string(),
        }],
        segment_prototypes: strings(&["Loyal Regulars", "Deal Seekers", "Lapsing Browsers"]),
        historical_friction_points: strings(&["Checkout abandonment", "Delivery delays"]),
        maturity_index: 12.0,
        last_learned: Timestamp::now(),
        version: "v0".to_string(),
    }
}

fn segment(
    id: &'static str,
    name: &str,
    description: &str,
    affinity: &[(&str, f64)],
    kpis: SegmentKpis,
    sample_size: u64,
) -> ShopperSegment {
    ShopperSegment {
        id: SegmentId::from_static(id),
        name: name.to_string(),
        description: description.to_string(),
        rationale: "Seeded from the default retail context".to_string(),
        characteristics: strings(&["Seed data"]),
        affinity_scores: scores(affinity),
        kpis,
        growth_trend: "Stable".to_string(),
        preferred_channels: strings(&["Email", "App"]),
        sample_size,
        pattern_stability_index: 70.0,
        volatility_index: 20.0,
        status: SegmentStatus::Discovery,
        manifest: None,
        last_updated: Timestamp::now(),
    }
}

/// Three archetypes covering loyal, promo-driven and lapsing shoppers.
pub fn default_segments() -> Vec<ShopperSegment> {
    vec![
        segment(
            "seg-loyal-regulars",
            "Loyal Regulars",
            "High-frequency shoppers with steady baskets",
            &[("grocery", 0.8), ("household", 0.6)],
            SegmentKpis {
                estimated_aov: 64.0,
                ltv_potential: "High".to_string(),
                retention_likelihood: 88.0,
                churn_propensity: 9.0,
            },
            420,
        ),
        segment(
            "seg-deal-seekers",
            "Deal Seekers",
            "Promo-triggered buyers with spiky spend",
            &[("electronics", 0.7), ("apparel", 0.5)],
            SegmentKpis {
                estimated_aov: 41.0,
                ltv_potential: "Medium".to_string(),
                retention_likelihood: 52.0,
                churn_propensity: 37.0,
            },
            310,
        ),
        segment(
            "seg-lapsing-browsers",
            "Lapsing Browsers",
            "Previously active shoppers drifting away",
            &[("beauty", 0.4), ("apparel", 0.3)],
            SegmentKpis {
                estimated_aov: 28.0,
                ltv_potential: "Low".to_string(),
                retention_likelihood: 31.0,
                churn_propensity: 61.0,
            },
            180,
        ),
    ]
}

/// A handful of reviews matching the default segments.
pub fn default_reviews() -> Vec<Review> {
    vec![
        Review {
            id: ReviewId::from_static("rev-seed-1"),
            rating: 5.0,
            content: "Reorder is effortless and the loyalty points add up.".to_string(),
            category: "grocery".to_string(),
        },
        Review {
            id: ReviewId::from_static("rev-seed-2"),
            rating: 3.0,
            content: "Only buy when there's a sale on.".to_string(),
            category: "electronics".to_string(),
        },
        Review {
            id: ReviewId::from_static("rev-seed-3"),
            rating: 2.0,
            content: "Delivery took too long, haven't been back since.".to_string(),
            category: "beauty".to_string(),
        },
    ]
}

/// Representative manifest, used by tests and demos.
pub fn sample_manifest() -> CampaignManifest {
    CampaignManifest {
        activation_plan: vec![
            ActivationStep {
                step: "Sync audience".to_string(),
                status: "ready".to_string(),
                delay: "0h".to_string(),
            },
            ActivationStep {
                step: "Launch email sequence".to_string(),
                status: "pending".to_string(),
                delay: "24h".to_string(),
            },
        ],
        technical_hook: "track('segment_enter', { segment: 'loyal-regulars' })".to_string(),
        ad_copy_draft: "Your regulars deserve a thank-you.".to_string(),
        implementation_payload: "{\"audience\":\"loyal-regulars\"}".to_string(),
        projected_metrics: ProjectedMetrics {
            lift: "+12%".to_string(),
            roi: "3.1x".to_string(),
            reach: "420".to_string(),
            volatility_risk: "Low".to_string(),
        },
    }
}
