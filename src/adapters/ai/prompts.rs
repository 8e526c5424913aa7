//! Instruction text for each gateway operation.
//!
//! Context objects are embedded as serialized JSON. The model only sees a
//! few rows even when the caller passes the full sample.

use serde::Serialize;

use crate::domain::{LearnedDomainContext, Record, Review, ShopperSegment};

/// Rows shown when synthesizing Domain DNA.
pub const DNA_PROMPT_ROWS: usize = 5;
/// Rows shown when discovering segments.
pub const SEGMENT_PROMPT_ROWS: usize = 15;

pub const SYSTEM_PROMPT: &str = "You are a retail behavioral analyst. \
Respond only with JSON that matches the declared response schema.";

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn head(sample: &[Record], rows: usize) -> &[Record] {
    &sample[..sample.len().min(rows)]
}

pub fn synthesize_domain_dna(
    sample: &[Record],
    headers: &[String],
    prior: Option<&LearnedDomainContext>,
) -> String {
    let refinement = match prior {
        Some(ctx) => format!(
            "Refine this previously learned context rather than starting over:\n{}\n\n",
            to_json(ctx)
        ),
        None => String::new(),
    };

    format!(
        "{refinement}Infer the behavioral Domain DNA of this dataset.\n\
Headers: {headers}\n\
Sample rows: {rows}\n\n\
Return the domain name, a lexicon of domain terms, behavioral rules, a weight in [0, 1] \
for each behaviorally relevant header (use the header names verbatim as `feature`), latent \
correlators as trigger/result/logic triples, segment prototype names, historical friction \
points and a maturity index from 0 to 100.",
        refinement = refinement,
        headers = to_json(headers),
        rows = to_json(head(sample, DNA_PROMPT_ROWS)),
    )
}

pub fn discover_segments(
    sample: &[Record],
    headers: &[String],
    context: &LearnedDomainContext,
) -> String {
    format!(
        "Using the learned domain context below, cluster the records into distinct shopper \
segments.\n\
Domain context: {context}\n\
Headers: {headers}\n\
Records: {rows}\n\n\
For each segment give a short unique id, name, description, rationale, characteristics, \
affinity scores as key/value pairs, KPIs (estimated AOV, LTV potential, retention likelihood %, \
churn propensity %), growth trend, preferred channels, sample size, pattern stability index % \
and volatility index %.",
        context = to_json(context),
        headers = to_json(headers),
        rows = to_json(head(sample, SEGMENT_PROMPT_ROWS)),
    )
}

pub fn contextual_reviews(segments: &[ShopperSegment], context: &LearnedDomainContext) -> String {
    format!(
        "Write realistic customer reviews that reflect the behavior of these segments in the \
{domain} domain.\n\
Segments: {segments}\n\
Lexicon: {lexicon}\n\n\
Each review needs an id, a rating from 1 to 5, the review text and a product category.",
        domain = context.domain_name,
        segments = to_json(segments),
        lexicon = to_json(&context.lexicon),
    )
}

pub fn recommendations(segments: &[ShopperSegment], context: &LearnedDomainContext) -> String {
    format!(
        "Propose five merchandising recommendations for the segments below.\n\
Domain context: {context}\n\
Segments: {segments}\n\n\
Each recommendation names its target segment, the action, rationale, ROI projection, \
the metric it lifts (label and value), strategy type, confidence (0-1) and complexity.",
        context = to_json(context),
        segments = to_json(segments),
    )
}

pub fn persona_details(segment: &ShopperSegment, context: &LearnedDomainContext) -> String {
    format!(
        "Describe the representative persona of this {domain} shopper segment.\n\
Segment: {segment}\n\
Behavioral rules: {rules}\n\n\
Give a short backstory, their core motivation and the main churn risks.",
        domain = context.domain_name,
        segment = to_json(segment),
        rules = to_json(&context.behavioral_rules),
    )
}

pub fn analyze_friction(segment: &ShopperSegment, reviews: &[Review]) -> String {
    format!(
        "Assess the purchase friction experienced by this segment based on the reviews.\n\
Segment: {segment}\n\
Reviews: {reviews}\n\n\
Return a friction score from 0 to 100 and the primary experience gaps.",
        segment = to_json(segment),
        reviews = to_json(reviews),
    )
}

pub fn campaign_manifest(segment: &ShopperSegment, context: &LearnedDomainContext) -> String {
    format!(
        "Design a campaign to activate this segment as a live merchandising strategy.\n\
Segment: {segment}\n\
Domain context: {context}\n\n\
Return an activation plan (step, status, delay), a technical tracking hook snippet, an ad copy \
draft, an implementation payload string and projected metrics (lift, ROI, reach, volatility risk).",
        segment = to_json(segment),
        context = to_json(context),
    )
}
