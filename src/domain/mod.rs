//! Domain layer - value types for the behavioral analytics engine.
//!
//! Everything here is plain data plus the invariants that travel with it.
//! No I/O and no knowledge of the generative model.

pub mod dataset;
pub mod dna;
pub mod fixtures;
pub mod foundation;
pub mod pipeline;
pub mod profile;
pub mod recommendation;
pub mod review;
pub mod segment;

pub use dataset::{Dataset, Record};
pub use dna::{LatentCorrelator, LearnedDomainContext};
pub use pipeline::PipelineState;
pub use profile::{FrictionAnalysis, PersonaDetails, SegmentProfile};
pub use recommendation::{MerchandisingRecommendation, MetricLift};
pub use review::Review;
pub use segment::{
    ActivationStep, CampaignManifest, ProjectedMetrics, SegmentKpis, SegmentStatus,
    ShopperSegment,
};
