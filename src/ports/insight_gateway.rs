//! Insight Gateway Port - typed request/response contracts with the model.
//!
//! Each operation sends domain data to the generative model and returns the
//! parsed, typed result. There is no local fallback and no client-side
//! computation: the gateway never mutates state, it only returns values for
//! the controller to adopt.

use async_trait::async_trait;
use std::fmt;

use crate::domain::{
    CampaignManifest, FrictionAnalysis, LearnedDomainContext, MerchandisingRecommendation,
    PersonaDetails, Record, Review, ShopperSegment,
};

use super::AIError;

/// Fixed user-facing text for quota exhaustion.
pub const QUOTA_EXCEEDED_MESSAGE: &str = concat!(
    "AI quota exceeded: the model is receiving too many requests. ",
    "Please wait a minute and try again."
);

/// Operations offered by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    SynthesizeDomainDna,
    DiscoverSegments,
    GenerateContextualReviews,
    GenerateRecommendations,
    PersonaDetails,
    AnalyzeFriction,
    GenerateCampaignManifest,
}

impl GatewayOperation {
    /// Stable name used in logs and trace ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayOperation::SynthesizeDomainDna => "synthesize_domain_dna",
            GatewayOperation::DiscoverSegments => "discover_segments",
            GatewayOperation::GenerateContextualReviews => "generate_contextual_reviews",
            GatewayOperation::GenerateRecommendations => "generate_recommendations",
            GatewayOperation::PersonaDetails => "persona_details",
            GatewayOperation::AnalyzeFriction => "analyze_friction",
            GatewayOperation::GenerateCampaignManifest => "generate_campaign_manifest",
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Rate limiting persisted through every retry.
    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded,

    /// The model's text was not the JSON the contract promised.
    #[error("could not parse {operation} response: {message}")]
    Parse {
        operation: GatewayOperation,
        message: String,
    },

    /// Any other provider failure, passed through unchanged.
    #[error(transparent)]
    Provider(#[from] AIError),
}

impl GatewayError {
    /// Creates a parse error for an operation.
    pub fn parse(operation: GatewayOperation, message: impl Into<String>) -> Self {
        Self::Parse {
            operation,
            message: message.into(),
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, GatewayError::QuotaExceeded)
    }
}

/// Port for the seven structured model operations.
#[async_trait]
pub trait InsightGateway: Send + Sync {
    /// Infer the domain schema from a sample of rows.
    ///
    /// `prior` enables incremental refinement of an earlier context.
    async fn synthesize_domain_dna(
        &self,
        sample: &[Record],
        headers: &[String],
        prior: Option<&LearnedDomainContext>,
    ) -> Result<LearnedDomainContext, GatewayError>;

    /// Cluster sampled rows into shopper segments.
    async fn discover_segments(
        &self,
        sample: &[Record],
        headers: &[String],
        context: &LearnedDomainContext,
    ) -> Result<Vec<ShopperSegment>, GatewayError>;

    /// Synthesize feedback records for the discovered segments.
    async fn generate_contextual_reviews(
        &self,
        segments: &[ShopperSegment],
        context: &LearnedDomainContext,
    ) -> Result<Vec<Review>, GatewayError>;

    /// Produce merchandising recommendations over the full segment set.
    async fn generate_recommendations(
        &self,
        segments: &[ShopperSegment],
        context: &LearnedDomainContext,
    ) -> Result<Vec<MerchandisingRecommendation>, GatewayError>;

    /// Describe the persona behind one segment.
    async fn persona_details(
        &self,
        segment: &ShopperSegment,
        context: &LearnedDomainContext,
    ) -> Result<PersonaDetails, GatewayError>;

    /// Score friction for one segment from its reviews.
    async fn analyze_friction(
        &self,
        segment: &ShopperSegment,
        reviews: &[Review],
    ) -> Result<FrictionAnalysis, GatewayError>;

    /// Synthesize an activation plan for deploying one segment.
    async fn generate_campaign_manifest(
        &self,
        segment: &ShopperSegment,
        context: &LearnedDomainContext,
    ) -> Result<CampaignManifest, GatewayError>;
}
