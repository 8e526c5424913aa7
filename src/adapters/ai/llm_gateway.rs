//! Insight gateway backed by a generative model provider.
//!
//! Every operation builds an instruction prompt, declares a response schema,
//! runs the provider call through the retry executor under a per-call
//! timeout, and parses the returned text into domain types. Parse failures
//! are not retried.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::domain::foundation::Timestamp;
use crate::domain::{
    CampaignManifest, FrictionAnalysis, LearnedDomainContext, MerchandisingRecommendation,
    PersonaDetails, Record, Review, ShopperSegment,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, GatewayError,
    GatewayOperation, InsightGateway, RequestMetadata,
};

use super::retry::{RetryError, RetryPolicy};
use super::wire::{self, DomainDnaWire, ReviewWire, SegmentWire};
use super::{prompts, schemas};

/// Temperature used for every structured call.
const TEMPERATURE: f32 = 0.4;

impl From<RetryError<AIError>> for GatewayError {
    fn from(err: RetryError<AIError>) -> Self {
        match err {
            RetryError::QuotaExceeded { .. } => GatewayError::QuotaExceeded,
            RetryError::Failed(err) => GatewayError::Provider(err),
        }
    }
}

/// [`InsightGateway`] that talks to an [`AIProvider`].
#[derive(Clone)]
pub struct LlmInsightGateway {
    provider: Arc<dyn AIProvider>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl LlmInsightGateway {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bounds each individual attempt, not the whole retry loop.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    async fn call_provider(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AIError> {
        match timeout(self.call_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(AIError::timeout(self.call_timeout)),
        }
    }

    /// Runs one structured call and decodes the JSON body.
    async fn invoke<T: DeserializeOwned>(
        &self,
        operation: GatewayOperation,
        prompt: String,
        schema: Value,
    ) -> Result<T, GatewayError> {
        let trace_id = format!("{}-{}", operation, uuid::Uuid::new_v4());
        let request = CompletionRequest::new(prompt, RequestMetadata::new(operation, &trace_id))
            .with_system_prompt(prompts::SYSTEM_PROMPT)
            .with_response_schema(schema)
            .with_temperature(TEMPERATURE);

        tracing::debug!(%operation, %trace_id, "Invoking model");

        let this = self;
        let response = self
            .retry
            .execute(operation.as_str(), move || {
                let request = request.clone();
                async move { this.call_provider(request).await }
            })
            .await?;

        tracing::debug!(
            %operation,
            %trace_id,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Model call completed"
        );
        if response.finish_reason == FinishReason::Length {
            tracing::warn!(%operation, %trace_id, "Model output hit the token limit");
        }

        parse_json(operation, &response.content)
    }
}

/// Decodes model text, tolerating a surrounding markdown code fence.
fn parse_json<T: DeserializeOwned>(
    operation: GatewayOperation,
    content: &str,
) -> Result<T, GatewayError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(%operation, error = %e, "Model returned malformed JSON");
        GatewayError::parse(operation, e.to_string())
    })
}

#[async_trait]
impl InsightGateway for LlmInsightGateway {
    async fn synthesize_domain_dna(
        &self,
        sample: &[Record],
        headers: &[String],
        prior: Option<&LearnedDomainContext>,
    ) -> Result<LearnedDomainContext, GatewayError> {
        let wire: DomainDnaWire = self
            .invoke(
                GatewayOperation::SynthesizeDomainDna,
                prompts::synthesize_domain_dna(sample, headers, prior),
                schemas::domain_dna(),
            )
            .await?;

        Ok(wire.into_context(headers, prior))
    }

    async fn discover_segments(
        &self,
        sample: &[Record],
        headers: &[String],
        context: &LearnedDomainContext,
    ) -> Result<Vec<ShopperSegment>, GatewayError> {
        let wires: Vec<SegmentWire> = self
            .invoke(
                GatewayOperation::DiscoverSegments,
                prompts::discover_segments(sample, headers, context),
                schemas::segments(),
            )
            .await?;

        Ok(wire::into_segments(wires, Timestamp::now()))
    }

    async fn generate_contextual_reviews(
        &self,
        segments: &[ShopperSegment],
        context: &LearnedDomainContext,
    ) -> Result<Vec<Review>, GatewayError> {
        let wires: Vec<ReviewWire> = self
            .invoke(
                GatewayOperation::GenerateContextualReviews,
                prompts::contextual_reviews(segments, context),
                schemas::reviews(),
            )
            .await?;

        Ok(wire::into_reviews(wires))
    }

    async fn generate_recommendations(
        &self,
        segments: &[ShopperSegment],
        context: &LearnedDomainContext,
    ) -> Result<Vec<MerchandisingRecommendation>, GatewayError> {
        self.invoke(
            GatewayOperation::GenerateRecommendations,
            prompts::recommendations(segments, context),
            schemas::recommendations(),
        )
        .await
    }

    async fn persona_details(
        &self,
        segment: &ShopperSegment,
        context: &LearnedDomainContext,
    ) -> Result<PersonaDetails, GatewayError> {
        self.invoke(
            GatewayOperation::PersonaDetails,
            prompts::persona_details(segment, context),
            schemas::persona(),
        )
        .await
    }

    async fn analyze_friction(
        &self,
        segment: &ShopperSegment,
        reviews: &[Review],
    ) -> Result<FrictionAnalysis, GatewayError> {
        self.invoke(
            GatewayOperation::AnalyzeFriction,
            prompts::analyze_friction(segment, reviews),
            schemas::friction(),
        )
        .await
    }

    async fn generate_campaign_manifest(
        &self,
        segment: &ShopperSegment,
        context: &LearnedDomainContext,
    ) -> Result<CampaignManifest, GatewayError> {
        self.invoke(
            GatewayOperation::GenerateCampaignManifest,
            prompts::campaign_manifest(segment, context),
            schemas::campaign_manifest(),
        )
        .await
    }
}
