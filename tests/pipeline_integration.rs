//! End-to-end tests for the dashboard controller.
//!
//! Drives the real gateway over a scripted provider and the in-memory or
//! file-backed store:
//! 1. Ingestion walks Parsing -> Analyzing -> Idle and persists every entry
//! 2. Quota exhaustion aborts the run but keeps what was already stored
//! 3. Rapid selection changes collapse into one profiling run
//! 4. Deployment attaches a manifest, and its notice clears on a timer
//! 5. Results computed from data that has since been replaced are dropped

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use retail_dna::adapters::ai::{LlmInsightGateway, MockAIProvider, MockError, MockResponse};
use retail_dna::adapters::ingest::synthetic_dataset;
use retail_dna::adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
use retail_dna::application::{
    DashboardController, DashboardError, DashboardEvent, DashboardSettings, DashboardStore,
    StatusUpdate,
};
use retail_dna::domain::fixtures;
use retail_dna::domain::foundation::SegmentId;
use retail_dna::domain::{PipelineState, SegmentStatus};
use retail_dna::ports::{GatewayOperation, KeyValueStore, QUOTA_EXCEEDED_MESSAGE};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn dna_json() -> String {
    json!({
        "domainName": "Neighbourhood Grocery",
        "lexicon": ["basket", "aisle", "loyalty"],
        "behavioralRules": ["Promo users buy in bulk"],
        "behavioralWeights": [
            { "feature": "spend_amount", "weight": 0.9 },
            { "feature": "frequency", "weight": 0.7 },
            { "feature": "shoe_size", "weight": 0.4 }
        ],
        "latentCorrelators": [
            {
                "trigger": "is_promo_user",
                "result": "spend_amount",
                "logic": "Coupons lift baskets"
            }
        ],
        "segmentPrototypes": ["Weekly stocker"],
        "historicalFrictionPoints": ["Out of stock produce"],
        "maturityIndex": 64
    })
    .to_string()
}

fn segment_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Shoppers with a steady weekly rhythm",
        "rationale": "High frequency, medium spend",
        "characteristics": ["Weekend visits"],
        "affinityScores": [{ "key": "Home", "value": 0.7 }],
        "kpis": {
            "estimatedAov": 48.0,
            "ltvPotential": "High",
            "retentionLikelihood": 81,
            "churnPropensity": 9
        },
        "growthTrend": "Rising",
        "preferredChannels": ["Email"],
        "sampleSize": 17,
        "patternStabilityIndex": 72,
        "volatilityIndex": 18
    })
}

fn segments_json() -> String {
    json!([
        segment_json("seg-a", "Weekly Stockers"),
        segment_json("seg-b", "Deal Hunters"),
        segment_json("seg-c", "Occasional Gifters"),
    ])
    .to_string()
}

fn reviews_json() -> String {
    json!([
        { "id": "r1", "rating": 4, "content": "Checkout was quick", "category": "Service" },
        { "id": "r2", "rating": 2, "content": "Produce ran out early", "category": "Stock" }
    ])
    .to_string()
}

fn recommendations_json() -> String {
    json!([{
        "title": "Bundle weekend staples",
        "targetSegment": "Weekly Stockers",
        "action": "Offer a staples bundle on Fridays",
        "rationale": "Baskets peak on Saturdays",
        "roiProjection": "+8% revenue",
        "metricLift": { "label": "AOV", "value": "+6%" },
        "strategyType": "Bundling",
        "confidence": 82,
        "complexity": "Low"
    }])
    .to_string()
}

fn persona_json() -> String {
    json!({
        "backstory": "Plans meals for a family of four",
        "motivation": "Reliability",
        "churnRisks": ["Stock-outs"]
    })
    .to_string()
}

fn friction_json() -> String {
    json!({ "frictionScore": 37, "primaryGaps": ["Produce availability"] }).to_string()
}

fn rate_limited() -> MockError {
    MockError::RateLimited {
        message: "429 RESOURCE_EXHAUSTED".to_string(),
    }
}

fn always_rate_limited(provider: MockAIProvider, op: GatewayOperation) -> MockAIProvider {
    provider.with_fallback_for(op, MockResponse::Error(rate_limited()))
}

fn with_profiling(provider: MockAIProvider) -> MockAIProvider {
    provider
        .with_fallback_for(
            GatewayOperation::PersonaDetails,
            MockResponse::success(persona_json()),
        )
        .with_fallback_for(
            GatewayOperation::AnalyzeFriction,
            MockResponse::success(friction_json()),
        )
}

/// Provider that answers every pipeline operation, repeatedly.
fn scripted_provider() -> MockAIProvider {
    MockAIProvider::new()
        .with_fallback_for(
            GatewayOperation::SynthesizeDomainDna,
            MockResponse::success(dna_json()),
        )
        .with_fallback_for(
            GatewayOperation::DiscoverSegments,
            MockResponse::success(segments_json()),
        )
        .with_fallback_for(
            GatewayOperation::GenerateContextualReviews,
            MockResponse::success(reviews_json()),
        )
        .with_fallback_for(
            GatewayOperation::GenerateRecommendations,
            MockResponse::success(recommendations_json()),
        )
}

async fn controller_over(
    provider: &MockAIProvider,
    kv: Arc<dyn KeyValueStore>,
) -> Arc<DashboardController> {
    let store = DashboardStore::load(kv).await.unwrap();
    let gateway = LlmInsightGateway::new(Arc::new(provider.clone()));
    DashboardController::new(Arc::new(gateway), store, DashboardSettings::default())
}

fn drain(events: &mut broadcast::Receiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

fn seg(id: &str) -> SegmentId {
    SegmentId::new(id).unwrap()
}

// =============================================================================
// Ingestion
// =============================================================================

#[tokio::test]
async fn ingestion_runs_every_stage_and_persists() {
    let provider = scripted_provider();
    let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    let controller = controller_over(&provider, kv.clone()).await;
    let prior_version = controller.context().await.version;
    let mut events = controller.subscribe();

    let report = controller.ingest(synthetic_dataset(120)).await.unwrap();

    assert_eq!(report.sampled_rows, 50);
    assert_eq!(report.segments, 3);
    assert_eq!(report.reviews, 2);
    assert_eq!(report.recommendations, 1);
    assert_ne!(report.context_version, prior_version);
    assert_eq!(controller.state(), PipelineState::Idle);

    let states: Vec<PipelineState> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            DashboardEvent::PipelineStateChanged { state } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![PipelineState::Parsing, PipelineState::Analyzing, PipelineState::Idle]
    );

    let context = controller.context().await;
    assert_eq!(context.domain_name, "Neighbourhood Grocery");
    assert!(!context.behavioral_weights.contains_key("shoe_size"));
    assert_eq!(controller.selected_segment().await.unwrap().id, seg("seg-a"));
    assert_eq!(provider.calls_for(GatewayOperation::GenerateRecommendations), 1);

    let reloaded = DashboardStore::load(kv).await.unwrap();
    assert_eq!(reloaded.context().domain_name, "Neighbourhood Grocery");
    assert_eq!(reloaded.segments().len(), 3);
    assert_eq!(reloaded.reviews().len(), 2);
}

#[tokio::test]
async fn file_store_survives_a_new_controller() {
    let dir = tempfile::tempdir().unwrap();
    let provider = scripted_provider();

    let first = controller_over(&provider, Arc::new(FileKeyValueStore::new(dir.path()))).await;
    first.ingest(synthetic_dataset(40)).await.unwrap();

    let second = controller_over(&provider, Arc::new(FileKeyValueStore::new(dir.path()))).await;
    let names: Vec<String> = second.segments().await.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Weekly Stockers", "Deal Hunters", "Occasional Gifters"]);
    assert_eq!(second.context().await.domain_name, "Neighbourhood Grocery");
}

#[tokio::test]
async fn empty_discovery_clears_segments_and_skips_later_stages() {
    let provider = scripted_provider()
        .with_response_for(GatewayOperation::DiscoverSegments, "[]");
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;

    let report = controller.ingest(synthetic_dataset(20)).await.unwrap();

    assert_eq!(report.segments, 0);
    assert!(controller.segments().await.is_empty());
    assert!(controller.selected_segment().await.is_none());
    assert_eq!(provider.calls_for(GatewayOperation::GenerateContextualReviews), 0);
    assert_eq!(provider.calls_for(GatewayOperation::GenerateRecommendations), 0);
    assert!(matches!(
        controller.refresh_recommendations().await,
        Err(DashboardError::NoSegments)
    ));
}

#[tokio::test(start_paused = true)]
async fn quota_exhaustion_aborts_but_keeps_new_context() {
    let op = GatewayOperation::DiscoverSegments;
    let provider = MockAIProvider::new()
        .with_response_for(GatewayOperation::SynthesizeDomainDna, dna_json())
        .with_error_for(op, rate_limited())
        .with_error_for(op, rate_limited())
        .with_error_for(op, rate_limited())
        .with_error_for(op, rate_limited());
    let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    let controller = controller_over(&provider, kv.clone()).await;

    let result = controller.ingest(synthetic_dataset(30)).await;

    assert!(matches!(result, Err(DashboardError::QuotaExceeded)));
    assert_eq!(provider.calls_for(op), 4);
    assert_eq!(controller.state(), PipelineState::Idle);
    assert!(controller.error_message().is_some());

    let reloaded = DashboardStore::load(kv).await.unwrap();
    assert_eq!(reloaded.context().domain_name, "Neighbourhood Grocery");
    let kept: Vec<SegmentId> = reloaded.segments().iter().map(|s| s.id.clone()).collect();
    let defaults: Vec<SegmentId> = fixtures::default_segments().into_iter().map(|s| s.id).collect();
    assert_eq!(kept, defaults);
}

#[tokio::test]
async fn recommendation_failure_does_not_fail_ingestion() {
    let provider = MockAIProvider::new()
        .with_response_for(GatewayOperation::SynthesizeDomainDna, dna_json())
        .with_response_for(GatewayOperation::DiscoverSegments, segments_json())
        .with_response_for(GatewayOperation::GenerateContextualReviews, reviews_json())
        .with_error_for(GatewayOperation::GenerateRecommendations, MockError::Unavailable);
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;

    let report = controller.ingest(synthetic_dataset(10)).await.unwrap();

    assert_eq!(report.segments, 3);
    assert_eq!(report.recommendations, 0);
    assert!(controller.error_message().is_none());
}

#[tokio::test]
async fn second_ingestion_resets_deployed_segments() {
    let provider = scripted_provider().with_fallback_for(
        GatewayOperation::GenerateCampaignManifest,
        MockResponse::success(serde_json::to_string(&fixtures::sample_manifest()).unwrap()),
    );
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    controller.ingest(synthetic_dataset(10)).await.unwrap();

    let outcome = controller
        .update_segment_status(&seg("seg-b"), SegmentStatus::ActiveStrategy)
        .await
        .unwrap();
    assert_eq!(outcome, StatusUpdate::Deployed);

    controller.ingest(synthetic_dataset(10)).await.unwrap();

    for segment in controller.segments().await {
        assert_eq!(segment.status, SegmentStatus::Discovery);
        assert!(segment.manifest.is_none());
    }
}

// =============================================================================
// Profiling
// =============================================================================

#[tokio::test(start_paused = true)]
async fn rapid_selection_changes_profile_only_the_last_segment() {
    let provider = with_profiling(scripted_provider());
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    controller.ingest(synthetic_dataset(10)).await.unwrap();

    controller.select_segment(&seg("seg-b")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.select_segment(&seg("seg-c")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(provider.calls_for(GatewayOperation::PersonaDetails), 1);
    assert_eq!(provider.calls_for(GatewayOperation::AnalyzeFriction), 1);
    let profile = controller.profile().await.unwrap();
    assert_eq!(profile.segment_id, seg("seg-c"));
    assert_eq!(profile.friction.friction_score, 37.0);
}

#[tokio::test]
async fn immediate_profile_skips_the_debounce() {
    let provider = MockAIProvider::new()
        .with_response_for(GatewayOperation::PersonaDetails, persona_json())
        .with_response_for(GatewayOperation::AnalyzeFriction, friction_json());
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    let target = fixtures::default_segments()[2].id.clone();

    let profile = controller.select_and_profile(&target).await.unwrap().unwrap();

    assert_eq!(profile.segment_id, target);
    assert_eq!(profile.persona.motivation, "Reliability");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn new_domain_context_triggers_reprofiling_even_if_discovery_fails() {
    let provider = always_rate_limited(
        with_profiling(MockAIProvider::new())
            .with_response_for(GatewayOperation::SynthesizeDomainDna, dna_json()),
        GatewayOperation::DiscoverSegments,
    );
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    let selected = controller.selected_segment().await.unwrap().id;

    let result = controller.ingest(synthetic_dataset(30)).await;
    assert!(matches!(result, Err(DashboardError::QuotaExceeded)));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(provider.calls_for(GatewayOperation::PersonaDetails), 1);
    let persona_call = provider
        .get_calls()
        .into_iter()
        .find(|c| c.metadata.operation == GatewayOperation::PersonaDetails)
        .unwrap();
    assert!(persona_call.prompt.contains("Neighbourhood Grocery"));
    assert_eq!(controller.profile().await.unwrap().segment_id, selected);
}

#[tokio::test(start_paused = true)]
async fn in_flight_profile_for_previous_selection_is_dropped() {
    let provider = with_profiling(scripted_provider())
        .with_delay_for(GatewayOperation::PersonaDetails, Duration::from_secs(2));
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    controller.ingest(synthetic_dataset(10)).await.unwrap();
    let mut events = controller.subscribe();

    // seg-b starts profiling at 500ms and finishes at 2.5s
    controller.select_segment(&seg("seg-b")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;
    controller.select_segment(&seg("seg-c")).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1900)).await;
    assert_eq!(provider.calls_for(GatewayOperation::PersonaDetails), 2);
    assert!(controller.profile().await.is_none());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.profile().await.unwrap().segment_id, seg("seg-c"));

    let ready: Vec<SegmentId> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            DashboardEvent::ProfileReady { segment_id } => Some(segment_id),
            _ => None,
        })
        .collect();
    assert_eq!(ready, vec![seg("seg-c")]);
}

#[tokio::test(start_paused = true)]
async fn profile_from_before_reingestion_is_not_applied() {
    let provider = with_profiling(scripted_provider())
        .with_delay_for(GatewayOperation::PersonaDetails, Duration::from_secs(2));
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;

    // First run profiles seg-a from 500ms to 2.5s
    controller.ingest(synthetic_dataset(10)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    // Same ids come back; the new profile runs from 1.5s to 3.5s
    controller.ingest(synthetic_dataset(10)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(provider.calls_for(GatewayOperation::PersonaDetails), 2);
    assert!(controller.profile().await.is_none());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.profile().await.unwrap().segment_id, seg("seg-a"));
}

#[tokio::test(start_paused = true)]
async fn profiling_quota_exhaustion_raises_error() {
    let provider = always_rate_limited(
        with_profiling(MockAIProvider::new()),
        GatewayOperation::PersonaDetails,
    );
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    let target = fixtures::default_segments()[1].id.clone();

    controller.select_segment(&target).await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert_eq!(provider.calls_for(GatewayOperation::PersonaDetails), 4);
    assert_eq!(controller.error_message().as_deref(), Some(QUOTA_EXCEEDED_MESSAGE));
    assert!(controller.profile().await.is_none());
}

// =============================================================================
// Deployment
// =============================================================================

#[tokio::test(start_paused = true)]
async fn deployment_attaches_manifest_and_notice_expires() {
    let provider = MockAIProvider::new().with_response_for(
        GatewayOperation::GenerateCampaignManifest,
        serde_json::to_string(&fixtures::sample_manifest()).unwrap(),
    );
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    let target = fixtures::default_segments()[1].clone();
    let mut events = controller.subscribe();

    let outcome = controller
        .update_segment_status(&target.id, SegmentStatus::ActiveStrategy)
        .await
        .unwrap();

    assert_eq!(outcome, StatusUpdate::Deployed);
    let deployed = controller
        .segments()
        .await
        .into_iter()
        .find(|s| s.id == target.id)
        .unwrap();
    assert_eq!(deployed.status, SegmentStatus::ActiveStrategy);
    assert_eq!(deployed.manifest, Some(fixtures::sample_manifest()));

    let notice = controller.notice().await.unwrap();
    assert!(notice.contains(&target.name));
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, DashboardEvent::DeploymentSucceeded { .. })));

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(controller.notice().await.is_some());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(controller.notice().await.is_none());
}

#[tokio::test]
async fn failed_deployment_leaves_segment_as_it_was() {
    let provider = MockAIProvider::new().with_response_for(
        GatewayOperation::GenerateCampaignManifest,
        r#"{"activationPlan": "not a list"}"#,
    );
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    let before = fixtures::default_segments()[0].clone();

    let outcome = controller
        .update_segment_status(&before.id, SegmentStatus::ActiveStrategy)
        .await
        .unwrap();

    assert!(matches!(outcome, StatusUpdate::DeploymentFailed { .. }));
    let after = controller
        .segments()
        .await
        .into_iter()
        .find(|s| s.id == before.id)
        .unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.manifest, before.manifest);
    assert!(controller.notice().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn deployment_quota_exhaustion_raises_error() {
    let provider = always_rate_limited(
        MockAIProvider::new(),
        GatewayOperation::GenerateCampaignManifest,
    );
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    let target = fixtures::default_segments()[2].id.clone();

    let outcome = controller
        .update_segment_status(&target, SegmentStatus::ActiveStrategy)
        .await
        .unwrap();

    assert!(matches!(outcome, StatusUpdate::DeploymentFailed { .. }));
    assert_eq!(provider.calls_for(GatewayOperation::GenerateCampaignManifest), 4);
    assert_eq!(controller.error_message().as_deref(), Some(QUOTA_EXCEEDED_MESSAGE));
    let after = controller
        .segments()
        .await
        .into_iter()
        .find(|s| s.id == target)
        .unwrap();
    assert!(after.manifest.is_none());
}

#[tokio::test(start_paused = true)]
async fn deployment_racing_reingestion_does_not_touch_new_segments() {
    let provider = scripted_provider()
        .with_fallback_for(
            GatewayOperation::GenerateCampaignManifest,
            MockResponse::success(serde_json::to_string(&fixtures::sample_manifest()).unwrap()),
        )
        .with_delay_for(GatewayOperation::GenerateCampaignManifest, Duration::from_secs(2));
    let controller = controller_over(&provider, Arc::new(InMemoryKeyValueStore::new())).await;
    controller.ingest(synthetic_dataset(10)).await.unwrap();

    let deploying = Arc::clone(&controller);
    let deployment = tokio::spawn(async move {
        deploying
            .update_segment_status(&seg("seg-b"), SegmentStatus::ActiveStrategy)
            .await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.ingest(synthetic_dataset(10)).await.unwrap();

    let outcome = deployment.await.unwrap().unwrap();

    assert!(matches!(outcome, StatusUpdate::DeploymentFailed { .. }));
    let rediscovered = controller
        .segments()
        .await
        .into_iter()
        .find(|s| s.id == seg("seg-b"))
        .unwrap();
    assert_eq!(rediscovered.status, SegmentStatus::Discovery);
    assert!(rediscovered.manifest.is_none());
    assert!(controller.notice().await.is_none());
}
