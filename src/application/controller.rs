//! Dashboard controller - the sole writer of dashboard state.
//!
//! Sequences the ingestion pipeline, refreshes recommendations, tracks the
//! selected segment, runs debounced profiling and deploys segments as live
//! strategies. Gateway calls are issued without holding the store lock, so
//! profiling and deployment stay responsive while a pipeline run is in
//! flight. At most one pipeline run (ingestion or refresh) is active at a
//! time; the busy flag enforces it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::sleep;

use crate::domain::dataset::{systematic_sample, SAMPLE_LIMIT};
use crate::domain::foundation::{SegmentId, Timestamp};
use crate::domain::{
    Dataset, LearnedDomainContext, MerchandisingRecommendation, PipelineState, SegmentProfile,
    SegmentStatus, ShopperSegment,
};
use crate::ports::{GatewayError, InsightGateway};

use super::error::DashboardError;
use super::events::DashboardEvent;
use super::profiler::ProfileScheduler;
use super::store::DashboardStore;

/// Runtime knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Upper bound on rows sampled per pipeline run.
    pub sample_limit: usize,
    pub debounce: Duration,
    /// How long a deployment notice stays up.
    pub notice_ttl: Duration,
    pub event_capacity: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            sample_limit: SAMPLE_LIMIT,
            debounce: Duration::from_millis(500),
            notice_ttl: Duration::from_millis(3000),
            event_capacity: 256,
        }
    }
}

/// Summary of a completed ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub sampled_rows: usize,
    pub context_version: String,
    pub segments: usize,
    pub reviews: usize,
    pub recommendations: usize,
}

/// Result of a status update.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// A manifest was synthesized and attached.
    Deployed,
    /// Status applied directly; no manifest needed.
    Applied,
    /// Manifest synthesis failed; the segment is unchanged.
    DeploymentFailed { reason: String },
}

#[derive(Debug, Clone)]
struct Notice {
    id: u64,
    message: String,
}

pub struct DashboardController {
    gateway: Arc<dyn InsightGateway>,
    store: RwLock<DashboardStore>,
    settings: DashboardSettings,
    recommendations: RwLock<Vec<MerchandisingRecommendation>>,
    /// Latest profile, tagged with the store generation it was computed at.
    profile: RwLock<Option<(u64, SegmentProfile)>>,
    profiler: ProfileScheduler,
    busy: AtomicBool,
    state: watch::Sender<PipelineState>,
    error: watch::Sender<Option<String>>,
    notice: RwLock<Option<Notice>>,
    notice_seq: AtomicU64,
    events: broadcast::Sender<DashboardEvent>,
}

/// Holds the busy flag for one pipeline run and returns to idle on drop.
struct RunGuard<'a> {
    controller: &'a DashboardController,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.controller.set_state(PipelineState::Idle);
        self.controller.busy.store(false, Ordering::Release);
    }
}

impl DashboardController {
    pub fn new(
        gateway: Arc<dyn InsightGateway>,
        store: DashboardStore,
        settings: DashboardSettings,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));
        let (state, _) = watch::channel(PipelineState::Idle);
        let (error, _) = watch::channel(None);

        Arc::new(Self {
            gateway,
            store: RwLock::new(store),
            settings,
            recommendations: RwLock::new(Vec::new()),
            profile: RwLock::new(None),
            profiler: ProfileScheduler::new(settings.debounce),
            busy: AtomicBool::new(false),
            state,
            error,
            notice: RwLock::new(None),
            notice_seq: AtomicU64::new(0),
            events,
        })
    }

    // ----- Read side -----

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// The user-visible error message, if one is showing.
    pub fn error_message(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.error.send_replace(None);
    }

    pub async fn context(&self) -> LearnedDomainContext {
        self.store.read().await.context().clone()
    }

    pub async fn segments(&self) -> Vec<ShopperSegment> {
        self.store.read().await.segments().to_vec()
    }

    pub async fn selected_segment(&self) -> Option<ShopperSegment> {
        self.store.read().await.selected_segment().cloned()
    }

    pub async fn recommendations(&self) -> Vec<MerchandisingRecommendation> {
        self.recommendations.read().await.clone()
    }

    /// Profile for the current selection; stale profiles are never returned.
    pub async fn profile(&self) -> Option<SegmentProfile> {
        let (selected, generation) = {
            let store = self.store.read().await;
            (store.selected().cloned()?, store.generation())
        };
        self.profile
            .read()
            .await
            .as_ref()
            .filter(|(at, p)| *at == generation && p.is_for(&selected))
            .map(|(_, p)| p.clone())
    }

    pub async fn notice(&self) -> Option<String> {
        self.notice.read().await.as_ref().map(|n| n.message.clone())
    }

    /// Deletes persisted state and reloads the built-in defaults.
    pub async fn reset(self: &Arc<Self>) -> Result<(), DashboardError> {
        let _run = self.begin_run(PipelineState::Loading)?;
        self.store.write().await.reset().await?;
        self.recommendations.write().await.clear();
        *self.profile.write().await = None;

        let (count, selected) = {
            let store = self.store.read().await;
            (store.segments().len(), store.selected().cloned())
        };
        self.emit(DashboardEvent::SegmentsReplaced { count });
        self.emit(DashboardEvent::SelectionChanged {
            segment_id: selected,
        });
        self.schedule_profile();
        Ok(())
    }

    // ----- Ingestion pipeline -----

    /// Runs the full pipeline: DNA synthesis, segment discovery, review
    /// synthesis and recommendations.
    ///
    /// Quota exhaustion aborts the run; anything persisted before it is kept.
    pub async fn ingest(
        self: &Arc<Self>,
        dataset: Dataset,
    ) -> Result<PipelineReport, DashboardError> {
        let _run = self.begin_run(PipelineState::Parsing)?;
        self.clear_error();

        // 1. Systematic sample
        let sample = systematic_sample(&dataset.records, self.settings.sample_limit);
        tracing::info!(
            records = dataset.len(),
            sampled = sample.len(),
            "Starting ingestion pipeline"
        );

        // 2. Domain DNA, refined from the previous context
        let prior = self.context().await;
        let context = self
            .gateway
            .synthesize_domain_dna(&sample, &dataset.headers, Some(&prior))
            .await
            .map_err(|e| self.pipeline_failure(e))?;

        self.store.write().await.replace_context(context.clone()).await?;
        tracing::info!(
            domain = %context.domain_name,
            version = %context.version,
            "Domain DNA updated"
        );
        self.emit(DashboardEvent::ContextUpdated {
            domain_name: context.domain_name.clone(),
            version: context.version.clone(),
        });
        // Folds into the post-discovery run when discovery succeeds
        self.schedule_profile();

        // 3. Segments and reviews
        self.set_state(PipelineState::Analyzing);
        let mut segments = self
            .gateway
            .discover_segments(&sample, &dataset.headers, &context)
            .await
            .map_err(|e| self.pipeline_failure(e))?;

        let discovered_at = Timestamp::now();
        for segment in &mut segments {
            segment.mark_discovered(discovered_at);
        }

        if segments.is_empty() {
            tracing::warn!("Model returned no segments; nothing to select");
            self.store
                .write()
                .await
                .replace_segments(Vec::new(), Vec::new())
                .await?;
            self.recommendations.write().await.clear();
            *self.profile.write().await = None;
            self.emit(DashboardEvent::SegmentsReplaced { count: 0 });
            self.emit(DashboardEvent::SelectionChanged { segment_id: None });
            self.log("Segment discovery returned no segments");

            return Ok(PipelineReport {
                sampled_rows: sample.len(),
                context_version: context.version,
                segments: 0,
                reviews: 0,
                recommendations: 0,
            });
        }

        let reviews = self
            .gateway
            .generate_contextual_reviews(&segments, &context)
            .await
            .map_err(|e| self.pipeline_failure(e))?;

        let (segment_count, review_count) = (segments.len(), reviews.len());
        let selected = segments[0].id.clone();
        self.store
            .write()
            .await
            .replace_segments(segments.clone(), reviews)
            .await?;

        self.emit(DashboardEvent::SegmentsReplaced { count: segment_count });
        self.emit(DashboardEvent::SelectionChanged {
            segment_id: Some(selected),
        });
        self.schedule_profile();

        // 4. Recommendations over the new segment set
        let recommendations = self.generate_recommendations(&segments, &context).await?;

        tracing::info!(
            segments = segment_count,
            reviews = review_count,
            recommendations,
            "Ingestion pipeline finished"
        );

        Ok(PipelineReport {
            sampled_rows: sample.len(),
            context_version: context.version,
            segments: segment_count,
            reviews: review_count,
            recommendations,
        })
    }

    /// Regenerates recommendations from the stored segments and context.
    pub async fn refresh_recommendations(self: &Arc<Self>) -> Result<usize, DashboardError> {
        let _run = self.begin_run(PipelineState::Loading)?;

        let (segments, context) = {
            let store = self.store.read().await;
            (store.segments().to_vec(), store.context().clone())
        };
        if segments.is_empty() {
            return Err(DashboardError::NoSegments);
        }

        self.generate_recommendations(&segments, &context).await
    }

    /// Quota aborts; other failures are logged and the previous
    /// recommendations stay in place.
    async fn generate_recommendations(
        &self,
        segments: &[ShopperSegment],
        context: &LearnedDomainContext,
    ) -> Result<usize, DashboardError> {
        match self.gateway.generate_recommendations(segments, context).await {
            Ok(recommendations) => {
                let count = recommendations.len();
                *self.recommendations.write().await = recommendations;
                self.emit(DashboardEvent::RecommendationsUpdated { count });
                Ok(count)
            }
            Err(err) if err.is_quota_exceeded() => Err(self.pipeline_failure(err)),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Recommendation generation failed; keeping previous set"
                );
                Ok(self.recommendations.read().await.len())
            }
        }
    }

    // ----- Selection and profiling -----

    pub async fn select_segment(self: &Arc<Self>, id: &SegmentId) -> Result<(), DashboardError> {
        if !self.store.write().await.select(id) {
            return Err(DashboardError::SegmentNotFound(id.clone()));
        }

        tracing::debug!(segment_id = %id, "Segment selected");
        self.emit(DashboardEvent::SelectionChanged {
            segment_id: Some(id.clone()),
        });
        self.schedule_profile();
        Ok(())
    }

    /// Selects a segment and profiles it right away, cancelling any
    /// debounced run still waiting.
    pub async fn select_and_profile(
        &self,
        id: &SegmentId,
    ) -> Result<Option<SegmentProfile>, DashboardError> {
        if !self.store.write().await.select(id) {
            return Err(DashboardError::SegmentNotFound(id.clone()));
        }
        self.profiler.cancel();
        self.emit(DashboardEvent::SelectionChanged {
            segment_id: Some(id.clone()),
        });
        self.profile_selected().await
    }

    /// Debounces a profiling run for whatever is selected when it fires.
    pub fn schedule_profile(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.profiler.schedule(move || async move { this.run_profile().await });
    }

    /// Profiles the selected segment immediately, bypassing the debounce.
    ///
    /// Returns `None` when nothing is selected or the selection moved on
    /// before the results arrived. Quota exhaustion also raises the error
    /// state.
    pub async fn profile_selected(&self) -> Result<Option<SegmentProfile>, DashboardError> {
        let (segment, context, reviews, generation) = {
            let store = self.store.read().await;
            let Some(segment) = store.selected_segment().cloned() else {
                return Ok(None);
            };
            (
                segment,
                store.context().clone(),
                store.reviews().to_vec(),
                store.generation(),
            )
        };

        let (persona, friction) = futures::try_join!(
            self.gateway.persona_details(&segment, &context),
            self.gateway.analyze_friction(&segment, &reviews),
        )
        .map_err(|e| {
            let err = DashboardError::from(e);
            if err.is_quota_exceeded() {
                self.raise_error(&err);
            }
            err
        })?;

        let profile = SegmentProfile::new(segment.id, persona, friction);
        {
            let store = self.store.read().await;
            if store.selected() != Some(&profile.segment_id) || store.generation() != generation {
                tracing::debug!(
                    segment_id = %profile.segment_id,
                    "Discarding profile computed for a selection or dataset that has moved on"
                );
                return Ok(None);
            }
        }

        *self.profile.write().await = Some((generation, profile.clone()));
        self.emit(DashboardEvent::ProfileReady {
            segment_id: profile.segment_id.clone(),
        });
        Ok(Some(profile))
    }

    async fn run_profile(&self) {
        match self.profile_selected().await {
            Ok(_) | Err(DashboardError::QuotaExceeded) => {}
            Err(err) => tracing::warn!(error = %err, "Profiling failed; dropping result"),
        }
    }

    // ----- Status updates and deployment -----

    /// Updates a segment's status. Moving to Active Strategy first
    /// synthesizes a campaign manifest; if that fails the segment is left as
    /// it was and the failure is reported in the outcome, not as an error.
    pub async fn update_segment_status(
        self: &Arc<Self>,
        id: &SegmentId,
        status: SegmentStatus,
    ) -> Result<StatusUpdate, DashboardError> {
        let (segment, context, generation) = {
            let store = self.store.read().await;
            let segment = store
                .segment(id)
                .cloned()
                .ok_or_else(|| DashboardError::SegmentNotFound(id.clone()))?;
            (segment, store.context().clone(), store.generation())
        };

        if !status.requires_manifest() {
            if !self.store.write().await.set_segment_status(id, status).await? {
                return Err(DashboardError::SegmentNotFound(id.clone()));
            }
            self.emit(DashboardEvent::SegmentStatusChanged {
                segment_id: id.clone(),
                status,
            });
            self.after_segment_change(id).await;
            return Ok(StatusUpdate::Applied);
        }

        let manifest = match self.gateway.generate_campaign_manifest(&segment, &context).await {
            Ok(manifest) => manifest,
            Err(err) => return Ok(self.deployment_failed(&segment, err)),
        };

        {
            let mut store = self.store.write().await;
            if store.generation() != generation {
                drop(store);
                return Ok(self.deployment_superseded(&segment));
            }
            if !store.deploy_segment(id, manifest).await? {
                return Err(DashboardError::SegmentNotFound(id.clone()));
            }
        }

        let message = format!("Strategy deployed for {}", segment.name);
        tracing::info!(segment_id = %id, "Segment deployed as active strategy");
        self.emit(DashboardEvent::SegmentStatusChanged {
            segment_id: id.clone(),
            status,
        });
        self.emit(DashboardEvent::DeploymentSucceeded {
            segment_id: id.clone(),
            message: message.clone(),
        });
        self.log(&message);
        self.show_notice(message).await;
        self.after_segment_change(id).await;
        Ok(StatusUpdate::Deployed)
    }

    fn deployment_failed(&self, segment: &ShopperSegment, err: GatewayError) -> StatusUpdate {
        tracing::warn!(segment_id = %segment.id, error = %err, "Deployment failed");
        self.log(&format!("Deployment failed for {}: {}", segment.name, err));
        if err.is_quota_exceeded() {
            self.raise_error(&DashboardError::QuotaExceeded);
        }
        StatusUpdate::DeploymentFailed {
            reason: err.to_string(),
        }
    }

    /// The data was replaced while the manifest was being generated; the
    /// manifest describes a segment that no longer exists.
    fn deployment_superseded(&self, segment: &ShopperSegment) -> StatusUpdate {
        tracing::warn!(segment_id = %segment.id, "Segments replaced during deployment");
        self.log(&format!(
            "Deployment for {} dropped; segments were replaced",
            segment.name
        ));
        StatusUpdate::DeploymentFailed {
            reason: "segments were replaced while the manifest was generated".to_string(),
        }
    }

    /// Re-profiles when the changed segment is the selected one.
    async fn after_segment_change(self: &Arc<Self>, id: &SegmentId) {
        if self.store.read().await.selected() == Some(id) {
            self.schedule_profile();
        }
    }

    async fn show_notice(self: &Arc<Self>, message: String) {
        let id = self.notice_seq.fetch_add(1, Ordering::Relaxed) + 1;
        *self.notice.write().await = Some(Notice { id, message });

        let this = Arc::clone(self);
        let ttl = self.settings.notice_ttl;
        tokio::spawn(async move {
            sleep(ttl).await;
            let mut notice = this.notice.write().await;
            // A newer notice owns the slot now
            if notice.as_ref().map(|n| n.id) == Some(id) {
                *notice = None;
                drop(notice);
                this.emit(DashboardEvent::NoticeCleared);
            }
        });
    }

    // ----- Plumbing -----

    fn begin_run(&self, first: PipelineState) -> Result<RunGuard<'_>, DashboardError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DashboardError::PipelineBusy);
        }
        let guard = RunGuard { controller: self };
        self.set_state(first);
        Ok(guard)
    }

    fn set_state(&self, next: PipelineState) {
        let current = self.state();
        if current == next {
            return;
        }
        if !current.can_transition_to(&next) {
            tracing::warn!(from = %current, to = %next, "Unexpected pipeline transition");
        }
        self.state.send_replace(next);
        tracing::debug!(from = %current, to = %next, "Pipeline state changed");
        self.emit(DashboardEvent::PipelineStateChanged { state: next });
    }

    /// Surfaces a failed pipeline step to the error state and converts it.
    fn pipeline_failure(&self, err: GatewayError) -> DashboardError {
        let err = DashboardError::from(err);
        tracing::error!(error = %err, "Pipeline step failed");
        self.raise_error(&err);
        err
    }

    fn raise_error(&self, err: &DashboardError) {
        let message = err.to_string();
        self.error.send_replace(Some(message.clone()));
        self.emit(DashboardEvent::ErrorRaised { message });
    }

    fn log(&self, message: &str) {
        self.emit(DashboardEvent::Log {
            message: message.to_string(),
        });
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
