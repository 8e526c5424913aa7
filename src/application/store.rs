//! Persisted dashboard state.
//!
//! Holds the live domain context, segment collection, review collection and
//! the current selection. The three collections mirror three key-value
//! entries: read once at start-up, rewritten wholesale after each change.
//! The selection is session state and is never persisted.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{SegmentId, Timestamp};
use crate::domain::{
    fixtures, CampaignManifest, LearnedDomainContext, Review, SegmentStatus, ShopperSegment,
};
use crate::ports::{keys, KeyValueStore, StorageError};

pub struct DashboardStore {
    kv: Arc<dyn KeyValueStore>,
    context: LearnedDomainContext,
    segments: Vec<ShopperSegment>,
    reviews: Vec<Review>,
    selected: Option<SegmentId>,
    /// Bumped whenever the context or the segment collection is replaced.
    generation: u64,
}

impl DashboardStore {
    /// Reads all three entries, substituting built-in defaults for entries
    /// that are missing or fail to decode.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let context: LearnedDomainContext =
            read_entry(kv.as_ref(), keys::DOMAIN_CONTEXT, fixtures::default_domain_context).await?;
        let segments: Vec<ShopperSegment> =
            read_entry(kv.as_ref(), keys::SEGMENTS, fixtures::default_segments).await?;
        let reviews: Vec<Review> =
            read_entry(kv.as_ref(), keys::REVIEWS, fixtures::default_reviews).await?;
        let selected = segments.first().map(|s| s.id.clone());

        tracing::info!(
            domain = %context.domain_name,
            version = %context.version,
            segments = segments.len(),
            reviews = reviews.len(),
            "Dashboard store loaded"
        );

        Ok(Self {
            kv,
            context,
            segments,
            reviews,
            selected,
            generation: 0,
        })
    }

    pub fn context(&self) -> &LearnedDomainContext {
        &self.context
    }

    pub fn segments(&self) -> &[ShopperSegment] {
        &self.segments
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&ShopperSegment> {
        self.segments.iter().find(|s| &s.id == id)
    }

    /// Changes whenever results computed from earlier data go stale, even
    /// if segment ids are reused.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selected(&self) -> Option<&SegmentId> {
        self.selected.as_ref()
    }

    pub fn selected_segment(&self) -> Option<&ShopperSegment> {
        self.selected.as_ref().and_then(|id| self.segment(id))
    }

    /// Selects a segment; returns false if no segment has that id.
    pub fn select(&mut self, id: &SegmentId) -> bool {
        if self.segment(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    /// Replaces the domain context and persists it.
    pub async fn replace_context(
        &mut self,
        context: LearnedDomainContext,
    ) -> Result<(), StorageError> {
        self.context = context;
        self.generation += 1;
        write_entry(self.kv.as_ref(), keys::DOMAIN_CONTEXT, &self.context).await
    }

    /// Replaces segments and reviews wholesale, persists both and selects
    /// the first segment (none if the collection is empty).
    pub async fn replace_segments(
        &mut self,
        segments: Vec<ShopperSegment>,
        reviews: Vec<Review>,
    ) -> Result<(), StorageError> {
        self.selected = segments.first().map(|s| s.id.clone());
        self.segments = segments;
        self.reviews = reviews;
        self.generation += 1;

        write_entry(self.kv.as_ref(), keys::SEGMENTS, &self.segments).await?;
        write_entry(self.kv.as_ref(), keys::REVIEWS, &self.reviews).await
    }

    /// Attaches a manifest to a segment and persists the collection.
    ///
    /// Returns false if the segment disappeared in the meantime.
    pub async fn deploy_segment(
        &mut self,
        id: &SegmentId,
        manifest: CampaignManifest,
    ) -> Result<bool, StorageError> {
        let Some(segment) = self.segments.iter_mut().find(|s| &s.id == id) else {
            return Ok(false);
        };
        segment.deploy(manifest, Timestamp::now());
        self.persist_segments().await?;
        Ok(true)
    }

    /// Sets a segment's status in place and persists the collection.
    pub async fn set_segment_status(
        &mut self,
        id: &SegmentId,
        status: SegmentStatus,
    ) -> Result<bool, StorageError> {
        let Some(segment) = self.segments.iter_mut().find(|s| &s.id == id) else {
            return Ok(false);
        };
        segment.set_status(status, Timestamp::now());
        self.persist_segments().await?;
        Ok(true)
    }

    pub async fn persist_segments(&self) -> Result<(), StorageError> {
        write_entry(self.kv.as_ref(), keys::SEGMENTS, &self.segments).await
    }

    /// Deletes every persisted entry and restores the built-in defaults.
    pub async fn reset(&mut self) -> Result<(), StorageError> {
        for key in keys::ALL {
            self.kv.remove(key).await?;
        }
        self.context = fixtures::default_domain_context();
        self.segments = fixtures::default_segments();
        self.reviews = fixtures::default_reviews();
        self.selected = self.segments.first().map(|s| s.id.clone());
        self.generation += 1;
        Ok(())
    }
}

async fn read_entry<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
    default: fn() -> T,
) -> Result<T, StorageError> {
    let Some(raw) = kv.get(key).await? else {
        tracing::debug!(key, "No stored entry, using built-in default");
        return Ok(default());
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(
                key,
                error = %e,
                "Stored entry failed to decode, using built-in default"
            );
            Ok(default())
        }
    }
}

async fn write_entry<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::SerializationFailed {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    kv.put(key, raw).await
}
