//! Ingested tabular data and systematic sampling.
//!
//! Records arrive from the ingestion boundary already flattened into JSON
//! objects. The core never validates or aggregates them; it only chooses
//! which rows are shown to the generative model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upper bound on rows handed to the gateway per pipeline run.
pub const SAMPLE_LIMIT: usize = 50;

/// One flat behavioral record keyed by header name.
pub type Record = Map<String, Value>;

/// Ordered records plus their header list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stride used to walk `count` records down to at most `limit`.
///
/// `max(1, floor(count / limit))`.
pub fn sample_stride(count: usize, limit: usize) -> usize {
    if limit == 0 {
        return 1;
    }
    (count / limit).max(1)
}

/// Takes every `stride`-th item starting at index 0, stopping at `limit` items.
///
/// Deterministic single pass; never random.
pub fn systematic_sample<T: Clone>(items: &[T], limit: usize) -> Vec<T> {
    let stride = sample_stride(items.len(), limit);
    items.iter().step_by(stride).take(limit).cloned().collect()
}
