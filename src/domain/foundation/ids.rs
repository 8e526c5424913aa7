//! Strongly-typed identifier value objects.
//!
//! Segment and review ids are issued by the generative model, so they wrap
//! strings rather than UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Identifier of a discovered shopper segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    /// Creates a new SegmentId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("segment_id"));
        }
        Ok(Self(id))
    }

    /// Built-in ids for fixtures; never blank.
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.to_string())
    }

    /// Positional fallback id used when the model omits or repeats one.
    pub fn positional(index: usize) -> Self {
        Self(format!("seg-{}", index))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier of a synthesized review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(String);

impl ReviewId {
    /// Creates a new ReviewId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("review_id"));
        }
        Ok(Self(id))
    }

    /// Built-in ids for fixtures; never blank.
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.to_string())
    }

    /// Positional fallback id used when the model omits one.
    pub fn positional(index: usize) -> Self {
        Self(format!("rev-{}", index))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_id_accepts_non_empty_string() {
        let id = SegmentId::new("seg_value_hunters").unwrap();
        assert_eq!(id.as_str(), "seg_value_hunters");
    }

    #[test]
    fn segment_id_rejects_blank_string() {
        let result = SegmentId::new("   ");
        match result {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "segment_id"),
            _ => panic!("Expected EmptyField error"),
        }
    }

    #[test]
    fn positional_segment_id_uses_index() {
        assert_eq!(SegmentId::positional(3).to_string(), "seg-3");
    }

    #[test]
    fn segment_id_serializes_transparently() {
        let id = SegmentId::new("s1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s1\"");
    }

    #[test]
    fn review_id_rejects_empty_string() {
        assert!(ReviewId::new("").is_err());
        assert_eq!(ReviewId::new("r-1").unwrap().to_string(), "r-1");
    }
}
