//! SegmentStatus enum for tracking how a segment is being used.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a shopper segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SegmentStatus {
    /// Freshly discovered, no strategy attached.
    #[default]
    Discovery,
    /// Deployed with a campaign manifest.
    #[serde(rename = "Active Strategy")]
    ActiveStrategy,
    Monitoring,
    Archived,
}

impl SegmentStatus {
    /// Returns true if moving to this status requires a campaign manifest.
    pub fn requires_manifest(&self) -> bool {
        matches!(self, SegmentStatus::ActiveStrategy)
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SegmentStatus::Discovery => "Discovery",
            SegmentStatus::ActiveStrategy => "Active Strategy",
            SegmentStatus::Monitoring => "Monitoring",
            SegmentStatus::Archived => "Archived",
        };
        f.pad(s)
    }
}
