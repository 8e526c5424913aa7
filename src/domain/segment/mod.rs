//! Segment module - discovered shopper segments and their deployment state.

mod manifest;
mod shopper_segment;
mod status;

pub use manifest::{ActivationStep, CampaignManifest, ProjectedMetrics};
pub use shopper_segment::{SegmentKpis, ShopperSegment};
pub use status::SegmentStatus;
