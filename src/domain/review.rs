//! Synthetic feedback records generated alongside segments.

use serde::{Deserialize, Serialize};

use super::foundation::ReviewId;

/// A synthesized customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: f64,
    pub content: String,
    pub category: String,
}
