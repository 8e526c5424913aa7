//! PipelineState enum for the ingestion state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of the controller's long-running flows.
///
/// Ingestion walks `Idle -> Parsing -> Analyzing -> Idle`; a
/// recommendation-only refresh walks `Idle -> Loading -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Parsing,
    Analyzing,
    Loading,
}

impl PipelineState {
    /// Validates a transition from this state to another.
    ///
    /// Every busy state may abort straight back to `Idle`.
    pub fn can_transition_to(&self, target: &PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, target),
            (Idle, Parsing)
                | (Idle, Loading)
                | (Parsing, Analyzing)
                | (Parsing, Idle)
                | (Analyzing, Idle)
                | (Loading, Idle)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Parsing => "parsing",
            PipelineState::Analyzing => "analyzing",
            PipelineState::Loading => "loading",
        };
        write!(f, "{}", s)
    }
}
