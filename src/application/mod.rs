//! Application layer - orchestration of the dashboard.
//!
//! The controller is the only writer of dashboard state. It adopts values
//! returned by the insight gateway, persists them through the store and
//! reports progress on an event channel.

mod controller;
mod error;
mod events;
mod profiler;
mod store;

pub use controller::{DashboardController, DashboardSettings, PipelineReport, StatusUpdate};
pub use error::DashboardError;
pub use events::DashboardEvent;
pub use profiler::ProfileScheduler;
pub use store::DashboardStore;
