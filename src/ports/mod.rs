//! Ports - async traits at the boundaries of the core.
//!
//! - `AIProvider` - raw completion against a hosted generative model
//! - `InsightGateway` - the typed model operations the controller uses
//! - `KeyValueStore` - durable storage for the dashboard's persisted entries

mod ai_provider;
mod insight_gateway;
mod key_value_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    RequestMetadata, TokenUsage,
};
pub use insight_gateway::{GatewayError, GatewayOperation, InsightGateway, QUOTA_EXCEEDED_MESSAGE};
pub use key_value_store::{keys, KeyValueStore, StorageError};
