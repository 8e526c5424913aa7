//! AI Adapters.
//!
//! The model-backed [`InsightGateway`](crate::ports::InsightGateway) plus the
//! providers it can sit on.
//!
//! ## Available Adapters
//!
//! - `LlmInsightGateway` - Prompt, schema, retry and parse for the seven operations
//! - `GeminiProvider` - Google Generative Language API
//! - `MockAIProvider` - Per-operation scripted mock for testing
//! - `RetryPolicy` - Exponential backoff on rate-limited calls

mod gemini_provider;
mod llm_gateway;
mod mock_provider;
mod prompts;
mod retry;
mod schemas;
mod wire;

pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use llm_gateway::LlmInsightGateway;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use retry::{FailureKind, RetryError, RetryPolicy, RATE_LIMIT_MARKERS};
