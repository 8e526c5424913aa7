//! Mock AI Provider for testing.
//!
//! Responses are scripted per gateway operation, so a test can drive a whole
//! ingestion pipeline without calling a real model.
//!
//! # Features
//!
//! - Per-operation response queues, plus an optional repeating fallback
//! - Simulated delays for timeout and debounce testing
//! - Error injection for retry and quota testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response_for(GatewayOperation::PersonaDetails, persona_json)
//!     .with_error_for(GatewayOperation::AnalyzeFriction, MockError::Unavailable);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, GatewayOperation,
    ProviderInfo, TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Scripted responses per operation (consumed in order).
    scripts: Arc<Mutex<HashMap<GatewayOperation, VecDeque<MockResponse>>>>,
    /// Returned once an operation's queue is empty.
    fallbacks: Arc<Mutex<HashMap<GatewayOperation, MockResponse>>>,
    delays: Arc<Mutex<HashMap<GatewayOperation, Duration>>>,
    info: ProviderInfo,
    /// Simulated latency for every request.
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

impl MockResponse {
    pub fn success(content: impl Into<String>) -> Self {
        MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting with the given provider wording.
    RateLimited { message: String },
    Unavailable,
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_ms: u64 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { message } => AIError::rate_limited(message),
            MockError::Unavailable => AIError::unavailable("mock provider unavailable"),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_ms } => AIError::Timeout { timeout_ms },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            fallbacks: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 128_000),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response for one operation.
    pub fn with_response_for(
        self,
        operation: GatewayOperation,
        content: impl Into<String>,
    ) -> Self {
        self.push(operation, MockResponse::success(content));
        self
    }

    /// Queues an error for one operation.
    pub fn with_error_for(self, operation: GatewayOperation, error: MockError) -> Self {
        self.push(operation, MockResponse::Error(error));
        self
    }

    /// Sets the response returned whenever the operation's queue is empty.
    pub fn with_fallback_for(self, operation: GatewayOperation, response: MockResponse) -> Self {
        lock(&self.fallbacks).insert(operation, response);
        self
    }

    /// Sets simulated latency for every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets simulated latency for one operation, overriding the global delay.
    pub fn with_delay_for(self, operation: GatewayOperation, delay: Duration) -> Self {
        lock(&self.delays).insert(operation, delay);
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Queues a response on an already shared provider.
    pub fn push(&self, operation: GatewayOperation, response: MockResponse) {
        lock(&self.scripts)
            .entry(operation)
            .or_default()
            .push_back(response);
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of requests issued for one operation.
    pub fn calls_for(&self, operation: GatewayOperation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.metadata.operation == operation)
            .count()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn next_response(&self, operation: GatewayOperation) -> MockResponse {
        if let Some(response) = lock(&self.scripts)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        lock(&self.fallbacks)
            .get(&operation)
            .cloned()
            .unwrap_or(MockResponse::Error(MockError::Unavailable))
    }

    fn delay_for(&self, operation: GatewayOperation) -> Duration {
        lock(&self.delays).get(&operation).copied().unwrap_or(self.delay)
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let operation = request.metadata.operation;
        lock(&self.calls).push(request);

        let delay = self.delay_for(operation);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        match self.next_response(operation) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
