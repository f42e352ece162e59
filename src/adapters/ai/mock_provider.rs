//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing pipeline tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, globally or per pipeline stage
//! - Simulated delays
//! - Error injection, once or on every call
//! - An "unconfigured" mode that reports itself unavailable
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::named("primary")
//!     .with_stage_response("extraction", r#"{"module_title": "Pricing"}"#)
//!     .with_delay(Duration::from_millis(100));
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::pipeline::estimate_tokens;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Responses consumed in order when no stage queue applies.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses keyed by `RequestMetadata::stage`.
    stage_responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Returned on every call once set.
    always_fail: Option<MockError>,
    available: bool,
    info: ProviderInfo,
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

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContextTooLong { tokens: u32, max: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong { tokens, max } => AIError::context_too_long(tokens, max),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// A mock reporting `name` as its provider name.
    pub fn named(name: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            stage_responses: Arc::new(Mutex::new(HashMap::new())),
            always_fail: None,
            available: true,
            info: ProviderInfo::new(name, format!("{}-model-1", name), 128_000),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that reports itself unconfigured.
    pub fn unavailable(name: &str) -> Self {
        Self {
            available: false,
            ..Self::named(name)
        }
    }

    /// Adds a successful response to the general queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, TokenUsage::new(10, 20), FinishReason::Stop)
    }

    pub fn with_response_full(
        self,
        content: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        guard(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            usage,
            finish_reason,
        });
        self
    }

    /// Adds an error response to the general queue.
    pub fn with_error(self, error: MockError) -> Self {
        guard(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Adds a successful response for one pipeline stage.
    pub fn with_stage_response(self, stage: &str, content: impl Into<String>) -> Self {
        guard(&self.stage_responses)
            .entry(stage.to_string())
            .or_default()
            .push_back(MockResponse::Success {
                content: content.into(),
                usage: TokenUsage::new(10, 20),
                finish_reason: FinishReason::Stop,
            });
        self
    }

    /// Adds an error for one pipeline stage.
    pub fn with_stage_error(self, stage: &str, error: MockError) -> Self {
        guard(&self.stage_responses)
            .entry(stage.to_string())
            .or_default()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Fails every call with `error`.
    pub fn failing_with(mut self, error: MockError) -> Self {
        self.always_fail = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    pub fn call_count(&self) -> usize {
        guard(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        guard(&self.calls).clone()
    }

    /// Recorded calls made for one stage.
    pub fn calls_for_stage(&self, stage: &str) -> Vec<CompletionRequest> {
        guard(&self.calls)
            .iter()
            .filter(|c| c.metadata.stage.as_deref() == Some(stage))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        guard(&self.calls).clear();
    }

    fn next_response(&self, stage: Option<&str>) -> MockResponse {
        if let Some(err) = &self.always_fail {
            return MockResponse::Error(err.clone());
        }
        if let Some(stage) = stage {
            if let Some(response) = guard(&self.stage_responses)
                .get_mut(stage)
                .and_then(VecDeque::pop_front)
            {
                return response;
            }
        }
        guard(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                usage: TokenUsage::new(5, 10),
                finish_reason: FinishReason::Stop,
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let stage = request.metadata.stage.clone();
        guard(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(stage.as_deref()) {
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

    fn estimate_tokens(&self, text: &str) -> u32 {
        estimate_tokens(text)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
