//! AI Gateway - one entry point over the primary and secondary providers.
//!
//! Built once at startup and shared by `Arc`. Two ways in:
//!
//! - [`AIGateway::complete`] routes a request to one provider (hinted,
//!   else primary, else secondary) with no fallback.
//! - [`AIGateway::complete_with_fallback`] is what the pipeline uses: a
//!   pre-flight availability and token budget check, then the primary, then
//!   the secondary if the primary call fails for any reason.
//!
//! The fallback is sequential. Both providers are never raced.
//!
//! # Example
//!
//! ```ignore
//! let gateway = AIGateway::new(Some(anthropic), Some(openai));
//! gateway.ensure_available()?;
//!
//! let response = gateway.complete_with_fallback(request, "extraction").await?;
//! if response.used_fallback {
//!     // response.original_provider names the provider that failed
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::pricing::estimate_cost_usd;
use crate::domain::pipeline::{estimate_tokens, StageBudget};
use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, TokenUsage};

/// Result of a gateway call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub content: String,
    /// Name of the provider that produced `content`.
    pub provider: String,
    pub model: String,
    pub usage: TokenUsage,
    pub duration_ms: u64,
    pub used_fallback: bool,
    /// Provider whose failure triggered the fallback.
    pub original_provider: Option<String>,
}

impl GatewayResponse {
    fn from_completion(
        response: CompletionResponse,
        provider: String,
        started: Instant,
        original_provider: Option<String>,
    ) -> Self {
        Self {
            content: response.content,
            provider,
            model: response.model,
            usage: response.usage,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            used_fallback: original_provider.is_some(),
            original_provider,
        }
    }
}

/// Gateway over up to two interchangeable completion providers.
#[derive(Clone)]
pub struct AIGateway {
    primary: Option<Arc<dyn AIProvider>>,
    secondary: Option<Arc<dyn AIProvider>>,
}

impl AIGateway {
    pub fn new(
        primary: Option<Arc<dyn AIProvider>>,
        secondary: Option<Arc<dyn AIProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    fn primary(&self) -> Option<&Arc<dyn AIProvider>> {
        self.primary.as_ref().filter(|p| p.is_available())
    }

    fn secondary(&self) -> Option<&Arc<dyn AIProvider>> {
        self.secondary.as_ref().filter(|p| p.is_available())
    }

    /// True if at least one configured provider reports itself available.
    pub fn has_available_provider(&self) -> bool {
        self.primary().is_some() || self.secondary().is_some()
    }

    /// Fails with `NoProviderAvailable` when neither provider can be called.
    ///
    /// Pipeline triggers call this before moving a job to `PROCESSING`.
    pub fn ensure_available(&self) -> Result<(), AIError> {
        if self.has_available_provider() {
            Ok(())
        } else {
            Err(AIError::NoProviderAvailable)
        }
    }

    /// Names of the available providers, primary first.
    pub fn available_providers(&self) -> Vec<String> {
        self.primary()
            .into_iter()
            .chain(self.secondary())
            .map(|p| p.provider_info().name)
            .collect()
    }

    /// Single-provider completion.
    ///
    /// `hint` selects a provider by name when that provider is available;
    /// otherwise the primary is used, then the secondary.
    pub async fn complete(
        &self,
        request: CompletionRequest,
        hint: Option<&str>,
    ) -> Result<GatewayResponse, AIError> {
        let hinted = hint.and_then(|name| {
            self.primary()
                .into_iter()
                .chain(self.secondary())
                .find(|p| p.provider_info().name == name)
        });
        let provider = hinted
            .or_else(|| self.primary())
            .or_else(|| self.secondary())
            .ok_or(AIError::NoProviderAvailable)?;

        let stage = request.metadata.stage.clone().unwrap_or_default();
        let started = Instant::now();
        let name = provider.provider_info().name;
        let response = provider.complete(request).await?;
        let response = GatewayResponse::from_completion(response, name, started, None);
        log_cost(&stage, &response);
        Ok(response)
    }

    /// Completion with budget check and automatic fallback.
    ///
    /// # Errors
    ///
    /// - `NoProviderAvailable` if neither provider is available (no call made)
    /// - `TokenLimitExceeded` if the estimated input exceeds the stage budget
    ///   (no call made)
    /// - the secondary's error if both providers fail, or the only available
    ///   provider's error
    pub async fn complete_with_fallback(
        &self,
        mut request: CompletionRequest,
        stage: &str,
    ) -> Result<GatewayResponse, AIError> {
        self.ensure_available()?;

        let budget = StageBudget::for_stage_name(stage);
        let estimated = estimate_tokens(&request.prompt_text());
        if !budget.admits(estimated) {
            tracing::warn!(
                stage,
                estimated_tokens = estimated,
                limit = budget.max_input_tokens,
                "Request exceeds stage token budget"
            );
            return Err(AIError::token_limit_exceeded(
                stage,
                estimated,
                budget.max_input_tokens,
            ));
        }
        request.max_tokens.get_or_insert(budget.max_output_tokens);
        if request.metadata.stage.is_none() {
            request.metadata.stage = Some(stage.to_string());
        }

        let response = match (self.primary(), self.secondary()) {
            (Some(primary), secondary) => {
                let primary_name = primary.provider_info().name;
                let started = Instant::now();
                match primary.complete(request.clone()).await {
                    Ok(response) => {
                        GatewayResponse::from_completion(response, primary_name, started, None)
                    }
                    Err(err) => {
                        let Some(secondary) = secondary else {
                            tracing::error!(stage, provider = %primary_name, error = %err, "AI call failed, no fallback configured");
                            return Err(err);
                        };
                        let secondary_name = secondary.provider_info().name;
                        tracing::warn!(
                            stage,
                            provider = %primary_name,
                            fallback = %secondary_name,
                            error = %err,
                            "Primary provider failed, falling back"
                        );
                        let started = Instant::now();
                        let response = secondary.complete(request).await.map_err(|fallback_err| {
                            tracing::error!(
                                stage,
                                provider = %secondary_name,
                                error = %fallback_err,
                                primary_error = %err,
                                "Fallback provider failed"
                            );
                            fallback_err
                        })?;
                        GatewayResponse::from_completion(
                            response,
                            secondary_name,
                            started,
                            Some(primary_name),
                        )
                    }
                }
            }
            (None, Some(secondary)) => {
                let name = secondary.provider_info().name;
                let started = Instant::now();
                let response = secondary.complete(request).await?;
                GatewayResponse::from_completion(response, name, started, None)
            }
            (None, None) => return Err(AIError::NoProviderAvailable),
        };

        log_cost(stage, &response);
        Ok(response)
    }
}

fn log_cost(stage: &str, response: &GatewayResponse) {
    let cost_usd = estimate_cost_usd(
        &response.model,
        response.usage.prompt_tokens,
        response.usage.completion_tokens,
    );
    tracing::info!(
        stage,
        provider = %response.provider,
        model = %response.model,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        duration_ms = response.duration_ms,
        used_fallback = response.used_fallback,
        cost_usd,
        "AI call completed"
    );
}
