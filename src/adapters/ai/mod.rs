//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port plus the gateway the pipeline calls.
//!
//! ## Available Adapters
//!
//! - `AnthropicProvider` - Anthropic Messages API
//! - `OpenAIProvider` - OpenAI chat completions
//! - `MockAIProvider` - Configurable mock for testing
//! - `AIGateway` - Primary/secondary routing with budget checks and fallback

mod anthropic_provider;
mod gateway;
mod http;
mod mock_provider;
mod openai_provider;
mod pricing;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use gateway::{AIGateway, GatewayResponse};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use pricing::{estimate_cost_usd, price_for, ModelPrice, DEFAULT_PRICE};
