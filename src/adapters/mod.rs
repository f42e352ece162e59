//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI/Anthropic providers, the mock provider and the AI gateway
//! - `memory` - in-memory job store, audit log and deployer

pub mod ai;
pub mod memory;

pub use ai::{AIGateway, GatewayResponse, MockAIProvider};
pub use memory::{InMemoryAuditLog, InMemoryDeployer, InMemoryJobRepository};
