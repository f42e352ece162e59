//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - language-model completion endpoint
//! - `JobRepository` - job records and artifacts
//! - `AuditLog` - append-only transition history
//! - `Deployer` - publishes approved artifacts

mod ai_provider;
mod audit_log;
mod deployer;
mod job_repository;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use audit_log::AuditLog;
pub use deployer::{Deployer, DeploymentReceipt};
pub use job_repository::JobRepository;
