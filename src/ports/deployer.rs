//! Deployer port - publishes an approved artifact.

use crate::domain::foundation::DomainError;
use crate::domain::job::Job;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a deployed artifact can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReceipt {
    pub location: String,
}

#[async_trait]
pub trait Deployer: Send + Sync {
    /// Publish `artifact` for `job`.
    ///
    /// # Errors
    ///
    /// - `DeployError` when the target rejects or cannot be reached
    async fn deploy(&self, job: &Job, artifact: &str) -> Result<DeploymentReceipt, DomainError>;
}
