//! In-Memory Deployer - records deployments instead of publishing them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, JobId};
use crate::domain::job::Job;
use crate::ports::{Deployer, DeploymentReceipt};

/// Deployer that keeps published artifacts in memory, keyed by job.
#[derive(Debug, Clone)]
pub struct InMemoryDeployer {
    base_url: String,
    deployed: Arc<RwLock<HashMap<JobId, String>>>,
    failure: Option<String>,
}

impl Default for InMemoryDeployer {
    fn default() -> Self {
        Self::new("memory://tools")
    }
}

impl InMemoryDeployer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            deployed: Arc::new(RwLock::new(HashMap::new())),
            failure: None,
        }
    }

    /// A deployer whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn deployed_artifact(&self, job_id: &JobId) -> Option<String> {
        self.deployed.read().await.get(job_id).cloned()
    }

    pub async fn deployment_count(&self) -> usize {
        self.deployed.read().await.len()
    }
}

#[async_trait]
impl Deployer for InMemoryDeployer {
    async fn deploy(&self, job: &Job, artifact: &str) -> Result<DeploymentReceipt, DomainError> {
        if let Some(message) = &self.failure {
            return Err(DomainError::new(ErrorCode::DeployError, message.clone())
                .with_detail("job_id", job.id.to_string()));
        }
        self.deployed
            .write()
            .await
            .insert(job.id, artifact.to_string());
        Ok(DeploymentReceipt {
            location: format!("{}/{}", self.base_url.trim_end_matches('/'), job.slug),
        })
    }
}
