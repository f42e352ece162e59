//! In-Memory Job Repository
//!
//! Stores job records and their artifacts in memory. Used by the binary and
//! by tests; honors the same compare-and-set contract a database store would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, JobId};
use crate::domain::job::{ArtifactKind, Job, JobPatch, NewJob};
use crate::ports::JobRepository;

/// In-memory storage for jobs and artifacts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    artifacts: Arc<RwLock<HashMap<(JobId, ArtifactKind), String>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn artifact_count(&self) -> usize {
        self.artifacts.read().await.len()
    }
}

fn not_found(id: &JobId) -> DomainError {
    DomainError::new(ErrorCode::JobNotFound, format!("Job not found: {}", id))
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, DomainError> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, DomainError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&new.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Job {} already exists", new.id),
            ));
        }
        let job = Job::from_new(new);
        jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job, DomainError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or_else(|| not_found(id))?;

        if let Some(expected) = patch.expected_status {
            if job.status != expected {
                return Err(DomainError::new(
                    ErrorCode::StatusConflict,
                    format!("Job {} status changed concurrently", id),
                )
                .with_detail("expected", expected.as_str())
                .with_detail("actual", job.status.as_str()));
            }
        }

        patch.apply_to(job);
        Ok(job.clone())
    }

    async fn save_artifact(
        &self,
        id: &JobId,
        kind: ArtifactKind,
        content: String,
    ) -> Result<(), DomainError> {
        if !self.jobs.read().await.contains_key(id) {
            return Err(not_found(id));
        }
        self.artifacts.write().await.insert((*id, kind), content);
        Ok(())
    }

    async fn get_artifact(
        &self,
        id: &JobId,
        kind: ArtifactKind,
    ) -> Result<Option<String>, DomainError> {
        Ok(self.artifacts.read().await.get(&(*id, kind)).cloned())
    }
}
