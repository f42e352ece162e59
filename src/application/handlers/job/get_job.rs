//! GetJobHandler - Query handler for a job with its transition history.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::JobId;
use crate::domain::job::{AuditEntry, Job, JobError};
use crate::ports::{AuditLog, JobRepository};

#[derive(Debug, Clone)]
pub struct GetJobQuery {
    pub job_id: JobId,
}

/// A job plus every audit entry recorded for it, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job: Job,
    pub history: Vec<AuditEntry>,
}

impl JobView {
    pub fn latest_entry(&self) -> Option<&AuditEntry> {
        self.history.last()
    }
}

pub struct GetJobHandler {
    jobs: Arc<dyn JobRepository>,
    audit: Arc<dyn AuditLog>,
}

impl GetJobHandler {
    pub fn new(jobs: Arc<dyn JobRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { jobs, audit }
    }

    pub async fn handle(&self, query: GetJobQuery) -> Result<JobView, JobError> {
        let job = self
            .jobs
            .get_job(&query.job_id)
            .await?
            .ok_or(JobError::NotFound(query.job_id))?;

        // History is observability; a failing audit store still returns the job
        let history = match self.audit.entries_for(&query.job_id).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(job_id = %query.job_id, error = %err, "Failed to load audit history");
                Vec::new()
            }
        };

        Ok(JobView { job, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryJobRepository};
    use crate::application::JobStateMachine;
    use crate::domain::job::{Actor, JobPatch, JobStatus, NewJob};

    #[tokio::test]
    async fn view_explains_current_status() {
        let repo = InMemoryJobRepository::new();
        let audit = InMemoryAuditLog::new();
        let machine = JobStateMachine::new(Arc::new(repo.clone()), Arc::new(audit.clone()));
        let job = machine
            .create(NewJob::submission("body", None).unwrap(), Actor::system())
            .await
            .unwrap();
        machine
            .transition(
                &job.id,
                JobStatus::QaFailed,
                Actor::system(),
                Some("design_validation failed".to_string()),
                JobPatch::new(),
            )
            .await
            .unwrap();

        let view = GetJobHandler::new(Arc::new(repo), Arc::new(audit))
            .handle(GetJobQuery { job_id: job.id })
            .await
            .unwrap();

        assert_eq!(view.history.len(), 2);
        let latest = view.latest_entry().unwrap();
        assert_eq!(latest.to_status, view.job.status);
        assert_eq!(latest.reason.as_deref(), Some("design_validation failed"));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let handler = GetJobHandler::new(
            Arc::new(InMemoryJobRepository::new()),
            Arc::new(InMemoryAuditLog::new()),
        );
        let id = JobId::new();

        let err = handler.handle(GetJobQuery { job_id: id }).await.unwrap_err();

        assert!(matches!(err, JobError::NotFound(found) if found == id));
    }
}
