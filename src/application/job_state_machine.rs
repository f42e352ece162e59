//! JobStateMachine - the single writer path for job status.
//!
//! Every status change goes through [`JobStateMachine::transition`]:
//!
//! 1. load the job and check the transition against the lifecycle table,
//!    returning `JobError::InvalidTransition` when it is not legal;
//! 2. write status and patch in one compare-and-set update that expects the
//!    status just read, so a racing writer yields `JobError::Conflict`
//!    instead of a lost update;
//! 3. append exactly one `AuditEntry`.
//!
//! Audit appends are best-effort: a failure is logged and the status write
//! stands.

use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, JobId, StateMachine};
use crate::domain::job::{Actor, AuditEntry, Job, JobError, JobPatch, JobStatus, NewJob};
use crate::ports::{AuditLog, JobRepository};

pub struct JobStateMachine {
    jobs: Arc<dyn JobRepository>,
    audit: Arc<dyn AuditLog>,
}

impl JobStateMachine {
    pub fn new(jobs: Arc<dyn JobRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { jobs, audit }
    }

    pub fn jobs(&self) -> &Arc<dyn JobRepository> {
        &self.jobs
    }

    /// Loads a job, mapping absence to `JobError::NotFound`.
    pub async fn get(&self, job_id: &JobId) -> Result<Job, JobError> {
        self.jobs
            .get_job(job_id)
            .await?
            .ok_or(JobError::NotFound(*job_id))
    }

    /// Creates a job and writes its creation audit entry.
    pub async fn create(&self, new: NewJob, actor: Actor) -> Result<Job, JobError> {
        let job = self.jobs.create_job(new).await?;
        tracing::info!(job_id = %job.id, slug = %job.slug, status = %job.status, "Job created");
        self.record(AuditEntry::creation(job.id, job.status, actor)).await;
        Ok(job)
    }

    /// Moves a job to `target`, applying `patch` in the same write.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the job doesn't exist
    /// - `InvalidTransition` if the lifecycle table forbids the move; nothing
    ///   is written
    /// - `Conflict` if the status changed between read and write
    pub async fn transition(
        &self,
        job_id: &JobId,
        target: JobStatus,
        actor: Actor,
        reason: Option<String>,
        patch: JobPatch,
    ) -> Result<Job, JobError> {
        let job = self.get(job_id).await?;
        let from = job.status;
        if !from.can_transition_to(&target) {
            tracing::warn!(job_id = %job_id, from = %from, to = %target, "Rejected illegal transition");
            return Err(JobError::invalid_transition(from, target));
        }

        let patch = patch.expecting(from).status(target);
        let updated = self.jobs.update_job(job_id, patch).await.map_err(|err| {
            if err.code == ErrorCode::StatusConflict {
                JobError::Conflict(*job_id)
            } else {
                err.into()
            }
        })?;

        tracing::info!(
            job_id = %job_id,
            from = %from,
            to = %target,
            actor = %actor.kind,
            actor_name = %actor.name,
            "Job transitioned"
        );
        self.record(AuditEntry::transition(*job_id, from, target, actor, reason))
            .await;

        Ok(updated)
    }

    async fn record(&self, entry: AuditEntry) {
        let job_id = entry.job_id;
        let to = entry.to_status;
        if let Err(err) = self.audit.append(entry).await {
            tracing::error!(job_id = %job_id, to = %to, error = %err, "Failed to append audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryJobRepository};

    struct Fixture {
        machine: JobStateMachine,
        repo: InMemoryJobRepository,
        audit: InMemoryAuditLog,
    }

    fn fixture_with(audit: InMemoryAuditLog) -> Fixture {
        let repo = InMemoryJobRepository::new();
        let machine = JobStateMachine::new(Arc::new(repo.clone()), Arc::new(audit.clone()));
        Fixture { machine, repo, audit }
    }

    fn fixture() -> Fixture {
        fixture_with(InMemoryAuditLog::new())
    }

    async fn submitted(f: &Fixture) -> Job {
        f.machine
            .create(NewJob::submission("# Levers\nbody", None).unwrap(), Actor::human("author"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_writes_one_creation_entry() {
        let f = fixture();
        let job = submitted(&f).await;

        let entries = f.audit.entries_for(&job.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].from_status.is_none());
        assert_eq!(entries[0].to_status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn legal_transition_writes_status_patch_and_audit() {
        let f = fixture();
        let job = submitted(&f).await;

        let updated = f
            .machine
            .transition(
                &job.id,
                JobStatus::QaFailed,
                Actor::system(),
                Some("output validation failed".to_string()),
                JobPatch::new().last_error(Some("boom".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, JobStatus::QaFailed);
        assert_eq!(updated.last_error.as_deref(), Some("boom"));
        let entries = f.audit.entries_for(&job.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].from_status, Some(JobStatus::Processing));
        assert_eq!(entries[1].to_status, updated.status);
    }

    #[tokio::test]
    async fn illegal_transition_is_a_value_and_writes_nothing() {
        let f = fixture();
        let job = submitted(&f).await;

        let err = f
            .machine
            .transition(
                &job.id,
                JobStatus::Deployed,
                Actor::human("reviewer"),
                None,
                JobPatch::new().revision_count(7),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            JobError::InvalidTransition { from: JobStatus::Processing, to: JobStatus::Deployed }
        ));
        let stored = f.repo.get_job(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Processing);
        assert_eq!(stored.revision_count, 1);
        assert_eq!(f.audit.entries_for(&job.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let f = fixture();
        let id = JobId::new();
        let err = f
            .machine
            .transition(&id, JobStatus::QaFailed, Actor::system(), None, JobPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::NotFound(found) if found == id));
    }

    #[tokio::test]
    async fn audit_failure_does_not_undo_the_status_write() {
        let f = fixture_with(InMemoryAuditLog::failing());
        let job = submitted(&f).await;

        let updated = f
            .machine
            .transition(&job.id, JobStatus::ReadyForReview, Actor::system(), None, JobPatch::new())
            .await
            .unwrap();

        assert_eq!(updated.status, JobStatus::ReadyForReview);
        assert!(f.audit.is_empty().await);
    }
}
