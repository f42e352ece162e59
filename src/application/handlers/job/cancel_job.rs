//! CancelJobHandler - stops waiting on an in-flight pipeline pass or deploy.
//!
//! The job lands in `READY_FOR_REVIEW` when a generated artifact is on
//! record and in `QA_FAILED` otherwise. The background task is not aborted;
//! its late result finds the job no longer in the status it expects and is
//! discarded.

use std::sync::Arc;

use crate::application::JobStateMachine;
use crate::domain::foundation::JobId;
use crate::domain::job::{Actor, ArtifactKind, Job, JobError, JobPatch, JobStatus};

#[derive(Debug, Clone)]
pub struct CancelJobCommand {
    pub job_id: JobId,
    pub cancelled_by: Actor,
}

pub struct CancelJobHandler {
    state_machine: Arc<JobStateMachine>,
}

impl CancelJobHandler {
    pub fn new(state_machine: Arc<JobStateMachine>) -> Self {
        Self { state_machine }
    }

    pub async fn handle(&self, cmd: CancelJobCommand) -> Result<Job, JobError> {
        let job = self.state_machine.get(&cmd.job_id).await?;

        let has_artifact = self
            .state_machine
            .jobs()
            .get_artifact(&cmd.job_id, ArtifactKind::Html)
            .await?
            .is_some();
        let target = if has_artifact {
            JobStatus::ReadyForReview
        } else {
            JobStatus::QaFailed
        };

        if !job.status.is_cancellable() {
            return Err(JobError::invalid_transition(job.status, target));
        }

        let message = format!("Cancelled by {}", cmd.cancelled_by.name);
        self.state_machine
            .transition(
                &cmd.job_id,
                target,
                cmd.cancelled_by,
                Some("cancelled".to_string()),
                JobPatch::new().last_error(Some(message)),
            )
            .await
    }
}
