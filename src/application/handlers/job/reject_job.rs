//! RejectJobHandler - terminal rejection by a reviewer.

use std::sync::Arc;

use crate::application::JobStateMachine;
use crate::domain::foundation::{JobId, ValidationError};
use crate::domain::job::{Actor, Job, JobError, JobPatch, JobStatus};

#[derive(Debug, Clone)]
pub struct RejectJobCommand {
    pub job_id: JobId,
    pub reason: String,
    pub rejected_by: Actor,
}

pub struct RejectJobHandler {
    state_machine: Arc<JobStateMachine>,
}

impl RejectJobHandler {
    pub fn new(state_machine: Arc<JobStateMachine>) -> Self {
        Self { state_machine }
    }

    /// Accepted from `READY_FOR_REVIEW`, `QA_FAILED`, `DEPLOY_FAILED` and
    /// `ESCALATED`. The reason is required and lands in the audit entry.
    pub async fn handle(&self, cmd: RejectJobCommand) -> Result<Job, JobError> {
        let reason = cmd.reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::empty_field("reason").into());
        }

        self.state_machine
            .transition(
                &cmd.job_id,
                JobStatus::Rejected,
                cmd.rejected_by,
                Some(reason.to_string()),
                JobPatch::new(),
            )
            .await
    }
}
