//! RetryJobHandler - re-runs the pipeline on the same input.

use std::sync::Arc;

use crate::application::pipeline::{Rerun, RerunOutcome, RevisionController};
use crate::domain::foundation::JobId;
use crate::domain::job::{Actor, JobError};

#[derive(Debug, Clone)]
pub struct RetryJobCommand {
    pub job_id: JobId,
    pub requested_by: Actor,
}

pub struct RetryJobHandler {
    controller: Arc<RevisionController>,
}

impl RetryJobHandler {
    pub fn new(controller: Arc<RevisionController>) -> Self {
        Self { controller }
    }

    /// Accepted from `QA_FAILED` and `DEPLOY_FAILED`.
    pub async fn handle(&self, cmd: RetryJobCommand) -> Result<RerunOutcome, JobError> {
        self.controller
            .rerun(cmd.job_id, Rerun::Retry, cmd.requested_by)
            .await
    }
}
