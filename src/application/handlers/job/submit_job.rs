//! SubmitJobHandler - Command handler for new submissions.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::application::pipeline::{FactoryPipeline, PipelineRequest};
use crate::application::{JobLeases, JobStateMachine};
use crate::domain::job::{Actor, Job, JobError, NewJob};

/// Command to submit source content.
#[derive(Debug, Clone)]
pub struct SubmitJobCommand {
    pub source_content: String,
    pub title: Option<String>,
    pub submitted_by: Actor,
}

/// Result of a successful submission.
#[derive(Debug)]
pub struct SubmitJobResult {
    /// The job as created, in `PROCESSING`.
    pub job: Job,
    /// Resolves with the job after the first pipeline pass.
    pub pipeline: JoinHandle<Result<Job, JobError>>,
}

pub struct SubmitJobHandler {
    state_machine: Arc<JobStateMachine>,
    pipeline: Arc<FactoryPipeline>,
    leases: JobLeases,
}

impl SubmitJobHandler {
    pub fn new(
        state_machine: Arc<JobStateMachine>,
        pipeline: Arc<FactoryPipeline>,
        leases: JobLeases,
    ) -> Self {
        Self {
            state_machine,
            pipeline,
            leases,
        }
    }

    pub async fn handle(&self, cmd: SubmitJobCommand) -> Result<SubmitJobResult, JobError> {
        // 1. No job is created without a provider
        if self.pipeline.gateway().ensure_available().is_err() {
            tracing::error!("Submission refused: no AI provider available");
            return Err(JobError::NoProviderAvailable);
        }

        // 2. Validate and lease
        let new_job = NewJob::submission(cmd.source_content, cmd.title)?;
        let lease = self.leases.acquire(new_job.id)?;

        // 3. Create in PROCESSING
        let job = self.state_machine.create(new_job, cmd.submitted_by).await?;

        // 4. First pass in the background
        let request = PipelineRequest::new(job.id, job.source_content.clone());
        let pipeline = self.pipeline.spawn(lease, request);

        Ok(SubmitJobResult { job, pipeline })
    }
}
