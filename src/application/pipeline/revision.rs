//! Revision and retry control.
//!
//! Both triggers re-run the pipeline for an existing job. `revision_count`
//! counts pipeline passes (the submission is pass 1); a trigger that would
//! start pass `max_attempts + 1` escalates the job instead.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::adapters::ai::AIGateway;
use crate::application::{JobLeases, JobStateMachine};
use crate::domain::foundation::JobId;
use crate::domain::job::{Actor, ArtifactKind, Job, JobError, JobPatch, JobStatus};
use crate::domain::pipeline::RevisionNotes;

use super::{FactoryPipeline, PipelineRequest};

/// Default pass limit before escalation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What the next trigger on a job is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptDecision {
    /// Start pass number `attempt`.
    Proceed { attempt: u32 },
    /// `attempts` passes already ran; hand the job to a human.
    Escalate { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionPolicy {
    max_attempts: u32,
}

impl RevisionPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn decide(&self, job: &Job) -> AttemptDecision {
        let next = job.revision_count.saturating_add(1);
        if next > self.max_attempts {
            AttemptDecision::Escalate {
                attempts: job.revision_count,
            }
        } else {
            AttemptDecision::Proceed { attempt: next }
        }
    }
}

impl Default for RevisionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Which trigger is re-running the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rerun {
    /// Same input as the failed pass.
    Retry,
    /// Reviewer feedback applied on top of the previous output.
    Revision { notes: String },
}

impl Rerun {
    fn accepts(&self, status: JobStatus) -> bool {
        match self {
            Rerun::Retry => status.accepts_retry(),
            Rerun::Revision { .. } => status.accepts_revision(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Rerun::Retry => "retry",
            Rerun::Revision { .. } => "revision",
        }
    }
}

/// Result of a rerun trigger.
#[derive(Debug)]
pub enum RerunOutcome {
    /// The job is `PROCESSING`; the handle resolves when the pass finishes.
    Started {
        job: Job,
        handle: JoinHandle<Result<Job, JobError>>,
    },
    /// The pass limit was reached and the job is `ESCALATED`.
    Escalated(Job),
}

impl RerunOutcome {
    pub fn job(&self) -> &Job {
        match self {
            RerunOutcome::Started { job, .. } => job,
            RerunOutcome::Escalated(job) => job,
        }
    }
}

pub struct RevisionController {
    state_machine: Arc<JobStateMachine>,
    pipeline: Arc<FactoryPipeline>,
    gateway: Arc<AIGateway>,
    leases: JobLeases,
    policy: RevisionPolicy,
}

impl RevisionController {
    pub fn new(
        state_machine: Arc<JobStateMachine>,
        pipeline: Arc<FactoryPipeline>,
        leases: JobLeases,
        policy: RevisionPolicy,
    ) -> Self {
        let gateway = Arc::clone(pipeline.gateway());
        Self {
            state_machine,
            pipeline,
            gateway,
            leases,
            policy,
        }
    }

    pub fn policy(&self) -> RevisionPolicy {
        self.policy
    }

    /// Re-runs the pipeline for `job_id`, or escalates past the pass limit.
    ///
    /// # Errors
    ///
    /// - `NoProviderAvailable` if no AI provider can serve the pass
    /// - `Busy` if a pass is already in flight for the job
    /// - `NotFound` if the job doesn't exist
    /// - `InvalidTransition` if the job's status doesn't accept the trigger
    pub async fn rerun(
        &self,
        job_id: JobId,
        rerun: Rerun,
        actor: Actor,
    ) -> Result<RerunOutcome, JobError> {
        // 1. Fail fast before any state change
        if self.gateway.ensure_available().is_err() {
            return Err(JobError::NoProviderAvailable);
        }
        let lease = self.leases.acquire(job_id)?;

        // 2. Check the trigger against the current status
        let job = self.state_machine.get(&job_id).await?;
        if !rerun.accepts(job.status) {
            return Err(JobError::invalid_transition(job.status, JobStatus::Processing));
        }

        // 3. Escalate past the pass limit
        let attempt = match self.policy.decide(&job) {
            AttemptDecision::Escalate { attempts } => {
                tracing::warn!(
                    job_id = %job_id,
                    attempts,
                    max_attempts = self.policy.max_attempts,
                    trigger = rerun.label(),
                    "Pass limit reached, escalating"
                );
                let job = self
                    .state_machine
                    .transition(
                        &job_id,
                        JobStatus::Escalated,
                        actor,
                        Some(format!("{} passes without approval", attempts)),
                        JobPatch::new(),
                    )
                    .await?;
                return Ok(RerunOutcome::Escalated(job));
            }
            AttemptDecision::Proceed { attempt } => attempt,
        };

        // 4. Resolve the revision context for the next pass
        let notes = match &rerun {
            Rerun::Retry => job.revision_notes.clone(),
            Rerun::Revision { notes } => Some(notes.clone()),
        };
        let revision = match &notes {
            Some(notes) => Some(RevisionNotes {
                notes: notes.clone(),
                prior_output: self.prior_output(&job_id).await,
            }),
            None => None,
        };

        // 5. Back to PROCESSING with the pass counted
        let job = self
            .state_machine
            .transition(
                &job_id,
                JobStatus::Processing,
                actor,
                Some(rerun.label().to_string()),
                JobPatch::new()
                    .revision_count(attempt)
                    .revision_notes(notes)
                    .last_error(None),
            )
            .await?;

        tracing::info!(job_id = %job_id, attempt, trigger = rerun.label(), "Pipeline pass scheduled");

        // 6. Run in the background
        let request = PipelineRequest::new(job_id, job.source_content.clone()).with_revision(revision);
        let handle = self.pipeline.spawn(lease, request);
        Ok(RerunOutcome::Started { job, handle })
    }

    async fn prior_output(&self, job_id: &JobId) -> Option<String> {
        match self
            .state_machine
            .jobs()
            .get_artifact(job_id, ArtifactKind::Html)
            .await
        {
            Ok(artifact) => artifact,
            Err(err) => {
                tracing::warn!(job_id = %job_id, error = %err, "Failed to load previous artifact");
                None
            }
        }
    }
}
