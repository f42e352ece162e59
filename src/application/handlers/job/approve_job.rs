//! ApproveJobHandler - moves a reviewed job to `DEPLOYING` and publishes it
//! in the background.
//!
//! Deploy outcome:
//! - success: `DEPLOYED` with the deployment location
//! - failure with an artifact on record: back to `READY_FOR_REVIEW`
//! - no artifact to publish: `DEPLOY_FAILED`
//! - job left `DEPLOYING` before the deploy started (cancelled): nothing is
//!   published and the job keeps its state

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::application::{JobLease, JobLeases, JobStateMachine};
use crate::domain::foundation::JobId;
use crate::domain::job::{Actor, ArtifactKind, Job, JobError, JobPatch, JobStatus};
use crate::ports::Deployer;

#[derive(Debug, Clone)]
pub struct ApproveJobCommand {
    pub job_id: JobId,
    pub approved_by: Actor,
}

#[derive(Debug)]
pub struct ApproveJobResult {
    /// The job in `DEPLOYING`.
    pub job: Job,
    /// Resolves with the job after the deploy attempt.
    pub deployment: JoinHandle<Result<Job, JobError>>,
}

pub struct ApproveJobHandler {
    state_machine: Arc<JobStateMachine>,
    deployer: Arc<dyn Deployer>,
    leases: JobLeases,
}

impl ApproveJobHandler {
    pub fn new(
        state_machine: Arc<JobStateMachine>,
        deployer: Arc<dyn Deployer>,
        leases: JobLeases,
    ) -> Self {
        Self {
            state_machine,
            deployer,
            leases,
        }
    }

    pub async fn handle(&self, cmd: ApproveJobCommand) -> Result<ApproveJobResult, JobError> {
        let lease = self.leases.acquire(cmd.job_id)?;

        let job = self
            .state_machine
            .transition(
                &cmd.job_id,
                JobStatus::Deploying,
                cmd.approved_by,
                Some("approved".to_string()),
                JobPatch::new(),
            )
            .await?;

        let state_machine = Arc::clone(&self.state_machine);
        let deployer = Arc::clone(&self.deployer);
        let deployment = tokio::spawn(deploy(state_machine, deployer, lease));

        Ok(ApproveJobResult { job, deployment })
    }
}

async fn deploy(
    state_machine: Arc<JobStateMachine>,
    deployer: Arc<dyn Deployer>,
    lease: JobLease,
) -> Result<Job, JobError> {
    let job_id = lease.job_id();
    let job = state_machine.get(&job_id).await?;
    if job.status != JobStatus::Deploying {
        tracing::warn!(
            job_id = %job_id,
            status = %job.status,
            "Job left DEPLOYING before publishing, skipping deploy"
        );
        return Err(JobError::invalid_transition(job.status, JobStatus::Deployed));
    }
    let actor = Actor::automated("deployer");

    let artifact = state_machine
        .jobs()
        .get_artifact(&job_id, ArtifactKind::Html)
        .await?;
    let Some(artifact) = artifact else {
        tracing::error!(job_id = %job_id, "No artifact to deploy");
        return state_machine
            .transition(
                &job_id,
                JobStatus::DeployFailed,
                actor,
                Some("no artifact to deploy".to_string()),
                JobPatch::new().last_error(Some("No generated artifact on record".to_string())),
            )
            .await;
    };

    match deployer.deploy(&job, &artifact).await {
        Ok(receipt) => {
            tracing::info!(job_id = %job_id, location = %receipt.location, "Job deployed");
            state_machine
                .transition(
                    &job_id,
                    JobStatus::Deployed,
                    actor,
                    None,
                    JobPatch::new()
                        .deployment_location(receipt.location)
                        .last_error(None),
                )
                .await
        }
        Err(err) => {
            tracing::error!(job_id = %job_id, error = %err, "Deploy failed, returning job to review");
            state_machine
                .transition(
                    &job_id,
                    JobStatus::ReadyForReview,
                    actor,
                    Some("deploy failed".to_string()),
                    JobPatch::new().last_error(Some(err.to_string())),
                )
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryDeployer, InMemoryJobRepository};
    use crate::domain::job::NewJob;
    use crate::ports::JobRepository;

    struct Fixture {
        machine: Arc<JobStateMachine>,
        repo: InMemoryJobRepository,
        leases: JobLeases,
    }

    impl Fixture {
        fn new() -> Self {
            let repo = InMemoryJobRepository::new();
            let machine = Arc::new(JobStateMachine::new(
                Arc::new(repo.clone()),
                Arc::new(InMemoryAuditLog::new()),
            ));
            Self {
                machine,
                repo,
                leases: JobLeases::new(),
            }
        }

        fn handler(&self, deployer: InMemoryDeployer) -> ApproveJobHandler {
            ApproveJobHandler::new(Arc::clone(&self.machine), Arc::new(deployer), self.leases.clone())
        }

        async fn reviewed_job(&self, with_artifact: bool) -> Job {
            let job = self
                .machine
                .create(NewJob::submission("# Levers\nbody", None).unwrap(), Actor::system())
                .await
                .unwrap();
            if with_artifact {
                self.repo
                    .save_artifact(&job.id, ArtifactKind::Html, "<html>tool</html>".to_string())
                    .await
                    .unwrap();
            }
            self.machine
                .transition(&job.id, JobStatus::ReadyForReview, Actor::system(), None, JobPatch::new())
                .await
                .unwrap()
        }
    }

    fn approve(job: &Job) -> ApproveJobCommand {
        ApproveJobCommand {
            job_id: job.id,
            approved_by: Actor::human("reviewer"),
        }
    }

    #[tokio::test]
    async fn successful_deploy_records_location() {
        let f = Fixture::new();
        let deployer = InMemoryDeployer::new("https://tools.example.com");
        let job = f.reviewed_job(true).await;

        let result = f.handler(deployer.clone()).handle(approve(&job)).await.unwrap();
        assert_eq!(result.job.status, JobStatus::Deploying);

        let deployed = result.deployment.await.unwrap().unwrap();
        assert_eq!(deployed.status, JobStatus::Deployed);
        assert_eq!(
            deployed.deployment_location,
            Some(format!("https://tools.example.com/{}", job.slug))
        );
        assert_eq!(deployer.deployed_artifact(&job.id).await.as_deref(), Some("<html>tool</html>"));
        assert!(!f.leases.is_held(&job.id));
    }

    #[tokio::test]
    async fn failed_deploy_returns_to_review() {
        let f = Fixture::new();
        let job = f.reviewed_job(true).await;

        let result = f
            .handler(InMemoryDeployer::failing("bucket unreachable"))
            .handle(approve(&job))
            .await
            .unwrap();

        let returned = result.deployment.await.unwrap().unwrap();
        assert_eq!(returned.status, JobStatus::ReadyForReview);
        assert!(returned.last_error.unwrap().contains("bucket unreachable"));
    }

    #[tokio::test]
    async fn missing_artifact_is_deploy_failed() {
        let f = Fixture::new();
        let job = f.reviewed_job(false).await;

        let result = f.handler(InMemoryDeployer::default()).handle(approve(&job)).await.unwrap();

        let failed = result.deployment.await.unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::DeployFailed);
    }

    #[tokio::test]
    async fn cancelled_deploy_publishes_nothing() {
        let f = Fixture::new();
        let deployer = InMemoryDeployer::new("https://tools.example.com");
        let job = f.reviewed_job(true).await;

        let result = f.handler(deployer.clone()).handle(approve(&job)).await.unwrap();
        f.machine
            .transition(&job.id, JobStatus::ReadyForReview, Actor::human("op"), None, JobPatch::new())
            .await
            .unwrap();

        let err = result.deployment.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            JobError::InvalidTransition { from: JobStatus::ReadyForReview, to: JobStatus::Deployed }
        ));
        assert_eq!(deployer.deployment_count().await, 0);
        let job = f.machine.get(&job.id).await.unwrap();
        assert_eq!(job.status, JobStatus::ReadyForReview);
        assert!(job.deployment_location.is_none());
        assert!(!f.leases.is_held(&job.id));
    }

    #[tokio::test]
    async fn approve_requires_review_status() {
        let f = Fixture::new();
        let job = f
            .machine
            .create(NewJob::submission("body", None).unwrap(), Actor::system())
            .await
            .unwrap();

        let err = f.handler(InMemoryDeployer::default()).handle(approve(&job)).await.unwrap_err();

        assert!(matches!(
            err,
            JobError::InvalidTransition { from: JobStatus::Processing, to: JobStatus::Deploying }
        ));
        assert!(!f.leases.is_held(&job.id));
    }
}
