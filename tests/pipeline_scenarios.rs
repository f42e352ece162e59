//! End-to-end scenarios over the trigger handlers, with mock providers and
//! in-memory stores.

mod common;

use std::time::Duration;

use common::{scripted_provider, with_clean_pass, Factory, HTML, SOURCE};
use tool_factory::adapters::ai::MockAIProvider;
use tool_factory::application::pipeline::RerunOutcome;
use tool_factory::application::{
    ApproveJobCommand, CancelJobCommand, GetJobQuery, RejectJobCommand, RequestRevisionCommand,
    RetryJobCommand, SubmitJobCommand,
};
use tool_factory::domain::job::{Actor, ArtifactKind, JobError, JobStatus};
use tool_factory::domain::pipeline::{PipelineStage, REVISION_HEADING};
use tool_factory::domain::validation::IssueCode;
use tool_factory::ports::JobRepository;

#[tokio::test]
async fn clean_submission_reaches_review_and_deploys() {
    let factory = Factory::new(scripted_provider("primary"));

    let job = factory.submit_and_wait().await;

    assert_eq!(job.status, JobStatus::ReadyForReview);
    let report = job.qa_report.clone().unwrap();
    assert!(report.passed);
    assert_eq!(report.score, 100);
    assert!(report.findings.is_empty());
    assert_eq!(report.stages_completed.last(), Some(&PipelineStage::QualityGate));
    assert_eq!(
        factory.repo.get_artifact(&job.id, ArtifactKind::Html).await.unwrap().as_deref(),
        Some(HTML)
    );

    let approved = factory
        .approve
        .handle(ApproveJobCommand {
            job_id: job.id,
            approved_by: Actor::human("reviewer"),
        })
        .await
        .unwrap();
    let deployed = approved.deployment.await.unwrap().unwrap();

    assert_eq!(deployed.status, JobStatus::Deployed);
    assert_eq!(factory.deployer.deployment_count().await, 1);

    let view = factory.get.handle(GetJobQuery { job_id: job.id }).await.unwrap();
    let path: Vec<JobStatus> = view.history.iter().map(|e| e.to_status).collect();
    assert_eq!(
        path,
        vec![
            JobStatus::Processing,
            JobStatus::ReadyForReview,
            JobStatus::Deploying,
            JobStatus::Deployed,
        ]
    );
}

#[tokio::test]
async fn revision_notes_precede_source_in_generation_prompt() {
    // First pass: extraction comes back as prose
    let provider = MockAIProvider::new()
        .with_stage_response("content_analysis", "{}")
        .with_stage_response("extraction", "I found no framework.");
    let provider = with_clean_pass(provider);
    let factory = Factory::new(provider.clone());

    let failed = factory.submit_and_wait().await;
    assert_eq!(failed.status, JobStatus::QaFailed);
    assert!(failed.qa_report.unwrap().has(IssueCode::UnparseableResponse));
    assert!(provider.calls_for_stage("generation").is_empty());

    let outcome = factory
        .revise
        .handle(RequestRevisionCommand {
            job_id: failed.id,
            notes: "focus on the second framework item".to_string(),
            requested_by: Actor::human("reviewer"),
        })
        .await
        .unwrap();
    assert_eq!(outcome.job().status, JobStatus::Processing);
    assert_eq!(outcome.job().revision_count, 2);
    let RerunOutcome::Started { handle, .. } = outcome else {
        panic!("expected the revision pass to start");
    };
    let revised = handle.await.unwrap().unwrap();
    assert_eq!(revised.status, JobStatus::ReadyForReview);

    let generation = provider.calls_for_stage("generation");
    assert_eq!(generation.len(), 1);
    let prompt = generation[0].user_prompt();
    let heading = prompt.find(REVISION_HEADING).unwrap();
    let notes = prompt.find("focus on the second framework item").unwrap();
    let source = prompt.find(SOURCE).unwrap();
    assert!(heading < notes && notes < source);
}

#[tokio::test]
async fn failing_passes_escalate_at_the_limit() {
    // Unscripted mock answers "Mock response" to every stage
    let factory = Factory::new(MockAIProvider::new());
    let job = factory.submit_and_wait().await;
    assert_eq!(job.status, JobStatus::QaFailed);

    for expected_count in [2, 3] {
        let outcome = factory
            .retry
            .handle(RetryJobCommand {
                job_id: job.id,
                requested_by: Actor::human("op"),
            })
            .await
            .unwrap();
        let RerunOutcome::Started { handle, .. } = outcome else {
            panic!("pass {} should have started", expected_count);
        };
        let after = handle.await.unwrap().unwrap();
        assert_eq!(after.status, JobStatus::QaFailed);
        assert_eq!(after.revision_count, expected_count);
    }

    let outcome = factory
        .retry
        .handle(RetryJobCommand {
            job_id: job.id,
            requested_by: Actor::human("op"),
        })
        .await
        .unwrap();
    assert!(matches!(outcome, RerunOutcome::Escalated(_)));
    assert_eq!(outcome.job().status, JobStatus::Escalated);
    assert_eq!(outcome.job().revision_count, 3);

    let rejected = factory
        .reject
        .handle(RejectJobCommand {
            job_id: job.id,
            reason: "needs a human rewrite".to_string(),
            rejected_by: Actor::human("lead"),
        })
        .await
        .unwrap();
    assert_eq!(rejected.status, JobStatus::Rejected);
}

#[tokio::test]
async fn in_flight_job_is_busy_and_cancel_discards_the_late_result() {
    let provider = scripted_provider("slow").with_delay(Duration::from_millis(50));
    let factory = Factory::new(provider);

    let submitted = factory
        .submit
        .handle(SubmitJobCommand {
            source_content: SOURCE.to_string(),
            title: None,
            submitted_by: Actor::human("author"),
        })
        .await
        .unwrap();
    let job_id = submitted.job.id;
    assert!(factory.leases.is_held(&job_id));

    let cancelled = factory
        .cancel
        .handle(CancelJobCommand {
            job_id,
            cancelled_by: Actor::human("op"),
        })
        .await
        .unwrap();
    assert_eq!(cancelled.status, JobStatus::QaFailed);

    let err = factory
        .retry
        .handle(RetryJobCommand {
            job_id,
            requested_by: Actor::human("op"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Busy(busy) if busy == job_id));

    let late = submitted.pipeline.await.unwrap();
    assert!(late.is_err());
    assert!(!factory.leases.is_held(&job_id));

    let job = factory.get.handle(GetJobQuery { job_id }).await.unwrap().job;
    assert_eq!(job.status, JobStatus::QaFailed);
    assert!(factory.repo.get_artifact(&job_id, ArtifactKind::Html).await.unwrap().is_none());
}

#[tokio::test]
async fn cancel_mid_pass_leaves_no_intermediate_artifacts() {
    let provider = scripted_provider("slow").with_delay(Duration::from_millis(20));
    let factory = Factory::new(provider.clone());

    let submitted = factory
        .submit
        .handle(SubmitJobCommand {
            source_content: SOURCE.to_string(),
            title: None,
            submitted_by: Actor::human("author"),
        })
        .await
        .unwrap();
    let job_id = submitted.job.id;

    // The design call starts only once extraction has been parsed.
    while provider.calls_for_stage("design").is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    factory
        .cancel
        .handle(CancelJobCommand {
            job_id,
            cancelled_by: Actor::human("op"),
        })
        .await
        .unwrap();

    assert!(submitted.pipeline.await.unwrap().is_err());
    for kind in [ArtifactKind::Extraction, ArtifactKind::Design, ArtifactKind::Html] {
        assert!(
            factory.repo.get_artifact(&job_id, kind).await.unwrap().is_none(),
            "{kind} artifact written after cancel"
        );
    }
}

#[tokio::test]
async fn cancel_after_approval_publishes_nothing() {
    let factory = Factory::new(scripted_provider("primary"));
    let job = factory.submit_and_wait().await;
    assert_eq!(job.status, JobStatus::ReadyForReview);

    let approved = factory
        .approve
        .handle(ApproveJobCommand {
            job_id: job.id,
            approved_by: Actor::human("reviewer"),
        })
        .await
        .unwrap();
    let cancelled = factory
        .cancel
        .handle(CancelJobCommand {
            job_id: job.id,
            cancelled_by: Actor::human("op"),
        })
        .await
        .unwrap();
    assert_eq!(cancelled.status, JobStatus::ReadyForReview);

    assert!(approved.deployment.await.unwrap().is_err());
    assert_eq!(factory.deployer.deployment_count().await, 0);
    let job = factory.get.handle(GetJobQuery { job_id: job.id }).await.unwrap().job;
    assert_eq!(job.status, JobStatus::ReadyForReview);
    assert!(job.deployment_location.is_none());
}

#[tokio::test]
async fn submission_without_providers_creates_nothing() {
    let factory = Factory::with_providers(None, None);

    let err = factory
        .submit
        .handle(SubmitJobCommand {
            source_content: SOURCE.to_string(),
            title: None,
            submitted_by: Actor::human("author"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::NoProviderAvailable));
    assert_eq!(factory.repo.job_count().await, 0);
    assert!(factory.audit.is_empty().await);
}
