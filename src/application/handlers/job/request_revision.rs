//! RequestRevisionHandler - re-runs the pipeline with reviewer notes.

use std::sync::Arc;

use crate::application::pipeline::{Rerun, RerunOutcome, RevisionController};
use crate::domain::foundation::{JobId, ValidationError};
use crate::domain::job::{Actor, JobError};

#[derive(Debug, Clone)]
pub struct RequestRevisionCommand {
    pub job_id: JobId,
    pub notes: String,
    pub requested_by: Actor,
}

pub struct RequestRevisionHandler {
    controller: Arc<RevisionController>,
}

impl RequestRevisionHandler {
    pub fn new(controller: Arc<RevisionController>) -> Self {
        Self { controller }
    }

    /// Accepted from `READY_FOR_REVIEW` and `QA_FAILED`. Blank notes are
    /// rejected.
    pub async fn handle(&self, cmd: RequestRevisionCommand) -> Result<RerunOutcome, JobError> {
        let notes = cmd.notes.trim();
        if notes.is_empty() {
            return Err(ValidationError::empty_field("notes").into());
        }

        self.controller
            .rerun(
                cmd.job_id,
                Rerun::Revision {
                    notes: notes.to_string(),
                },
                cmd.requested_by,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{AIGateway, MockAIProvider};
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryJobRepository};
    use crate::application::pipeline::{FactoryPipeline, RevisionPolicy};
    use crate::application::{JobLeases, JobStateMachine};
    use crate::domain::job::{JobPatch, JobStatus, NewJob};
    use crate::domain::validation::SubstringMatcher;
    use crate::ports::AIProvider;

    async fn setup() -> (RequestRevisionHandler, Arc<JobStateMachine>, JobId) {
        let machine = Arc::new(JobStateMachine::new(
            Arc::new(InMemoryJobRepository::new()),
            Arc::new(InMemoryAuditLog::new()),
        ));
        let gateway = Arc::new(AIGateway::new(
            Some(Arc::new(MockAIProvider::new()) as Arc<dyn AIProvider>),
            None,
        ));
        let pipeline = Arc::new(FactoryPipeline::new(
            gateway,
            Arc::clone(&machine),
            Arc::new(SubstringMatcher),
            70,
        ));
        let handler = RequestRevisionHandler::new(Arc::new(RevisionController::new(
            Arc::clone(&machine),
            pipeline,
            JobLeases::new(),
            RevisionPolicy::default(),
        )));
        let job = machine
            .create(NewJob::submission("body", None).unwrap(), Actor::system())
            .await
            .unwrap();
        machine
            .transition(&job.id, JobStatus::ReadyForReview, Actor::system(), None, JobPatch::new())
            .await
            .unwrap();
        (handler, machine, job.id)
    }

    #[tokio::test]
    async fn blank_notes_change_nothing() {
        let (handler, machine, job_id) = setup().await;

        let err = handler
            .handle(RequestRevisionCommand {
                job_id,
                notes: "  ".to_string(),
                requested_by: Actor::human("reviewer"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::ValidationFailed { .. }));
        assert_eq!(machine.get(&job_id).await.unwrap().status, JobStatus::ReadyForReview);
    }

    #[tokio::test]
    async fn revision_from_review_stores_trimmed_notes() {
        let (handler, _machine, job_id) = setup().await;

        let outcome = handler
            .handle(RequestRevisionCommand {
                job_id,
                notes: "  use plainer words \n".to_string(),
                requested_by: Actor::human("reviewer"),
            })
            .await
            .unwrap();

        assert_eq!(outcome.job().status, JobStatus::Processing);
        assert_eq!(outcome.job().revision_notes.as_deref(), Some("use plainer words"));
    }
}
