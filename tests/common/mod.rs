//! Shared wiring for the integration tests: every handler over in-memory
//! stores and one gateway built from mock providers.

#![allow(dead_code)]

use std::sync::Arc;

use tool_factory::adapters::ai::{AIGateway, MockAIProvider};
use tool_factory::adapters::memory::{InMemoryAuditLog, InMemoryDeployer, InMemoryJobRepository};
use tool_factory::application::pipeline::{FactoryPipeline, RevisionController, RevisionPolicy};
use tool_factory::application::{
    ApproveJobHandler, CancelJobHandler, GetJobHandler, JobLeases, JobStateMachine,
    RejectJobHandler, RequestRevisionHandler, RetryJobHandler, SubmitJobCommand, SubmitJobHandler,
};
use tool_factory::domain::job::{Actor, Job};
use tool_factory::domain::validation::SubstringMatcher;
use tool_factory::ports::AIProvider;

pub const SOURCE: &str = "# Pricing Power\n\n\
    Three levers decide what you can charge:\n\
    1. Anchor - set the reference price\n\
    2. Bundle - group offers\n\
    3. Scarcity - limit supply\n\n\
    Price elasticity and willingness to pay drive every lever.";

pub const ANALYSIS: &str = r#"{"summary": "Pricing levers module", "key_themes": ["pricing"]}"#;

pub const EXTRACTION: &str = r#"```json
{
    "module_title": "Pricing Power",
    "framework": {"name": "Three Levers", "items": [
        {"number": 1, "name": "Anchor", "definition": "Set the reference price", "tool_label": "Anchor Price"},
        {"number": 2, "name": "Bundle", "definition": "Group offers", "tool_label": "Bundle Offer"},
        {"number": 3, "name": "Scarcity", "definition": "Limit supply", "tool_label": "Scarcity Signal"}
    ]},
    "terminology": [
        {"term": "price elasticity", "definition": "Demand response to price"},
        {"term": "willingness to pay", "definition": "Maximum a buyer accepts"}
    ]
}
```"#;

pub const DESIGN: &str = r#"{
    "tool_name": "Lever Check",
    "tagline": "Test your pricing levers",
    "inputs": [
        {"id": "anchor", "label": "Anchor Price", "type": "number", "help_text": "Think about price elasticity"},
        {"id": "bundle", "label": "Bundle Offer", "type": "text", "help_text": "Estimate willingness to pay"},
        {"id": "scarcity", "label": "Scarcity Signal", "type": "select"}
    ]
}"#;

pub const HTML: &str = "<!DOCTYPE html><html><body><h1>Lever Check</h1>\
    <label>Anchor Price</label><label>Bundle Offer</label><label>Scarcity Signal</label>\
    <p>Mind price elasticity and willingness to pay.</p></body></html>";

/// A provider answering one full pass with valid responses.
pub fn scripted_provider(name: &str) -> MockAIProvider {
    with_clean_pass(MockAIProvider::named(name))
}

/// Queues one more full, valid pass on `provider`.
pub fn with_clean_pass(provider: MockAIProvider) -> MockAIProvider {
    provider
        .with_stage_response("content_analysis", ANALYSIS)
        .with_stage_response("extraction", EXTRACTION)
        .with_stage_response("design", DESIGN)
        .with_stage_response("generation", format!("Here you go:\n```html\n{}\n```", HTML))
}

pub struct Factory {
    pub repo: InMemoryJobRepository,
    pub audit: InMemoryAuditLog,
    pub deployer: InMemoryDeployer,
    pub leases: JobLeases,
    pub machine: Arc<JobStateMachine>,
    pub submit: SubmitJobHandler,
    pub retry: RetryJobHandler,
    pub revise: RequestRevisionHandler,
    pub approve: ApproveJobHandler,
    pub reject: RejectJobHandler,
    pub cancel: CancelJobHandler,
    pub get: GetJobHandler,
}

impl Factory {
    pub fn with_providers(primary: Option<MockAIProvider>, secondary: Option<MockAIProvider>) -> Self {
        let repo = InMemoryJobRepository::new();
        let audit = InMemoryAuditLog::new();
        let deployer = InMemoryDeployer::new("https://tools.example.com");
        let leases = JobLeases::new();

        let machine = Arc::new(JobStateMachine::new(
            Arc::new(repo.clone()),
            Arc::new(audit.clone()),
        ));
        let gateway = Arc::new(AIGateway::new(
            primary.map(|p| Arc::new(p) as Arc<dyn AIProvider>),
            secondary.map(|p| Arc::new(p) as Arc<dyn AIProvider>),
        ));
        let pipeline = Arc::new(FactoryPipeline::new(
            gateway,
            Arc::clone(&machine),
            Arc::new(SubstringMatcher),
            70,
        ));
        let controller = Arc::new(RevisionController::new(
            Arc::clone(&machine),
            Arc::clone(&pipeline),
            leases.clone(),
            RevisionPolicy::new(3),
        ));

        Self {
            submit: SubmitJobHandler::new(Arc::clone(&machine), pipeline, leases.clone()),
            retry: RetryJobHandler::new(Arc::clone(&controller)),
            revise: RequestRevisionHandler::new(controller),
            approve: ApproveJobHandler::new(
                Arc::clone(&machine),
                Arc::new(deployer.clone()),
                leases.clone(),
            ),
            reject: RejectJobHandler::new(Arc::clone(&machine)),
            cancel: CancelJobHandler::new(Arc::clone(&machine)),
            get: GetJobHandler::new(Arc::new(repo.clone()), Arc::new(audit.clone())),
            repo,
            audit,
            deployer,
            leases,
            machine,
        }
    }

    pub fn new(provider: MockAIProvider) -> Self {
        Self::with_providers(Some(provider), None)
    }

    /// Submits `SOURCE` and waits for the first pass.
    pub async fn submit_and_wait(&self) -> Job {
        let submitted = self
            .submit
            .handle(SubmitJobCommand {
                source_content: SOURCE.to_string(),
                title: None,
                submitted_by: Actor::human("author"),
            })
            .await
            .unwrap();
        submitted.pipeline.await.unwrap().unwrap()
    }
}
