//! Tool Factory runner
//!
//! Usage:
//!     tool-factory < module.md
//!
//! Reads course content from stdin, runs one submission to completion with
//! in-memory stores and prints the job with its audit history as JSON.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing_subscriber::fmt;

use tool_factory::adapters::ai::{
    AIGateway, AnthropicConfig, AnthropicProvider, OpenAIConfig, OpenAIProvider,
};
use tool_factory::adapters::memory::{InMemoryAuditLog, InMemoryJobRepository};
use tool_factory::application::pipeline::FactoryPipeline;
use tool_factory::application::{
    GetJobHandler, GetJobQuery, JobLeases, JobStateMachine, SubmitJobCommand, SubmitJobHandler,
};
use tool_factory::config::{AiConfig, AiProvider, AppConfig, LogConfig};
use tool_factory::domain::job::Actor;
use tool_factory::domain::validation::SubstringMatcher;
use tool_factory::ports::{AIError, AIProvider};

fn init_tracing(log: &LogConfig) {
    let builder = fmt().with_env_filter(log.env_filter()).with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn provider(ai: &AiConfig, kind: AiProvider) -> Result<Option<Arc<dyn AIProvider>>, AIError> {
    if !ai.has_key_for(kind) {
        return Ok(None);
    }
    let provider: Arc<dyn AIProvider> = match kind {
        AiProvider::OpenAI => {
            let mut config = OpenAIConfig::new(ai.openai_api_key.clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = &ai.openai_model {
                config = config.with_model(model.clone());
            }
            Arc::new(OpenAIProvider::new(config)?)
        }
        AiProvider::Anthropic => {
            let mut config = AnthropicConfig::new(ai.anthropic_api_key.clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = &ai.anthropic_model {
                config = config.with_model(model.clone());
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
    };
    Ok(Some(provider))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.log);
    config.validate()?;

    // Built once, shared by every trigger
    let gateway = Arc::new(AIGateway::new(
        provider(&config.ai, config.ai.primary_provider)?,
        provider(&config.ai, config.ai.secondary_provider())?,
    ));
    tracing::info!(providers = ?gateway.available_providers(), "AI gateway ready");

    let jobs = Arc::new(InMemoryJobRepository::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let state_machine = Arc::new(JobStateMachine::new(jobs.clone(), audit.clone()));
    let pipeline = Arc::new(FactoryPipeline::new(
        gateway,
        Arc::clone(&state_machine),
        Arc::new(SubstringMatcher),
        config.pipeline.quality_threshold,
    ));
    let submit = SubmitJobHandler::new(state_machine, pipeline, JobLeases::new());
    let get_job = GetJobHandler::new(jobs, audit);

    let mut source = String::new();
    tokio::io::stdin().read_to_string(&mut source).await?;

    let submitted = submit
        .handle(SubmitJobCommand {
            source_content: source,
            title: None,
            submitted_by: Actor::human("cli"),
        })
        .await?;
    tracing::info!(job_id = %submitted.job.id, slug = %submitted.job.slug, "Submitted");

    let job = submitted.pipeline.await??;
    let view = get_job.handle(GetJobQuery { job_id: job.id }).await?;
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
