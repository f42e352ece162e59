//! FactoryPipeline - content analysis through quality gate for one job.
//!
//! ```text
//! ContentAnalysis -> Extraction -> ExtractionValidation -> Design
//!   -> DesignValidation -> ContextBuild -> Generation -> OutputValidation
//!   -> QualityGate
//! ```
//!
//! Each stage advances or halts the run. A blocking validation result, an
//! unparseable extraction/design/generation response or a provider error
//! halts it; warnings are recorded and the run continues. An unparseable
//! content-analysis response is not fatal: generic insights stand in.
//!
//! Nothing is written to the job while stages run. [`FactoryPipeline::run`]
//! finishes with the artifact writes (markup when produced, even on failure,
//! plus extraction and design JSON) and exactly one transition out of
//! `PROCESSING`. A job that left `PROCESSING` meanwhile gets neither.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::adapters::ai::AIGateway;
use crate::application::{JobLease, JobStateMachine};
use crate::domain::builder::BuilderContext;
use crate::domain::foundation::JobId;
use crate::domain::job::{Actor, ArtifactKind, Job, JobError, JobPatch, JobStatus, QaReport};
use crate::domain::knowledge::{ContentInsights, CourseAnalysis, ToolDesign};
use crate::domain::pipeline::{
    content_analysis_prompt, design_prompt, extract_html, extraction_prompt, generation_prompt,
    parse_json, PipelineStage, RevisionNotes, StagePrompt,
};
use crate::domain::validation::{
    validate_design, validate_extraction, validate_output, IssueCode, LabelMatcher,
    ValidationIssue, ValidationResult, ValidationStage,
};
use crate::ports::{CompletionRequest, MessageRole, RequestMetadata};

/// Default minimum quality score for a passing run.
pub const DEFAULT_QUALITY_THRESHOLD: u32 = 70;

/// Input of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub job_id: JobId,
    pub source_content: String,
    /// Present on revision passes; goes first in every stage prompt.
    pub revision: Option<RevisionNotes>,
}

impl PipelineRequest {
    pub fn new(job_id: JobId, source_content: impl Into<String>) -> Self {
        Self {
            job_id,
            source_content: source_content.into(),
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: Option<RevisionNotes>) -> Self {
        self.revision = revision;
        self
    }
}

/// What a pass produced, before it is written back to the job.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Generated markup, kept even when the run failed.
    pub html: Option<String>,
    /// Extraction JSON, when the extraction response parsed.
    pub extraction: Option<String>,
    /// Design JSON, when the design response parsed.
    pub design: Option<String>,
    pub report: QaReport,
    /// Human-readable failure reason; provider errors are kept verbatim.
    pub error: Option<String>,
    pub insights: ContentInsights,
}

impl PipelineOutcome {
    pub fn target_status(&self) -> JobStatus {
        if self.report.passed {
            JobStatus::ReadyForReview
        } else {
            JobStatus::QaFailed
        }
    }
}

/// Why a run stopped early.
struct Halt {
    stage: PipelineStage,
    error: String,
}

impl Halt {
    fn new(stage: PipelineStage, error: impl Into<String>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

/// Accumulated state of one pass.
#[derive(Default)]
struct Run {
    results: Vec<ValidationResult>,
    completed: Vec<PipelineStage>,
    insights: Option<ContentInsights>,
    extraction: Option<String>,
    design: Option<String>,
    html: Option<String>,
}

impl Run {
    fn complete(&mut self, stage: PipelineStage) {
        self.completed.push(stage);
    }

    /// Records a validation result, halting on blocking issues.
    fn check(&mut self, stage: PipelineStage, result: ValidationResult) -> Result<(), Halt> {
        for note in &result.notes {
            tracing::info!(stage = %stage, note = %note, "Validation note");
        }
        let passed = result.passed;
        let error_count = result.errors.len();
        let warning_count = result.warnings.len();
        self.results.push(result);
        tracing::info!(stage = %stage, passed, errors = error_count, warnings = warning_count, "Validation finished");

        if passed {
            self.complete(stage);
            Ok(())
        } else {
            Err(Halt::new(
                stage,
                format!("{} failed with {} blocking issue(s)", stage, error_count),
            ))
        }
    }

    /// Records an unparseable response as a generation-stage finding.
    fn unparseable(&mut self, stage: PipelineStage, reason: impl Into<String>) -> Halt {
        let reason = reason.into();
        self.results.push(ValidationResult::from_issues(
            ValidationStage::Generation,
            vec![ValidationIssue::error(
                IssueCode::UnparseableResponse,
                stage.as_str(),
                format!("{} response could not be parsed: {}", stage, reason),
            )],
        ));
        Halt::new(stage, format!("{} response could not be parsed: {}", stage, reason))
    }
}

/// The factory pipeline, shared by every trigger.
pub struct FactoryPipeline {
    gateway: Arc<AIGateway>,
    state_machine: Arc<JobStateMachine>,
    matcher: Arc<dyn LabelMatcher>,
    quality_threshold: u32,
}

impl FactoryPipeline {
    pub fn new(
        gateway: Arc<AIGateway>,
        state_machine: Arc<JobStateMachine>,
        matcher: Arc<dyn LabelMatcher>,
        quality_threshold: u32,
    ) -> Self {
        Self {
            gateway,
            state_machine,
            matcher,
            quality_threshold,
        }
    }

    pub fn gateway(&self) -> &Arc<AIGateway> {
        &self.gateway
    }

    /// Runs the pass in the background, holding `lease` until it finishes.
    pub fn spawn(
        self: &Arc<Self>,
        lease: JobLease,
        request: PipelineRequest,
    ) -> JoinHandle<Result<Job, JobError>> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let _lease = lease;
            pipeline.run(request).await
        })
    }

    /// Executes the pass and writes its outcome to the job.
    pub async fn run(&self, request: PipelineRequest) -> Result<Job, JobError> {
        let outcome = self.execute(&request).await;
        self.finalize(request.job_id, outcome).await
    }

    /// Executes every stage without touching the job or its artifacts.
    pub async fn execute(&self, request: &PipelineRequest) -> PipelineOutcome {
        tracing::info!(
            job_id = %request.job_id,
            revision = request.revision.is_some(),
            "Pipeline started"
        );

        let mut run = Run::default();
        let halted = self.stages(request, &mut run).await.err();
        let insights = run.insights.take().unwrap_or_else(ContentInsights::generic);

        match halted {
            None => {
                let report = QaReport::gate(&run.results, run.completed, self.quality_threshold);
                let error = if report.passed {
                    None
                } else {
                    Some(report.error_summary().unwrap_or_else(|| {
                        format!(
                            "Quality score {} is below the threshold of {}",
                            report.score, self.quality_threshold
                        )
                    }))
                };
                tracing::info!(
                    job_id = %request.job_id,
                    score = report.score,
                    passed = report.passed,
                    "Quality gate evaluated"
                );
                PipelineOutcome {
                    html: run.html,
                    extraction: run.extraction,
                    design: run.design,
                    report,
                    error,
                    insights,
                }
            }
            Some(halt) => {
                tracing::warn!(
                    job_id = %request.job_id,
                    stage = %halt.stage,
                    error = %halt.error,
                    "Pipeline halted"
                );
                let report = QaReport::halted(&run.results, run.completed, halt.stage);
                PipelineOutcome {
                    html: run.html,
                    extraction: run.extraction,
                    design: run.design,
                    report,
                    error: Some(halt.error),
                    insights,
                }
            }
        }
    }

    async fn stages(&self, request: &PipelineRequest, run: &mut Run) -> Result<(), Halt> {
        let job_id = request.job_id;
        let revision = request.revision.as_ref();
        let source = request.source_content.as_str();

        // Content analysis
        let stage = PipelineStage::ContentAnalysis;
        let response = self
            .call(job_id, stage, content_analysis_prompt(source, revision))
            .await?;
        let insights = parse_json::<ContentInsights>(&response).unwrap_or_else(|err| {
            tracing::warn!(job_id = %job_id, error = %err, "Content analysis unparseable, using generic insights");
            ContentInsights::generic()
        });
        run.insights = Some(insights.clone());
        run.complete(stage);

        // Extraction
        let stage = PipelineStage::Extraction;
        let response = self
            .call(job_id, stage, extraction_prompt(source, &insights, revision))
            .await?;
        let analysis: CourseAnalysis =
            parse_json(&response).map_err(|err| run.unparseable(stage, err.to_string()))?;
        let extraction_json = serde_json::to_string_pretty(&analysis).unwrap_or_default();
        run.extraction = Some(extraction_json.clone());
        run.complete(stage);

        let extraction_check = validate_extraction(&analysis);
        run.check(PipelineStage::ExtractionValidation, extraction_check.clone())?;

        // Design
        let stage = PipelineStage::Design;
        let response = self
            .call(job_id, stage, design_prompt(&extraction_json, &insights, revision))
            .await?;
        let design: ToolDesign =
            parse_json(&response).map_err(|err| run.unparseable(stage, err.to_string()))?;
        run.design = Some(serde_json::to_string_pretty(&design).unwrap_or_default());
        run.complete(stage);

        let design_check = validate_design(&analysis, &design, self.matcher.as_ref());
        run.check(PipelineStage::DesignValidation, design_check.clone())?;

        // Context build
        let stage = PipelineStage::ContextBuild;
        let ctx = BuilderContext::assemble(
            &analysis,
            &design,
            &extraction_check,
            &design_check,
            self.matcher.as_ref(),
        )
        .map_err(|err| Halt::new(stage, err.to_string()))?;
        run.complete(stage);

        // Generation
        let stage = PipelineStage::Generation;
        let response = self
            .call(job_id, stage, generation_prompt(&ctx, source, revision))
            .await?;
        let html = extract_html(&response).map_err(|err| run.unparseable(stage, err.to_string()))?;
        run.html = Some(html.clone());
        run.complete(stage);

        run.check(PipelineStage::OutputValidation, validate_output(&html, &ctx))?;

        run.complete(PipelineStage::QualityGate);
        Ok(())
    }

    async fn call(
        &self,
        job_id: JobId,
        stage: PipelineStage,
        prompt: StagePrompt,
    ) -> Result<String, Halt> {
        let request = CompletionRequest::new(RequestMetadata::for_stage(job_id, stage.as_str()))
            .with_system_prompt(prompt.system)
            .with_message(MessageRole::User, prompt.user);

        let response = self
            .gateway
            .complete_with_fallback(request, stage.as_str())
            .await
            .map_err(|err| Halt::new(stage, err.to_string()))?;

        if response.used_fallback {
            tracing::warn!(
                job_id = %job_id,
                stage = %stage,
                provider = %response.provider,
                original_provider = ?response.original_provider,
                "Stage served by fallback provider"
            );
        }
        Ok(response.content)
    }

    async fn save_intermediate(&self, job_id: JobId, kind: ArtifactKind, content: String) {
        if let Err(err) = self
            .state_machine
            .jobs()
            .save_artifact(&job_id, kind, content)
            .await
        {
            tracing::warn!(job_id = %job_id, kind = %kind, error = %err, "Failed to save artifact");
        }
    }

    /// Writes the artifacts and moves the job out of `PROCESSING`. A job
    /// that left `PROCESSING` meanwhile (cancelled) keeps its state and
    /// artifacts; the result is discarded.
    ///
    /// A passing run whose markup cannot be stored ends in `QA_FAILED`.
    async fn finalize(&self, job_id: JobId, mut outcome: PipelineOutcome) -> Result<Job, JobError> {
        let job = self.state_machine.get(&job_id).await?;
        if job.status != JobStatus::Processing {
            tracing::warn!(
                job_id = %job_id,
                status = %job.status,
                "Job left PROCESSING during the run, discarding result"
            );
            return Err(JobError::invalid_transition(job.status, outcome.target_status()));
        }

        if let Some(extraction) = outcome.extraction.take() {
            self.save_intermediate(job_id, ArtifactKind::Extraction, extraction)
                .await;
        }
        if let Some(design) = outcome.design.take() {
            self.save_intermediate(job_id, ArtifactKind::Design, design)
                .await;
        }

        let mut error = outcome.error.clone();
        if let Some(html) = outcome.html.clone() {
            if let Err(err) = self
                .state_machine
                .jobs()
                .save_artifact(&job_id, ArtifactKind::Html, html)
                .await
            {
                tracing::error!(job_id = %job_id, error = %err, "Failed to save generated markup");
                outcome.report.passed = false;
                error.get_or_insert_with(|| format!("Generated markup could not be stored: {}", err));
            }
        }

        let target = outcome.target_status();
        let reason = match target {
            JobStatus::ReadyForReview => format!("quality score {}", outcome.report.score),
            _ => error.clone().unwrap_or_else(|| "pipeline failed".to_string()),
        };
        let patch = JobPatch::new()
            .qa_report(outcome.report)
            .last_error(error);

        self.state_machine
            .transition(&job_id, target, Actor::system(), Some(reason), patch)
            .await
    }
}
