//! Stage prompts.
//!
//! Every user prompt is assembled by [`PromptBuilder`], which always puts
//! human revision notes first, ahead of prior output and source content.

use crate::domain::builder::BuilderContext;
use crate::domain::knowledge::ContentInsights;

/// Heading of the revision block. Nothing in a prompt precedes it.
pub const REVISION_HEADING: &str = "## REVISION REQUEST (HIGHEST PRIORITY)";

const REVISION_PREAMBLE: &str =
    "A human reviewer asked for the changes below. They override every other instruction and all source material that follows.";

pub const CONTENT_ANALYSIS_SYSTEM: &str = "You analyse course content. Reply with JSON only: \
{\"summary\": string, \"key_themes\": [string], \"audience\": string}.";

pub const EXTRACTION_SYSTEM: &str = "You extract structured knowledge from course content. Reply with JSON only, using the keys \
module_title, framework {name, items [{number, name, definition, tool_label}]}, terminology [{term, definition, usage_hint}], \
expert_quotes [{quote, source}], decision_criteria {go [string], no_go [string]}, legacy_steps [string], formulas [{name, expression}], \
reflection_questions [string], checklist [string]. Copy names and terms verbatim from the source.";

pub const DESIGN_SYSTEM: &str = "You design interactive decision tools. Reply with JSON only, using the keys \
tool_name, tagline, inputs [{id, label, type, help_text, placeholder, reflection_question}], \
output {thresholds [{label, min, max, verdict}], formula_description, checklist [string]}, \
deep_content {quote_index, quote_placement}, and optionally phases [{id, name, input_ids, branch_conditions, summary_template}] with default_path. \
Every framework item needs an input whose label contains the item's tool label or name.";

pub const GENERATION_SYSTEM: &str = "You build a single self-contained HTML file for an interactive decision tool. \
Use every framework item label verbatim, use the listed terminology, and show the expert quote word for word. \
Slides are stacked with position: absolute and switched with .active and .past classes; never lay slides out on a wide flex track moved with translateX. \
Reply with the HTML document only.";

/// Revision context carried into a pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionNotes {
    pub notes: String,
    /// Artifact from the previous pass, if any.
    pub prior_output: Option<String>,
}

/// System and user prompt for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    pub system: &'static str,
    pub user: String,
}

/// Ordered user-prompt sections with the revision block pinned first.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    revision: Option<String>,
    prior_output: Option<String>,
    sections: Vec<(String, String)>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(mut self, revision: Option<&RevisionNotes>) -> Self {
        if let Some(rev) = revision {
            if !rev.notes.trim().is_empty() {
                self.revision = Some(rev.notes.trim().to_string());
            }
            self.prior_output = rev.prior_output.clone();
        }
        self
    }

    pub fn section(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push((heading.into(), body.into()));
        self
    }

    pub fn build(self) -> String {
        let mut parts = Vec::with_capacity(self.sections.len() + 2);
        if let Some(notes) = self.revision {
            parts.push(format!("{}\n{}\n\n{}", REVISION_HEADING, REVISION_PREAMBLE, notes));
        }
        if let Some(prior) = self.prior_output {
            parts.push(format!("## PREVIOUS OUTPUT\n{}", prior));
        }
        for (heading, body) in self.sections {
            parts.push(format!("## {}\n{}", heading, body));
        }
        parts.join("\n\n")
    }
}

pub fn content_analysis_prompt(source: &str, revision: Option<&RevisionNotes>) -> StagePrompt {
    StagePrompt {
        system: CONTENT_ANALYSIS_SYSTEM,
        user: PromptBuilder::new()
            .revision(revision)
            .section("SOURCE CONTENT", source)
            .build(),
    }
}

pub fn extraction_prompt(
    source: &str,
    insights: &ContentInsights,
    revision: Option<&RevisionNotes>,
) -> StagePrompt {
    StagePrompt {
        system: EXTRACTION_SYSTEM,
        user: PromptBuilder::new()
            .revision(revision)
            .section("CONTENT INSIGHTS", render_insights(insights))
            .section("SOURCE CONTENT", source)
            .build(),
    }
}

pub fn design_prompt(
    extraction_json: &str,
    insights: &ContentInsights,
    revision: Option<&RevisionNotes>,
) -> StagePrompt {
    StagePrompt {
        system: DESIGN_SYSTEM,
        user: PromptBuilder::new()
            .revision(revision)
            .section("CONTENT INSIGHTS", render_insights(insights))
            .section("EXTRACTED KNOWLEDGE", extraction_json)
            .build(),
    }
}

pub fn generation_prompt(
    ctx: &BuilderContext,
    source: &str,
    revision: Option<&RevisionNotes>,
) -> StagePrompt {
    StagePrompt {
        system: GENERATION_SYSTEM,
        user: PromptBuilder::new()
            .revision(revision)
            .section("TOOL CONTEXT", render_context(ctx))
            .section("SOURCE CONTENT", source)
            .build(),
    }
}

fn render_insights(insights: &ContentInsights) -> String {
    let mut out = format!("Summary: {}", insights.summary);
    if !insights.key_themes.is_empty() {
        out.push_str(&format!("\nThemes: {}", insights.key_themes.join(", ")));
    }
    if let Some(audience) = insights.audience.as_deref().filter(|a| !a.trim().is_empty()) {
        out.push_str(&format!("\nAudience: {}", audience));
    }
    out
}

fn render_context(ctx: &BuilderContext) -> String {
    let mut lines = vec![
        format!("Tool: {}", ctx.tool_name),
        format!("Tagline: {}", ctx.tagline),
        format!("Module: {}", ctx.module_reference),
    ];
    if let Some(name) = &ctx.framework_name {
        lines.push(format!("Framework: {}", name));
    }

    lines.push("Framework items:".to_string());
    for item in &ctx.framework_items {
        let input = item
            .input_id
            .as_deref()
            .map(|id| format!(" [input {} ({:?})]", id, item.input_type))
            .unwrap_or_default();
        lines.push(format!("{}. {}: {}{}", item.number, item.label, item.definition, input));
    }

    if !ctx.terminology.is_empty() {
        lines.push("Terminology:".to_string());
        for term in &ctx.terminology {
            lines.push(format!("- {} ({:?}): {}", term.term, term.placement, term.definition));
        }
    }
    if let Some(quote) = &ctx.expert_quote {
        lines.push(format!("Expert quote: \"{}\" ({})", quote.text, quote.source));
        if let Some(place) = &quote.placement {
            lines.push(format!("Quote placement: {}", place));
        }
    }
    if let Some(checklist) = &ctx.checklist {
        lines.push(format!("Checklist: {}", checklist.join("; ")));
    }
    if !ctx.verdict.go.is_empty() {
        lines.push(format!("Go when: {}", ctx.verdict.go.join("; ")));
    }
    if !ctx.verdict.no_go.is_empty() {
        lines.push(format!("No-go when: {}", ctx.verdict.no_go.join("; ")));
    }
    for threshold in &ctx.verdict.thresholds {
        lines.push(format!(
            "Threshold {}: {:?}..{:?} => {}",
            threshold.label, threshold.min, threshold.max, threshold.verdict
        ));
    }
    if let Some(formula) = &ctx.formula {
        lines.push(format!("Formula: {}", formula));
    }
    if !ctx.phases.is_empty() {
        let ids: Vec<&str> = ctx.phases.iter().map(|p| p.id.as_str()).collect();
        lines.push(format!("Phases: {}", ids.join(" -> ")));
    }
    lines.join("\n")
}
