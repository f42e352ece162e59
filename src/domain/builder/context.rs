//! BuilderContext - the flattened, validated input to artifact generation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::knowledge::{CourseAnalysis, InputField, InputType, Phase, Threshold, ToolDesign};
use crate::domain::validation::{contains_ci, LabelMatcher, ValidationResult, ValidationStage};

/// Errors raised while assembling a builder context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("Cannot build context: {stage} validation has not passed")]
    NotValidated { stage: ValidationStage },
}

/// One framework item resolved against the design input that covers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    pub number: u32,
    pub name: String,
    pub label: String,
    pub definition: String,
    /// Covering input, if the matcher found one.
    pub input_id: Option<String>,
    pub input_type: InputType,
    pub placeholder: Option<String>,
}

/// Where a term is expected to surface in the generated tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermPlacement {
    InputLabel,
    HelpText,
    Glossary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTerm {
    pub term: String,
    pub definition: String,
    pub placement: TermPlacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextQuote {
    pub text: String,
    pub source: String,
    pub placement: Option<String>,
}

/// Go/no-go text plus the numeric thresholds from the design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerdictCriteria {
    pub go: Vec<String>,
    pub no_go: Vec<String>,
    pub thresholds: Vec<Threshold>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderContext {
    pub tool_name: String,
    pub tagline: String,
    pub module_reference: String,
    pub framework_name: Option<String>,
    pub framework_items: Vec<ContextItem>,
    pub terminology: Vec<ContextTerm>,
    pub expert_quote: Option<ContextQuote>,
    pub checklist: Option<Vec<String>>,
    pub verdict: VerdictCriteria,
    pub formula: Option<String>,
    pub phases: Vec<Phase>,
}

impl BuilderContext {
    /// Assembles the context from a validated extraction and design.
    ///
    /// Refuses unless both validation results passed. When the extraction has
    /// no numbered framework, legacy steps stand in as items.
    pub fn assemble(
        analysis: &CourseAnalysis,
        design: &ToolDesign,
        extraction_check: &ValidationResult,
        design_check: &ValidationResult,
        matcher: &dyn LabelMatcher,
    ) -> Result<Self, BuilderError> {
        if !extraction_check.passed {
            return Err(BuilderError::NotValidated {
                stage: ValidationStage::Extraction,
            });
        }
        if !design_check.passed {
            return Err(BuilderError::NotValidated {
                stage: ValidationStage::Design,
            });
        }

        let framework_items = if analysis.framework_items().is_empty() {
            legacy_items(analysis, design, matcher)
        } else {
            analysis
                .framework_items()
                .iter()
                .map(|item| {
                    let candidates = item.match_candidates();
                    let input = design.inputs.iter().find(|input| {
                        candidates.iter().any(|c| matcher.matches(&input.label, c))
                    });
                    resolve_item(item.number, &item.name, item.label(), &item.definition, input)
                })
                .collect()
        };

        let terminology = analysis
            .terminology
            .iter()
            .map(|term| ContextTerm {
                term: term.term.clone(),
                definition: term.definition.clone(),
                placement: placement_of(&term.term, &design.inputs),
            })
            .collect();

        let quote_index = design.deep_content.quote_index.unwrap_or(0);
        let expert_quote = analysis
            .expert_quotes
            .get(quote_index)
            .or_else(|| analysis.primary_quote())
            .map(|q| ContextQuote {
                text: q.quote.clone(),
                source: q.source.clone(),
                placement: design.deep_content.quote_placement.clone(),
            });

        let checklist = if !design.output.checklist.is_empty() {
            Some(design.output.checklist.clone())
        } else if !analysis.checklist.is_empty() {
            Some(analysis.checklist.clone())
        } else {
            None
        };

        let criteria = analysis.decision_criteria.clone().unwrap_or_default();
        let formula = design
            .output
            .formula_description
            .clone()
            .filter(|f| !f.trim().is_empty())
            .or_else(|| {
                analysis
                    .formulas
                    .first()
                    .map(|f| format!("{} = {}", f.name, f.expression))
            });

        Ok(Self {
            tool_name: design.tool_name.clone(),
            tagline: design.tagline.clone(),
            module_reference: analysis.module_title.clone(),
            framework_name: analysis
                .framework
                .as_ref()
                .map(|f| f.name.clone())
                .filter(|n| !n.trim().is_empty()),
            framework_items,
            terminology,
            expert_quote,
            checklist,
            verdict: VerdictCriteria {
                go: criteria.go,
                no_go: criteria.no_go,
                thresholds: design.output.thresholds.clone(),
            },
            formula,
            phases: design.phases.clone(),
        })
    }

    /// Terms used by any framework item's label, name or definition.
    pub fn is_load_bearing(&self, term: &str) -> bool {
        self.framework_items.iter().any(|item| {
            contains_ci(&item.label, term)
                || contains_ci(&item.name, term)
                || contains_ci(&item.definition, term)
        })
    }
}

fn legacy_items(
    analysis: &CourseAnalysis,
    design: &ToolDesign,
    matcher: &dyn LabelMatcher,
) -> Vec<ContextItem> {
    analysis
        .legacy_steps
        .iter()
        .filter(|step| !step.trim().is_empty())
        .enumerate()
        .map(|(idx, step)| {
            let input = design
                .inputs
                .iter()
                .find(|input| matcher.matches(&input.label, step));
            resolve_item(idx as u32 + 1, step, step.trim(), "", input)
        })
        .collect()
}

fn resolve_item(
    number: u32,
    name: &str,
    label: &str,
    definition: &str,
    input: Option<&InputField>,
) -> ContextItem {
    ContextItem {
        number,
        name: name.trim().to_string(),
        label: label.to_string(),
        definition: definition.trim().to_string(),
        input_id: input.map(|i| i.id.clone()),
        input_type: input.map(|i| i.input_type).unwrap_or_default(),
        placeholder: input.and_then(|i| i.placeholder.clone()),
    }
}

fn placement_of(term: &str, inputs: &[InputField]) -> TermPlacement {
    if inputs.iter().any(|i| contains_ci(&i.label, term)) {
        TermPlacement::InputLabel
    } else if inputs
        .iter()
        .any(|i| i.help_text.as_deref().is_some_and(|h| contains_ci(h, term)))
    {
        TermPlacement::HelpText
    } else {
        TermPlacement::Glossary
    }
}
