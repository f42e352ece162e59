//! Design alignment validation: does the tool design cover the extraction?

use super::{
    contains_ci, validate_default_path, validate_phases, IssueCode, LabelMatcher, ValidationIssue,
    ValidationResult, ValidationStage,
};
use crate::domain::knowledge::{CourseAnalysis, InputField, ToolDesign};

/// Checks that every framework item has an input, and reports softer gaps
/// (unused terminology, unplaced quote, unlinked reflection questions).
///
/// Runs phase validation too when the design is a multi-phase wizard.
pub fn validate_design(
    analysis: &CourseAnalysis,
    design: &ToolDesign,
    matcher: &dyn LabelMatcher,
) -> ValidationResult {
    let mut issues = Vec::new();

    if design.inputs.is_empty() {
        issues.push(
            ValidationIssue::error(IssueCode::DesignHasNoInputs, "inputs", "Design declares no inputs")
                .expected(">=1 input")
                .actual("0 inputs"),
        );
    }

    for (idx, item) in analysis.framework_items().iter().enumerate() {
        let candidates = item.match_candidates();
        let mapped = design.inputs.iter().any(|input| {
            candidates
                .iter()
                .any(|candidate| matcher.matches(&input.label, candidate))
        });
        if !mapped {
            issues.push(
                ValidationIssue::error(
                    IssueCode::FrameworkItemNotMapped,
                    format!("framework.items[{}]", idx),
                    format!("Framework item '{}' has no matching input", item.label()),
                )
                .expected(format!("an input labelled like '{}'", candidates.join("' or '")))
                .actual(format!(
                    "input labels: {}",
                    design
                        .inputs
                        .iter()
                        .map(|i| i.label.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            );
        }
    }

    for (idx, term) in analysis.terminology.iter().enumerate() {
        if !design.inputs.iter().any(|input| mentions(input, &term.term)) {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::TerminologyNotUsed,
                    format!("terminology[{}]", idx),
                    format!("Term '{}' is not used in any input label or help text", term.term),
                )
                .expected(format!("'{}' in an input label or help text", term.term))
                .actual("not found"),
            );
        }
    }

    if analysis.primary_quote().is_some() && !design.deep_content.places_quote() {
        issues.push(
            ValidationIssue::warning(
                IssueCode::QuoteNotPlaced,
                "deep_content.quote_placement",
                "Extraction has an expert quote but the design does not say where to show it",
            )
            .expected("quote placement")
            .actual("none"),
        );
    }

    for (idx, question) in analysis.reflection_questions.iter().enumerate() {
        let linked = design.inputs.iter().any(|input| {
            input.reflection_question.as_deref().is_some_and(|q| {
                contains_ci(q, question) || contains_ci(question, q)
            })
        });
        if !linked {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::ReflectionNotLinked,
                    format!("reflection_questions[{}]", idx),
                    format!("Reflection question '{}' is not linked to any input", question),
                )
                .expected("an input with this reflection_question")
                .actual("none"),
            );
        }
    }

    let mut result = ValidationResult::from_issues(ValidationStage::Design, issues);

    if design.is_multi_phase() {
        result = result.merge(validate_phases(&design.phases, &design.input_ids()));
        if !design.default_path.is_empty() {
            result = result.merge(validate_default_path(&design.default_path, &design.phases));
        }
    }

    result
}

fn mentions(input: &InputField, term: &str) -> bool {
    contains_ci(&input.label, term)
        || input
            .help_text
            .as_deref()
            .is_some_and(|help| contains_ci(help, term))
}
