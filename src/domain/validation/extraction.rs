//! Extraction validation: is the extracted knowledge usable at all?

use super::{EscalationRule, IssueCode, ValidationIssue, ValidationResult, ValidationStage};
use crate::domain::knowledge::CourseAnalysis;

/// Terminology entries needed before vocabulary alone counts as content.
pub const MIN_TERMS: usize = 2;

/// Legacy steps needed before a step list alone counts as content.
pub const MIN_LEGACY_STEPS: usize = 2;

/// Checks that an extraction carries at least one usable kind of knowledge
/// and a module title.
pub fn validate_extraction(analysis: &CourseAnalysis) -> ValidationResult {
    let mut issues = Vec::new();

    let has_items = !analysis.framework_items().is_empty();
    let other_content = analysis.terminology.len() >= MIN_TERMS
        || analysis.legacy_steps.len() >= MIN_LEGACY_STEPS
        || !analysis.formulas.is_empty()
        || analysis.has_decision_criteria();

    if !has_items && !other_content {
        issues.push(
            ValidationIssue::error(
                IssueCode::MissingNumberedFramework,
                "framework",
                "No usable knowledge extracted: no framework items, terminology, steps, formulas or decision criteria",
            )
            .expected(format!(
                ">=1 framework item, >={} terms, >={} steps, >=1 formula or decision criteria",
                MIN_TERMS, MIN_LEGACY_STEPS
            ))
            .actual(format!(
                "0 items, {} terms, {} steps, 0 formulas, no criteria",
                analysis.terminology.len(),
                analysis.legacy_steps.len()
            )),
        );
    }

    if analysis.has_named_empty_framework() {
        let name = analysis
            .framework
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or_default();
        let severity = EscalationRule::NamedFrameworkWithoutItems { other_content }.severity();
        issues.push(
            ValidationIssue::new(
                IssueCode::EmptyFramework,
                severity,
                "framework.items",
                format!("Framework '{}' was detected but has no items", name),
            )
            .expected(">=1 item")
            .actual("0 items"),
        );
    }

    if analysis.module_title.trim().is_empty() {
        issues.push(
            ValidationIssue::error(IssueCode::MissingModuleTitle, "module_title", "Module title is blank")
                .expected("non-empty title")
                .actual(format!("{:?}", analysis.module_title)),
        );
    }

    for (idx, item) in analysis.framework_items().iter().enumerate() {
        let field = format!("framework.items[{}]", idx);
        if item.label().is_empty() {
            issues.push(
                ValidationIssue::error(
                    IssueCode::FrameworkItemIncomplete,
                    field,
                    format!("Framework item #{} has neither a name nor a tool label", item.number),
                )
                .expected("name or tool_label")
                .actual("blank"),
            );
        } else if item.definition.trim().is_empty() {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::FrameworkItemIncomplete,
                    format!("{}.definition", field),
                    format!("Framework item '{}' has no definition", item.label()),
                )
                .expected("definition text")
                .actual("blank"),
            );
        }
    }

    ValidationResult::from_issues(ValidationStage::Extraction, issues)
}
