//! Phase-structure validation for the multi-step wizard variant.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::{IssueCode, ValidationIssue, ValidationResult, ValidationStage};
use crate::domain::knowledge::{Phase, MAX_INPUTS_PER_PHASE, MAX_PHASES, MIN_PHASES};

static TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("valid template regex"));

/// Names referenced as `{{name}}` in a summary template, in order.
pub fn template_variables(template: &str) -> Vec<String> {
    TEMPLATE_VAR
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Validates phase count, ids, input ownership and summary templates.
///
/// `input_ids` is the full set of inputs the design declares; every one of
/// them must belong to exactly one phase.
pub fn validate_phases(phases: &[Phase], input_ids: &[&str]) -> ValidationResult {
    let mut issues = Vec::new();
    let mut notes = Vec::new();

    if phases.len() < MIN_PHASES || phases.len() > MAX_PHASES {
        issues.push(
            ValidationIssue::error(
                IssueCode::PhaseCountOutOfRange,
                "phases",
                format!("Wizard has {} phases", phases.len()),
            )
            .expected(format!("{}..={} phases", MIN_PHASES, MAX_PHASES))
            .actual(phases.len().to_string()),
        );
    }

    let mut seen_ids = HashSet::new();
    for (idx, phase) in phases.iter().enumerate() {
        if !seen_ids.insert(phase.id.as_str()) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::DuplicatePhaseId,
                    format!("phases[{}].id", idx),
                    format!("Phase id '{}' is used more than once", phase.id),
                )
                .expected("unique phase ids")
                .actual(phase.id.clone()),
            );
        }
    }

    let known_inputs: HashSet<&str> = input_ids.iter().copied().collect();
    let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();

    for (idx, phase) in phases.iter().enumerate() {
        if phase.input_ids.len() > MAX_INPUTS_PER_PHASE {
            issues.push(
                ValidationIssue::error(
                    IssueCode::TooManyPhaseInputs,
                    format!("phases[{}].input_ids", idx),
                    format!("Phase '{}' collects {} inputs", phase.id, phase.input_ids.len()),
                )
                .expected(format!("<= {} inputs", MAX_INPUTS_PER_PHASE))
                .actual(phase.input_ids.len().to_string()),
            );
        }

        let mut listed = HashSet::new();
        for input_id in &phase.input_ids {
            if !listed.insert(input_id.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::DuplicateInputAssignment,
                        format!("phases[{}].input_ids", idx),
                        format!("Phase '{}' lists input '{}' more than once", phase.id, input_id),
                    )
                    .expected("each input listed once")
                    .actual(input_id.clone()),
                );
                continue;
            }
            owners.entry(input_id.as_str()).or_default().push(phase.id.as_str());
            if !known_inputs.contains(input_id.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::UnknownPhaseInput,
                        format!("phases[{}].input_ids", idx),
                        format!("Phase '{}' lists undeclared input '{}'", phase.id, input_id),
                    )
                    .expected("an input declared by the design")
                    .actual(input_id.clone()),
                );
            }
        }
    }

    for input_id in input_ids {
        match owners.get(input_id) {
            None => issues.push(
                ValidationIssue::error(
                    IssueCode::OrphanInput,
                    format!("inputs.{}", input_id),
                    format!("Input '{}' does not belong to any phase", input_id),
                )
                .expected("exactly one owning phase")
                .actual("none"),
            ),
            Some(phase_ids) if phase_ids.len() > 1 => issues.push(
                ValidationIssue::error(
                    IssueCode::DuplicateInputAssignment,
                    format!("inputs.{}", input_id),
                    format!("Input '{}' belongs to several phases", input_id),
                )
                .expected("exactly one owning phase")
                .actual(phase_ids.join(", ")),
            ),
            Some(_) => {}
        }
    }

    for (idx, phase) in phases.iter().enumerate() {
        let field = format!("phases[{}].summary_template", idx);
        let template = match phase.summary_template.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::MissingSummaryTemplate,
                        field,
                        format!("Phase '{}' has no summary template", phase.id),
                    )
                    .expected("summary template")
                    .actual("none"),
                );
                continue;
            }
        };

        for var in template_variables(template) {
            if phase.owns_input(&var) {
                continue;
            }
            let owner = phases.iter().find(|p| p.owns_input(&var));
            let issue = match owner {
                Some(other) => ValidationIssue::error(
                    IssueCode::CrossPhaseTemplateReference,
                    field.clone(),
                    format!(
                        "Phase '{}' summary references '{}' which is collected in phase '{}'",
                        phase.id, var, other.id
                    ),
                )
                .expected(format!("an input of phase '{}'", phase.id))
                .actual(format!("input of phase '{}'", other.id)),
                None => ValidationIssue::error(
                    IssueCode::UnknownTemplateVariable,
                    field.clone(),
                    format!("Phase '{}' summary references unknown input '{}'", phase.id, var),
                )
                .expected(format!("an input of phase '{}'", phase.id))
                .actual(var.clone()),
            };
            issues.push(issue);
        }
    }

    for (idx, phase) in phases.iter().enumerate() {
        for (cidx, condition) in phase.branch_conditions.iter().enumerate() {
            if !seen_ids.contains(condition.goto_phase.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::UnknownBranchTarget,
                        format!("phases[{}].branch_conditions[{}]", idx, cidx),
                        format!("Branch in phase '{}' targets unknown phase '{}'", phase.id, condition.goto_phase),
                    )
                    .expected("an existing phase id")
                    .actual(condition.goto_phase.clone()),
                );
            }
        }
    }

    if phases.iter().all(|p| p.branch_conditions.is_empty()) {
        tracing::debug!(phase_count = phases.len(), "Wizard declares no branch conditions");
        notes.push("No phase declares a branch condition; the wizard is strictly linear".to_string());
    }

    ValidationResult::from_issues(ValidationStage::Phases, issues).with_notes(notes)
}

/// Validates the default traversal path against the declared phases.
pub fn validate_default_path(path: &[String], phases: &[Phase]) -> ValidationResult {
    let mut issues = Vec::new();

    if path.len() < MIN_PHASES {
        issues.push(
            ValidationIssue::error(
                IssueCode::DefaultPathTooShort,
                "default_path",
                format!("Default path visits {} phases", path.len()),
            )
            .expected(format!(">= {} phases", MIN_PHASES))
            .actual(path.len().to_string()),
        );
    }

    for (idx, phase_id) in path.iter().enumerate() {
        if !phases.iter().any(|p| &p.id == phase_id) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidDefaultPath,
                    format!("default_path[{}]", idx),
                    format!("Default path references unknown phase '{}'", phase_id),
                )
                .expected("an existing phase id")
                .actual(phase_id.clone()),
            );
        }
    }

    ValidationResult::from_issues(ValidationStage::Phases, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::BranchCondition;

    fn phase(id: &str, inputs: &[&str], template: &str) -> Phase {
        Phase {
            id: id.to_string(),
            name: id.to_uppercase(),
            input_ids: inputs.iter().map(|s| s.to_string()).collect(),
            branch_conditions: vec![],
            summary_template: Some(template.to_string()),
        }
    }

    fn three_phases() -> Vec<Phase> {
        vec![
            phase("p1", &["a"], "You said {{a}}"),
            phase("p2", &["b"], "Then {{ b }}"),
            phase("p3", &["c"], "Finally {{c}}"),
        ]
    }

    #[test]
    fn well_formed_wizard_passes_with_linear_note() {
        let result = validate_phases(&three_phases(), &["a", "b", "c"]);
        assert!(result.passed, "{:?}", result.errors);
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn reports_exactly_one_orphan() {
        let result = validate_phases(&three_phases(), &["a", "b", "c", "d"]);
        assert_eq!(result.count(IssueCode::OrphanInput), 1);
        let orphan = result.errors.iter().find(|e| e.code == IssueCode::OrphanInput).unwrap();
        assert_eq!(orphan.field, "inputs.d");
    }

    #[test]
    fn phase_count_bounds() {
        let two = vec![phase("p1", &["a"], "{{a}}"), phase("p2", &["b"], "{{b}}")];
        assert!(validate_phases(&two, &["a", "b"]).has(IssueCode::PhaseCountOutOfRange));

        let six: Vec<Phase> = (0..6)
            .map(|i| {
                let id = format!("i{}", i);
                Phase {
                    id: format!("p{}", i),
                    input_ids: vec![id.clone()],
                    summary_template: Some(format!("{{{{{}}}}}", id)),
                    ..Default::default()
                }
            })
            .collect();
        let ids: Vec<String> = (0..6).map(|i| format!("i{}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let result = validate_phases(&six, &id_refs);
        assert!(result.has(IssueCode::PhaseCountOutOfRange));
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn duplicate_phase_ids_are_errors() {
        let mut phases = three_phases();
        phases[2].id = "p1".to_string();
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::DuplicatePhaseId), 1);
    }

    #[test]
    fn more_than_six_inputs_is_an_error() {
        let many = ["a", "b", "c", "d", "e", "f", "g"];
        let phases = vec![
            phase("p1", &many, "{{a}}"),
            phase("p2", &["h"], "{{h}}"),
            phase("p3", &["i"], "{{i}}"),
        ];
        let mut all: Vec<&str> = many.to_vec();
        all.extend(["h", "i"]);
        let result = validate_phases(&phases, &all);
        assert_eq!(result.count(IssueCode::TooManyPhaseInputs), 1);
    }

    #[test]
    fn input_in_two_phases_is_an_error() {
        let mut phases = three_phases();
        phases[1].input_ids.push("a".to_string());
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::DuplicateInputAssignment), 1);
    }

    #[test]
    fn input_repeated_within_one_phase_is_reported_once() {
        let mut phases = three_phases();
        phases[0].input_ids.push("a".to_string());
        let result = validate_phases(&phases, &["a", "b", "c"]);

        assert_eq!(result.count(IssueCode::DuplicateInputAssignment), 1);
        let dup = result
            .errors
            .iter()
            .find(|e| e.code == IssueCode::DuplicateInputAssignment)
            .unwrap();
        assert!(dup.message.contains("more than once"), "{}", dup.message);
        assert_eq!(dup.actual, "a");
    }

    #[test]
    fn undeclared_phase_input_is_an_error() {
        let mut phases = three_phases();
        phases[0].input_ids.push("zzz".to_string());
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::UnknownPhaseInput), 1);
    }

    #[test]
    fn missing_template_is_an_error() {
        let mut phases = three_phases();
        phases[1].summary_template = None;
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::MissingSummaryTemplate), 1);
    }

    #[test]
    fn cross_phase_reference_is_an_error() {
        let mut phases = three_phases();
        phases[2].summary_template = Some("Given {{a}}, then {{c}}".to_string());
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::CrossPhaseTemplateReference), 1);
        assert_eq!(result.count(IssueCode::UnknownTemplateVariable), 0);
    }

    #[test]
    fn unknown_template_variable_is_an_error() {
        let mut phases = three_phases();
        phases[0].summary_template = Some("{{nope}}".to_string());
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::UnknownTemplateVariable), 1);
    }

    #[test]
    fn branch_to_unknown_phase_is_an_error_and_suppresses_note() {
        let mut phases = three_phases();
        phases[0].branch_conditions.push(BranchCondition {
            input_id: "a".to_string(),
            equals: "yes".to_string(),
            goto_phase: "p9".to_string(),
        });
        let result = validate_phases(&phases, &["a", "b", "c"]);
        assert_eq!(result.count(IssueCode::UnknownBranchTarget), 1);
        assert!(result.notes.is_empty());
    }

    #[test]
    fn template_variables_are_extracted() {
        assert_eq!(
            template_variables("{{a}} and {{ b_2 }} but not {a}"),
            vec!["a".to_string(), "b_2".to_string()]
        );
    }

    #[test]
    fn default_path_must_reference_existing_phases() {
        let path = vec!["p1".to_string(), "p2".to_string(), "p7".to_string()];
        let result = validate_default_path(&path, &three_phases());
        assert_eq!(result.count(IssueCode::InvalidDefaultPath), 1);
    }

    #[test]
    fn default_path_must_meet_minimum_length() {
        let path = vec!["p1".to_string(), "p3".to_string()];
        let result = validate_default_path(&path, &three_phases());
        assert_eq!(result.count(IssueCode::DefaultPathTooShort), 1);
    }

    #[test]
    fn full_default_path_passes() {
        let path = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];
        assert!(validate_default_path(&path, &three_phases()).passed);
    }
}
