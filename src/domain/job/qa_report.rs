//! QA report attached to a job after every pipeline run.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::pipeline::PipelineStage;
use crate::domain::validation::{IssueCode, Severity, ValidationIssue, ValidationResult, ValidationStage};

/// Points deducted per blocking finding.
pub const ERROR_PENALTY: u32 = 15;

/// Points deducted per non-blocking finding.
pub const WARNING_PENALTY: u32 = 5;

/// A validation finding tagged with the stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaFinding {
    pub stage: ValidationStage,
    #[serde(flatten)]
    pub issue: ValidationIssue,
}

/// Structured pass/fail summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaReport {
    /// 0..=100.
    pub score: u32,
    pub passed: bool,
    pub findings: Vec<QaFinding>,
    /// Stage that stopped the run, if it did not reach the quality gate.
    pub halted_at: Option<PipelineStage>,
    pub stages_completed: Vec<PipelineStage>,
    pub generated_at: Timestamp,
}

impl QaReport {
    /// Collects findings from every validation result the run produced.
    pub fn collect(results: &[ValidationResult]) -> Vec<QaFinding> {
        results
            .iter()
            .flat_map(|result| {
                result.issues().map(move |issue| QaFinding {
                    stage: result.stage,
                    issue: issue.clone(),
                })
            })
            .collect()
    }

    /// Score = 100 - 15 per error - 5 per warning, floored at zero.
    pub fn score_findings(findings: &[QaFinding]) -> u32 {
        let penalty: u32 = findings
            .iter()
            .map(|f| match f.issue.severity {
                Severity::Error => ERROR_PENALTY,
                Severity::Warning => WARNING_PENALTY,
            })
            .sum();
        100u32.saturating_sub(penalty)
    }

    /// Report for a run that reached the quality gate.
    pub fn gate(
        results: &[ValidationResult],
        stages_completed: Vec<PipelineStage>,
        threshold: u32,
    ) -> Self {
        let findings = Self::collect(results);
        let score = Self::score_findings(&findings);
        let has_errors = findings.iter().any(|f| f.issue.is_blocking());
        Self {
            score,
            passed: !has_errors && score >= threshold,
            findings,
            halted_at: None,
            stages_completed,
            generated_at: Timestamp::now(),
        }
    }

    /// Report for a run that stopped before the quality gate.
    pub fn halted(
        results: &[ValidationResult],
        stages_completed: Vec<PipelineStage>,
        halted_at: PipelineStage,
    ) -> Self {
        let findings = Self::collect(results);
        Self {
            score: Self::score_findings(&findings),
            passed: false,
            findings,
            halted_at: Some(halted_at),
            stages_completed,
            generated_at: Timestamp::now(),
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &QaFinding> {
        self.findings.iter().filter(|f| f.issue.is_blocking())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &QaFinding> {
        self.findings.iter().filter(|f| !f.issue.is_blocking())
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.findings.iter().any(|f| f.issue.code == code)
    }

    /// One-line description of the blocking findings, for `last_error`.
    pub fn error_summary(&self) -> Option<String> {
        let errors: Vec<String> = self.errors().map(|f| f.issue.to_string()).collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        }
    }
}
