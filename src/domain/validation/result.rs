//! Structured validation findings.
//!
//! Every check in the engine reports through [`ValidationResult`]. Findings
//! carry a machine-readable code, the field path involved and the expected
//! vs. actual values, so a halted pipeline can be diagnosed from the QA
//! report alone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Which validation stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    Extraction,
    Design,
    Phases,
    Output,
    Generation,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStage::Extraction => "extraction",
            ValidationStage::Design => "design",
            ValidationStage::Phases => "phases",
            ValidationStage::Output => "output",
            ValidationStage::Generation => "generation",
        };
        write!(f, "{}", s)
    }
}

/// Blocking or non-blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable finding codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Extraction
    MissingNumberedFramework,
    MissingModuleTitle,
    EmptyFramework,
    FrameworkItemIncomplete,

    // Design alignment
    DesignHasNoInputs,
    FrameworkItemNotMapped,
    TerminologyNotUsed,
    QuoteNotPlaced,
    ReflectionNotLinked,

    // Output
    EmptyArtifact,
    FrameworkItemMissingInHtml,
    ExpertQuoteMissingInHtml,
    BrokenSlideLayout,
    MissingSlideScaffold,
    CriticalTerminologyMissing,
    TerminologyMissingInHtml,

    // Phases
    PhaseCountOutOfRange,
    DuplicatePhaseId,
    TooManyPhaseInputs,
    OrphanInput,
    UnknownPhaseInput,
    DuplicateInputAssignment,
    MissingSummaryTemplate,
    CrossPhaseTemplateReference,
    UnknownTemplateVariable,
    UnknownBranchTarget,
    InvalidDefaultPath,
    DefaultPathTooShort,

    // Generation
    UnparseableResponse,
}

impl IssueCode {
    /// Stable code string, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::MissingNumberedFramework => "MISSING_NUMBERED_FRAMEWORK",
            IssueCode::MissingModuleTitle => "MISSING_MODULE_TITLE",
            IssueCode::EmptyFramework => "EMPTY_FRAMEWORK",
            IssueCode::FrameworkItemIncomplete => "FRAMEWORK_ITEM_INCOMPLETE",
            IssueCode::DesignHasNoInputs => "DESIGN_HAS_NO_INPUTS",
            IssueCode::FrameworkItemNotMapped => "FRAMEWORK_ITEM_NOT_MAPPED",
            IssueCode::TerminologyNotUsed => "TERMINOLOGY_NOT_USED",
            IssueCode::QuoteNotPlaced => "QUOTE_NOT_PLACED",
            IssueCode::ReflectionNotLinked => "REFLECTION_NOT_LINKED",
            IssueCode::EmptyArtifact => "EMPTY_ARTIFACT",
            IssueCode::FrameworkItemMissingInHtml => "FRAMEWORK_ITEM_MISSING_IN_HTML",
            IssueCode::ExpertQuoteMissingInHtml => "EXPERT_QUOTE_MISSING_IN_HTML",
            IssueCode::BrokenSlideLayout => "BROKEN_SLIDE_LAYOUT",
            IssueCode::MissingSlideScaffold => "MISSING_SLIDE_SCAFFOLD",
            IssueCode::CriticalTerminologyMissing => "CRITICAL_TERMINOLOGY_MISSING",
            IssueCode::TerminologyMissingInHtml => "TERMINOLOGY_MISSING_IN_HTML",
            IssueCode::PhaseCountOutOfRange => "PHASE_COUNT_OUT_OF_RANGE",
            IssueCode::DuplicatePhaseId => "DUPLICATE_PHASE_ID",
            IssueCode::TooManyPhaseInputs => "TOO_MANY_PHASE_INPUTS",
            IssueCode::OrphanInput => "ORPHAN_INPUT",
            IssueCode::UnknownPhaseInput => "UNKNOWN_PHASE_INPUT",
            IssueCode::DuplicateInputAssignment => "DUPLICATE_INPUT_ASSIGNMENT",
            IssueCode::MissingSummaryTemplate => "MISSING_SUMMARY_TEMPLATE",
            IssueCode::CrossPhaseTemplateReference => "CROSS_PHASE_TEMPLATE_REFERENCE",
            IssueCode::UnknownTemplateVariable => "UNKNOWN_TEMPLATE_VARIABLE",
            IssueCode::UnknownBranchTarget => "UNKNOWN_BRANCH_TARGET",
            IssueCode::InvalidDefaultPath => "INVALID_DEFAULT_PATH",
            IssueCode::DefaultPathTooShort => "DEFAULT_PATH_TOO_SHORT",
            IssueCode::UnparseableResponse => "UNPARSEABLE_RESPONSE",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    /// Dotted path of the field involved, e.g. `framework.items[2]`.
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl ValidationIssue {
    pub fn new(
        code: IssueCode,
        severity: Severity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            field: field.into(),
            expected: String::new(),
            actual: String::new(),
        }
    }

    pub fn error(code: IssueCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, field, message)
    }

    pub fn warning(code: IssueCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, field, message)
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = actual.into();
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.code, self.message, self.field)
    }
}

/// Outcome of one validation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub stage: ValidationStage,
    pub passed: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Soft observations that are neither errors nor warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub validated_at: Timestamp,
}

impl ValidationResult {
    /// Builds a result from collected findings, splitting them by severity.
    pub fn from_issues(stage: ValidationStage, issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(ValidationIssue::is_blocking);
        Self {
            stage,
            passed: errors.is_empty(),
            errors,
            warnings,
            notes: Vec::new(),
            validated_at: Timestamp::now(),
        }
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Folds another result's findings into this one, keeping this stage tag.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.notes.extend(other.notes);
        self.passed = self.errors.is_empty();
        self
    }

    /// All findings, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn count(&self, code: IssueCode) -> usize {
        self.issues().filter(|issue| issue.code == code).count()
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.count(code) > 0
    }
}
