//! Validation Engine.
//!
//! Pure functions, no I/O. Each check collects every finding it can in one
//! pass and reports through [`ValidationResult`]:
//!
//! - [`validate_extraction`] - is the extracted knowledge usable?
//! - [`validate_design`] - does the design cover every framework item?
//! - [`validate_output`] - does the artifact contain what the design promised?
//! - [`validate_phases`] / [`validate_default_path`] - wizard structure.
//!
//! Severity that depends on context is decided in [`EscalationRule`].

mod design;
mod extraction;
mod matcher;
mod output;
mod phases;
mod result;
mod severity;

pub use design::validate_design;
pub use extraction::{validate_extraction, MIN_LEGACY_STEPS, MIN_TERMS};
pub use matcher::{contains_ci, ExactMatcher, LabelMatcher, SubstringMatcher};
pub use output::{validate_output, QUOTE_PREFIX_CHARS};
pub use phases::{template_variables, validate_default_path, validate_phases};
pub use result::{IssueCode, Severity, ValidationIssue, ValidationResult, ValidationStage};
pub use severity::EscalationRule;
