//! Data-dependent severity rules.
//!
//! Findings whose severity depends on the surrounding content are decided
//! here and only here. Validators describe the situation; this table says
//! whether it blocks.

use super::Severity;

/// A finding whose severity depends on context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationRule {
    /// A framework was named but none of its items were extracted.
    NamedFrameworkWithoutItems { other_content: bool },
    /// A term from the extraction does not appear in the generated output.
    TermMissingFromOutput { load_bearing: bool },
}

impl EscalationRule {
    /// | rule                         | condition          | severity |
    /// |------------------------------|--------------------|----------|
    /// | NamedFrameworkWithoutItems   | other content      | warning  |
    /// | NamedFrameworkWithoutItems   | nothing else       | error    |
    /// | TermMissingFromOutput        | used by an item    | error    |
    /// | TermMissingFromOutput        | vocabulary only    | warning  |
    pub fn severity(self) -> Severity {
        match self {
            EscalationRule::NamedFrameworkWithoutItems { other_content: true } => Severity::Warning,
            EscalationRule::NamedFrameworkWithoutItems { other_content: false } => Severity::Error,
            EscalationRule::TermMissingFromOutput { load_bearing: true } => Severity::Error,
            EscalationRule::TermMissingFromOutput { load_bearing: false } => Severity::Warning,
        }
    }
}
