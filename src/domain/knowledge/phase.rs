//! Phases of the multi-step wizard variant.

use serde::{Deserialize, Serialize};

/// Minimum number of phases in a wizard.
pub const MIN_PHASES: usize = 3;

/// Maximum number of phases in a wizard.
pub const MAX_PHASES: usize = 5;

/// Maximum inputs collected by one phase.
pub const MAX_INPUTS_PER_PHASE: usize = 6;

/// One step of a wizard-style tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "inputs")]
    pub input_ids: Vec<String>,
    #[serde(default)]
    pub branch_conditions: Vec<BranchCondition>,
    /// Summary text with `{{input_id}}` placeholders.
    #[serde(default)]
    pub summary_template: Option<String>,
}

impl Phase {
    pub fn owns_input(&self, input_id: &str) -> bool {
        self.input_ids.iter().any(|id| id == input_id)
    }
}

/// Jump to another phase when an input takes a given value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCondition {
    pub input_id: String,
    pub equals: String,
    pub goto_phase: String,
}
