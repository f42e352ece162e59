//! ToolDesign - the interactive specification derived from an extraction.

use serde::{Deserialize, Serialize};

use super::Phase;

/// Concrete input/output specification for one generated tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDesign {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub inputs: Vec<InputField>,
    #[serde(default)]
    pub output: DecisionBlock,
    #[serde(default)]
    pub deep_content: DeepContentHints,
    /// Present only for the multi-step wizard variant.
    #[serde(default)]
    pub phases: Vec<Phase>,
    /// Phase ids traversed when no branch condition fires.
    #[serde(default)]
    pub default_path: Vec<String>,
}

impl ToolDesign {
    pub fn input(&self, id: &str) -> Option<&InputField> {
        self.inputs.iter().find(|i| i.id == id)
    }

    pub fn input_ids(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.id.as_str()).collect()
    }

    pub fn is_multi_phase(&self) -> bool {
        !self.phases.is_empty()
    }
}

/// Widget type of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Textarea,
    Number,
    Slider,
    Select,
    Checkbox,
    Rating,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub id: String,
    pub label: String,
    #[serde(default, rename = "type")]
    pub input_type: InputType,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Reflection question this input answers, if any.
    #[serde(default)]
    pub reflection_question: Option<String>,
}

/// Output / verdict block of the tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionBlock {
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
    #[serde(default)]
    pub formula_description: Option<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub label: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub verdict: String,
}

/// Where course-specific depth (quotes) is surfaced in the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepContentHints {
    /// Index into the extraction's expert quotes.
    #[serde(default)]
    pub quote_index: Option<usize>,
    /// Display location, e.g. "results", "intro".
    #[serde(default)]
    pub quote_placement: Option<String>,
}

impl DeepContentHints {
    pub fn places_quote(&self) -> bool {
        self.quote_placement
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}
