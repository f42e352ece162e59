//! CourseAnalysis - structured knowledge extracted from course content.
//!
//! Deserialized straight from the extraction stage's JSON response, so every
//! collection defaults to empty and every optional block to `None`.

use serde::{Deserialize, Serialize};

/// Extraction result for one course module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAnalysis {
    #[serde(default)]
    pub module_title: String,
    #[serde(default)]
    pub framework: Option<Framework>,
    #[serde(default)]
    pub terminology: Vec<Term>,
    #[serde(default)]
    pub expert_quotes: Vec<ExpertQuote>,
    #[serde(default)]
    pub decision_criteria: Option<DecisionCriteria>,
    /// Unnumbered step list from older extraction prompts.
    #[serde(default)]
    pub legacy_steps: Vec<String>,
    #[serde(default)]
    pub formulas: Vec<Formula>,
    #[serde(default)]
    pub reflection_questions: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
}

impl CourseAnalysis {
    /// Framework items, or an empty slice when no framework was detected.
    pub fn framework_items(&self) -> &[FrameworkItem] {
        self.framework
            .as_ref()
            .map(|f| f.items.as_slice())
            .unwrap_or(&[])
    }

    /// True when a framework was named but none of its items were extracted.
    pub fn has_named_empty_framework(&self) -> bool {
        self.framework
            .as_ref()
            .is_some_and(|f| !f.name.trim().is_empty() && f.items.is_empty())
    }

    pub fn has_decision_criteria(&self) -> bool {
        self.decision_criteria
            .as_ref()
            .is_some_and(|c| !c.is_empty())
    }

    /// The first expert quote, if any.
    pub fn primary_quote(&self) -> Option<&ExpertQuote> {
        self.expert_quotes.iter().find(|q| !q.quote.trim().is_empty())
    }
}

/// A named, numbered pedagogical framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<FrameworkItem>,
}

/// One numbered element of a framework (e.g. "Lever 3").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkItem {
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub definition: String,
    /// Suggested label for the input that captures this item.
    #[serde(default)]
    pub tool_label: Option<String>,
}

impl FrameworkItem {
    /// The tool-facing label: the suggested label if present, else the name.
    pub fn label(&self) -> &str {
        match self.tool_label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.trim(),
            _ => self.name.trim(),
        }
    }

    /// Non-blank strings an input label may match against.
    pub fn match_candidates(&self) -> Vec<&str> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(label) = self.tool_label.as_deref() {
            if !label.trim().is_empty() {
                candidates.push(label.trim());
            }
        }
        if !self.name.trim().is_empty() {
            candidates.push(self.name.trim());
        }
        candidates
    }
}

/// Key course vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub usage_hint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertQuote {
    pub quote: String,
    #[serde(default)]
    pub source: String,
}

/// Go / no-go conditions for the tool's verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCriteria {
    #[serde(default)]
    pub go: Vec<String>,
    #[serde(default)]
    pub no_go: Vec<String>,
}

impl DecisionCriteria {
    pub fn is_empty(&self) -> bool {
        self.go.iter().all(|c| c.trim().is_empty()) && self.no_go.iter().all(|c| c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    #[serde(default)]
    pub name: String,
    pub expression: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_extraction() {
        let json = r#"{"module_title": "Pricing", "terminology": [{"term": "Anchor"}]}"#;
        let analysis: CourseAnalysis = serde_json::from_str(json).unwrap();

        assert_eq!(analysis.module_title, "Pricing");
        assert!(analysis.framework.is_none());
        assert_eq!(analysis.terminology.len(), 1);
        assert!(analysis.framework_items().is_empty());
    }

    #[test]
    fn item_label_prefers_tool_label() {
        let item = FrameworkItem {
            number: 1,
            name: "Value Anchoring".to_string(),
            definition: String::new(),
            tool_label: Some("Your anchor price".to_string()),
        };
        assert_eq!(item.label(), "Your anchor price");
        assert_eq!(item.match_candidates(), vec!["Your anchor price", "Value Anchoring"]);
    }

    #[test]
    fn item_label_falls_back_to_name_when_blank() {
        let item = FrameworkItem {
            number: 2,
            name: "Scarcity".to_string(),
            definition: String::new(),
            tool_label: Some("  ".to_string()),
        };
        assert_eq!(item.label(), "Scarcity");
        assert_eq!(item.match_candidates(), vec!["Scarcity"]);
    }

    #[test]
    fn named_empty_framework_is_detected() {
        let analysis = CourseAnalysis {
            framework: Some(Framework {
                name: "The 4 Pillars".to_string(),
                items: vec![],
            }),
            ..Default::default()
        };
        assert!(analysis.has_named_empty_framework());
    }

    #[test]
    fn blank_decision_criteria_do_not_count() {
        let analysis = CourseAnalysis {
            decision_criteria: Some(DecisionCriteria {
                go: vec!["  ".to_string()],
                no_go: vec![],
            }),
            ..Default::default()
        };
        assert!(!analysis.has_decision_criteria());
    }
}
