//! Content-analysis output: a light summary of the source material.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentInsights {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_themes: Vec<String>,
    #[serde(default)]
    pub audience: Option<String>,
    /// Set when the analysis response could not be parsed and this record
    /// is a stand-in.
    #[serde(default)]
    pub generic: bool,
}

impl ContentInsights {
    /// Stand-in record used when the analysis response is unusable.
    pub fn generic() -> Self {
        Self {
            summary: "Course module content; no structured analysis available.".to_string(),
            key_themes: Vec::new(),
            audience: None,
            generic: true,
        }
    }
}
