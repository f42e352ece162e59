//! Pipeline vocabulary shared by the application layer: stage order, AI
//! budgets, prompt composition and response parsing.

mod budget;
mod parsing;
mod prompts;
mod stage;

pub use budget::{estimate_tokens, StageBudget, CHARS_PER_TOKEN};
pub use parsing::{extract_html, extract_json, parse_json, ParseError, MAX_RESPONSE_LENGTH};
pub use prompts::{
    content_analysis_prompt, design_prompt, extraction_prompt, generation_prompt, PromptBuilder,
    RevisionNotes, StagePrompt, CONTENT_ANALYSIS_SYSTEM, DESIGN_SYSTEM, EXTRACTION_SYSTEM,
    GENERATION_SYSTEM, REVISION_HEADING,
};
pub use stage::PipelineStage;
