//! Output validation: does the generated artifact carry what the design promised?
//!
//! Checks are substring-based; the markup is never parsed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    contains_ci, EscalationRule, IssueCode, Severity, ValidationIssue, ValidationResult,
    ValidationStage,
};
use crate::domain::builder::BuilderContext;

/// Characters of the expert quote that must appear verbatim.
pub const QUOTE_PREFIX_CHARS: usize = 50;

static WIDE_WIDTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)width\s*:\s*(\d+)(?:\.\d+)?%").expect("valid width regex"));
static FLEX_DISPLAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)display\s*:\s*flex").expect("valid flex regex"));
static TRANSLATE_X: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)translateX\s*\(").expect("valid translate regex"));
static ABSOLUTE_POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)position\s*:\s*absolute").expect("valid position regex"));
static ACTIVE_STATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.active\b").expect("valid active regex"));
static PAST_STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.past\b").expect("valid past regex"));
static SLIDE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)class\s*=\s*["'][^"']*\bslide\b"#).expect("valid slide regex"));

/// Validates rendered markup against the builder context it was generated from.
///
/// The layered slide scaffold is required only of slide-based artifacts: a
/// context with phases, or markup using a `slide` class. A flat, slide-less
/// artifact skips that check.
pub fn validate_output(html: &str, ctx: &BuilderContext) -> ValidationResult {
    if html.trim().is_empty() {
        return ValidationResult::from_issues(
            ValidationStage::Output,
            vec![ValidationIssue::error(IssueCode::EmptyArtifact, "artifact", "Generated artifact is empty")
                .expected("markup")
                .actual("0 bytes")],
        );
    }

    let mut issues = Vec::new();

    for (idx, item) in ctx.framework_items.iter().enumerate() {
        if !label_present(html, &item.label) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::FrameworkItemMissingInHtml,
                    format!("framework_items[{}]", idx),
                    format!("Framework item '{}' does not appear in the artifact", item.label),
                )
                .expected(item.label.clone())
                .actual("not found"),
            );
        }
    }

    if let Some(quote) = &ctx.expert_quote {
        let prefix: String = quote.text.trim().chars().take(QUOTE_PREFIX_CHARS).collect();
        if !prefix.is_empty() && !contains_ci(html, &prefix) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::ExpertQuoteMissingInHtml,
                    "expert_quote",
                    format!("Expert quote from {} does not appear in the artifact", quote.source),
                )
                .expected(prefix)
                .actual("not found"),
            );
        }
    }

    if has_wide_flex_track(html) {
        issues.push(
            ValidationIssue::error(
                IssueCode::BrokenSlideLayout,
                "artifact.css",
                "Slides are laid out on a wide flex track moved with translateX",
            )
            .expected("stacked absolutely positioned slides")
            .actual("width > 100% + display:flex + translateX"),
        );
    }

    // Flat single-page tools have no slides to layer.
    let uses_slides = !ctx.phases.is_empty() || SLIDE_MARKUP.is_match(html);
    if uses_slides && !has_slide_scaffold(html) {
        issues.push(
            ValidationIssue::error(
                IssueCode::MissingSlideScaffold,
                "artifact.css",
                "Layered slide CSS is missing",
            )
            .expected("position: absolute with .active and .past states")
            .actual(missing_scaffold_parts(html).join(", ")),
        );
    }

    for (idx, term) in ctx.terminology.iter().enumerate() {
        if contains_ci(html, &term.term) {
            continue;
        }
        let load_bearing = ctx.is_load_bearing(&term.term);
        let severity = EscalationRule::TermMissingFromOutput { load_bearing }.severity();
        let code = match severity {
            Severity::Error => IssueCode::CriticalTerminologyMissing,
            Severity::Warning => IssueCode::TerminologyMissingInHtml,
        };
        issues.push(
            ValidationIssue::new(
                code,
                severity,
                format!("terminology[{}]", idx),
                format!("Term '{}' does not appear in the artifact", term.term),
            )
            .expected(term.term.clone())
            .actual("not found"),
        );
    }

    ValidationResult::from_issues(ValidationStage::Output, issues)
}

/// The full label, or the segment after its last colon, appears in the markup.
fn label_present(html: &str, label: &str) -> bool {
    if contains_ci(html, label) {
        return true;
    }
    match label.rsplit_once(':') {
        Some((_, tail)) => contains_ci(html, tail),
        None => false,
    }
}

fn has_wide_flex_track(html: &str) -> bool {
    let wide = WIDE_WIDTH
        .captures_iter(html)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .any(|pct| pct > 100);
    wide && FLEX_DISPLAY.is_match(html) && TRANSLATE_X.is_match(html)
}

fn has_slide_scaffold(html: &str) -> bool {
    missing_scaffold_parts(html).is_empty()
}

fn missing_scaffold_parts(html: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !ABSOLUTE_POSITION.is_match(html) {
        missing.push("position: absolute");
    }
    if !ACTIVE_STATE.is_match(html) {
        missing.push(".active");
    }
    if !PAST_STATE.is_match(html) {
        missing.push(".past");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::{ContextItem, ContextQuote, ContextTerm, TermPlacement, VerdictCriteria};
    use crate::domain::knowledge::{InputType, Phase};
    use proptest::prelude::*;

    const SCAFFOLD: &str = "<style>.slide{position:absolute}.slide.active{opacity:1}.slide.past{opacity:0}</style>";

    fn item(number: u32, label: &str, definition: &str) -> ContextItem {
        ContextItem {
            number,
            name: label.to_string(),
            label: label.to_string(),
            definition: definition.to_string(),
            input_id: None,
            input_type: InputType::Text,
            placeholder: None,
        }
    }

    fn term(t: &str) -> ContextTerm {
        ContextTerm {
            term: t.to_string(),
            definition: String::new(),
            placement: TermPlacement::Glossary,
        }
    }

    fn context(items: Vec<ContextItem>, terms: Vec<ContextTerm>) -> BuilderContext {
        BuilderContext {
            tool_name: "Lever Check".to_string(),
            tagline: String::new(),
            module_reference: "Pricing".to_string(),
            framework_name: None,
            framework_items: items,
            terminology: terms,
            expert_quote: None,
            checklist: None,
            verdict: VerdictCriteria::default(),
            formula: None,
            phases: vec![],
        }
    }

    #[test]
    fn empty_artifact_short_circuits() {
        let ctx = context(vec![item(1, "Anchor", "")], vec![term("decoy")]);
        let result = validate_output("   ", &ctx);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, IssueCode::EmptyArtifact);
    }

    #[test]
    fn all_labels_present_passes() {
        let ctx = context(
            vec![item(1, "Anchor price", ""), item(2, "Scarcity", "")],
            vec![],
        );
        let html = "<label>Anchor Price</label><label>scarcity</label>";
        assert!(validate_output(html, &ctx).passed);
    }

    #[test]
    fn missing_label_is_an_error() {
        let ctx = context(
            vec![item(1, "Anchor price", ""), item(2, "Scarcity", "")],
            vec![],
        );
        let result = validate_output("<label>Anchor price</label>", &ctx);
        assert_eq!(result.count(IssueCode::FrameworkItemMissingInHtml), 1);
        assert_eq!(result.errors[0].field, "framework_items[1]");
    }

    #[test]
    fn tail_after_colon_is_accepted() {
        let ctx = context(vec![item(3, "Lever 3: Price anchoring", "")], vec![]);
        assert!(validate_output("<h2>Price anchoring</h2>", &ctx).passed);
    }

    #[test]
    fn quote_prefix_must_appear() {
        let mut ctx = context(vec![], vec![]);
        let quote = "The best pricing decisions start long before anyone names a number out loud.";
        ctx.expert_quote = Some(ContextQuote {
            text: quote.to_string(),
            source: "A. Expert".to_string(),
            placement: None,
        });

        let result = validate_output("<p>Nothing quoted</p>", &ctx);
        assert!(result.has(IssueCode::ExpertQuoteMissingInHtml));

        let truncated: String = quote.chars().take(QUOTE_PREFIX_CHARS).collect();
        let html = format!("<blockquote>{}...</blockquote>", truncated);
        assert!(validate_output(&html, &ctx).passed);
    }

    #[test]
    fn wide_flex_track_is_broken_layout() {
        let ctx = context(vec![], vec![]);
        let html = "<style>.track{display:flex;width:500%;transform:translateX(-100%)}</style>";
        let result = validate_output(html, &ctx);
        assert!(result.has(IssueCode::BrokenSlideLayout));
    }

    #[test]
    fn full_width_flex_is_not_broken() {
        let ctx = context(vec![], vec![]);
        let html = "<style>.row{display:flex;width:100%;transform:translateX(4px)}</style>";
        assert!(!validate_output(html, &ctx).has(IssueCode::BrokenSlideLayout));
    }

    #[test]
    fn slides_require_the_layered_scaffold() {
        let ctx = context(vec![], vec![]);
        let bare = r#"<div class="slide">One</div><style>.slide.active{opacity:1}</style>"#;
        let result = validate_output(bare, &ctx);
        assert!(result.has(IssueCode::MissingSlideScaffold));
        let actual = &result.errors[0].actual;
        assert!(actual.contains("position: absolute"));
        assert!(actual.contains(".past"));

        let good = format!(r#"<div class="slide">One</div>{}"#, SCAFFOLD);
        assert!(validate_output(&good, &ctx).passed);
    }

    #[test]
    fn flat_artifact_skips_scaffold_check() {
        let ctx = context(vec![], vec![]);
        assert!(!validate_output("<main>one page</main>", &ctx).has(IssueCode::MissingSlideScaffold));
    }

    #[test]
    fn wizard_contexts_always_require_scaffold() {
        let mut ctx = context(vec![], vec![]);
        ctx.phases = vec![Phase::default()];
        assert!(validate_output("<main>steps</main>", &ctx).has(IssueCode::MissingSlideScaffold));
    }

    #[test]
    fn load_bearing_term_is_critical() {
        let ctx = context(
            vec![item(1, "Anchor", "Set a reference price first")],
            vec![term("reference price"), term("decoy")],
        );
        let result = validate_output("<label>Anchor</label>", &ctx);

        assert!(!result.passed);
        assert_eq!(result.count(IssueCode::CriticalTerminologyMissing), 1);
        assert_eq!(result.count(IssueCode::TerminologyMissingInHtml), 1);
        assert_eq!(result.warnings[0].field, "terminology[1]");
    }

    proptest! {
        #[test]
        fn dropping_one_label_yields_exactly_one_error(
            labels in proptest::collection::hash_set("[A-Z][a-z]{5}", 1..6),
            pick in any::<prop::sample::Index>(),
        ) {
            let labels: Vec<String> = labels.into_iter().collect();
            let items: Vec<_> = labels
                .iter()
                .enumerate()
                .map(|(i, l)| item(i as u32 + 1, l, ""))
                .collect();
            let ctx = context(items, vec![]);

            let full: String = labels.iter().map(|l| format!("<h3>{}</h3>", l)).collect();
            prop_assert!(validate_output(&full, &ctx).passed);

            let dropped = pick.index(labels.len());
            let partial: String = labels
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != dropped)
                .map(|(_, l)| format!("<h3>{}</h3>", l))
                .collect();
            let result = validate_output(&format!("<main>{}</main>", partial), &ctx);
            prop_assert_eq!(result.errors.len(), 1);
            prop_assert_eq!(result.errors[0].code, IssueCode::FrameworkItemMissingInHtml);
            prop_assert_eq!(result.errors[0].field.clone(), format!("framework_items[{}]", dropped));
        }
    }
}
