//! Label matching strategies used to map framework items onto design inputs.

/// Decides whether a design label covers a framework item label.
pub trait LabelMatcher: Send + Sync {
    fn matches(&self, input_label: &str, item_label: &str) -> bool;
}

/// Case-insensitive substring match in either direction.
///
/// "Your anchor price" covers "anchor price", and "Price" covers
/// "Price anchoring input". Blank strings never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl LabelMatcher for SubstringMatcher {
    fn matches(&self, input_label: &str, item_label: &str) -> bool {
        let a = input_label.trim().to_lowercase();
        let b = item_label.trim().to_lowercase();
        if a.is_empty() || b.is_empty() {
            return false;
        }
        a.contains(&b) || b.contains(&a)
    }
}

/// Case-insensitive whole-label equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl LabelMatcher for ExactMatcher {
    fn matches(&self, input_label: &str, item_label: &str) -> bool {
        let a = input_label.trim();
        !a.is_empty() && a.eq_ignore_ascii_case(item_label.trim())
    }
}

/// Case-insensitive containment; blank needles never match.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}
