//! Parsing of structured AI responses.
//!
//! Models wrap JSON in prose or markdown fences; generation wraps markup the
//! same way. These helpers find the payload and nothing more.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Maximum accepted response length (2MB).
pub const MAX_RESPONSE_LENGTH: usize = 2_000_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Response is empty")]
    Empty,

    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("Response is not valid {expected}: {reason}")]
    Malformed { expected: &'static str, reason: String },
}

/// Deserializes the JSON payload of a response into `T`.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, ParseError> {
    let payload = extract_json(response)?;
    serde_json::from_str(&payload).map_err(|e| ParseError::Malformed {
        expected: "JSON",
        reason: e.to_string(),
    })
}

/// Locates the JSON payload: a fenced block first, then the first balanced
/// object or array, then the trimmed text as-is.
pub fn extract_json(response: &str) -> Result<String, ParseError> {
    let trimmed = check_length(response)?;

    if let Some(block) = fenced_block(trimmed, &["json", ""]) {
        return Ok(block);
    }

    let obj_start = trimmed.find('{');
    let arr_start = trimmed.find('[');
    let (start, open, close) = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => (a, '[', ']'),
        (Some(o), _) => (o, '{', '}'),
        (None, Some(a)) => (a, '[', ']'),
        (None, None) => return Ok(trimmed.to_string()),
    };

    Ok(balanced(trimmed, start, open, close).unwrap_or_else(|| trimmed.to_string()))
}

/// Locates the markup payload of a generation response.
pub fn extract_html(response: &str) -> Result<String, ParseError> {
    let trimmed = check_length(response)?;

    if let Some(block) = fenced_block(trimmed, &["html", ""]) {
        return Ok(block);
    }

    let lower = trimmed.to_ascii_lowercase();
    let start = lower
        .find("<!doctype")
        .or_else(|| lower.find("<html"))
        .or_else(|| lower.find('<'));
    match start {
        Some(start) => {
            let end = lower
                .rfind("</html>")
                .map(|i| i + "</html>".len())
                .filter(|&end| end > start)
                .unwrap_or(trimmed.len());
            Ok(trimmed[start..end].trim().to_string())
        }
        None => Err(ParseError::Malformed {
            expected: "HTML",
            reason: "no markup found".to_string(),
        }),
    }
}

fn check_length(response: &str) -> Result<&str, ParseError> {
    if response.len() > MAX_RESPONSE_LENGTH {
        return Err(ParseError::TooLong {
            max: MAX_RESPONSE_LENGTH,
            actual: response.len(),
        });
    }
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(trimmed)
}

fn fenced_block(s: &str, languages: &[&str]) -> Option<String> {
    for lang in languages {
        for newline in ["\n", "\r\n"] {
            let fence = format!("```{}{}", lang, newline);
            if let Some(start) = s.find(&fence) {
                let body_start = start + fence.len();
                if let Some(end) = s[body_start..].find("```") {
                    return Some(s[body_start..body_start + end].trim().to_string());
                }
            }
        }
    }
    None
}

fn balanced(s: &str, start: usize, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(s[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn parses_fenced_json() {
        let response = "Here you go:\n```json\n{\"name\": \"levers\"}\n```\nThanks";
        let parsed: Sample = parse_json(response).unwrap();
        assert_eq!(parsed.name, "levers");
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let response = "The extraction is {\"name\": \"a {brace} inside\"} as requested.";
        let parsed: Sample = parse_json(response).unwrap();
        assert_eq!(parsed.name, "a {brace} inside");
    }

    #[test]
    fn handles_multibyte_text_before_payload() {
        let response = "Résumé → {\"name\": \"ok\"}";
        let parsed: Sample = parse_json(response).unwrap();
        assert_eq!(parsed.name, "ok");
    }

    #[test]
    fn prose_without_json_is_malformed() {
        let err = parse_json::<Sample>("I could not find a framework.").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { expected: "JSON", .. }));
    }

    #[test]
    fn empty_response_is_rejected() {
        assert_eq!(extract_json("   ").unwrap_err(), ParseError::Empty);
        assert_eq!(extract_html("").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn extracts_fenced_html() {
        let response = "```html\n<!DOCTYPE html><html><body>Hi</body></html>\n```";
        assert_eq!(
            extract_html(response).unwrap(),
            "<!DOCTYPE html><html><body>Hi</body></html>"
        );
    }

    #[test]
    fn trims_prose_around_document() {
        let response = "Sure! <!DOCTYPE html><html><body>Hi</body></html> Let me know.";
        assert_eq!(
            extract_html(response).unwrap(),
            "<!DOCTYPE html><html><body>Hi</body></html>"
        );
    }

    #[test]
    fn text_without_markup_is_malformed() {
        assert!(matches!(
            extract_html("no tags here"),
            Err(ParseError::Malformed { expected: "HTML", .. })
        ));
    }
}
