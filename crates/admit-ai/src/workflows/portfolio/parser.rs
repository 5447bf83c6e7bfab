//! Extraction of a JSON object embedded in free-form service text.

use serde_json::{Map, Value};

const FENCE: &str = "```";
const JSON_FENCE_TAG: &str = "json";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("response contained no JSON object")]
    NoJsonObject,
    #[error("JSON object in response was never closed")]
    UnterminatedObject,
    #[error("response JSON is invalid: {0}")]
    InvalidJson(String),
    #[error("response JSON is not an object")]
    NotAnObject,
    #[error("field '{field}' {reason}")]
    Schema { field: String, reason: String },
}

impl ParseError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Locate the candidate JSON text: the first ```json fenced block, otherwise the
/// first balanced top-level `{...}` span.
pub fn extract_json(text: &str) -> Result<&str, ParseError> {
    if let Some(block) = fenced_json_block(text) {
        return Ok(block);
    }
    balanced_object(text)
}

/// Extract and parse, requiring a JSON object at the top level.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let candidate = extract_json(text)?;
    let value: Value = serde_json::from_str(candidate)
        .map_err(|err| ParseError::InvalidJson(err.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

fn fenced_json_block(text: &str) -> Option<&str> {
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(FENCE) {
        let fence_start = cursor + offset;
        let after_fence = fence_start + FENCE.len();
        let rest = &text[after_fence..];
        let tag_matches = rest
            .get(..JSON_FENCE_TAG.len())
            .map(|tag| tag.eq_ignore_ascii_case(JSON_FENCE_TAG))
            .unwrap_or(false);

        if tag_matches {
            let body_start = after_fence + JSON_FENCE_TAG.len();
            let body = &text[body_start..];
            let close = body.find(FENCE)?;
            return Some(body[..close].trim());
        }

        // Skip past this fence's closing marker so unrelated code blocks are ignored.
        match rest.find(FENCE) {
            Some(close) => cursor = after_fence + close + FENCE.len(),
            None => return None,
        }
    }
    None
}

fn balanced_object(text: &str) -> Result<&str, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJsonObject)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::UnterminatedObject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_fenced_json_block() {
        let text = "Here is my analysis.\n```json\n{\"score\": 7}\n```\nLet me know {if} that helps.";
        assert_eq!(extract_json(text).unwrap(), "{\"score\": 7}");
    }

    #[test]
    fn fence_tag_is_case_insensitive() {
        let text = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_json(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn skips_non_json_fences() {
        let text = "```text\n{not json}\n```\nthen ```json\n{\"b\": 2}\n```";
        assert_eq!(extract_json(text).unwrap(), "{\"b\": 2}");
    }

    #[test]
    fn falls_back_to_first_top_level_object() {
        let text = "Sure! {\"outer\": {\"inner\": \"a } brace\"}} trailing {\"second\": true}";
        assert_eq!(
            extract_json(text).unwrap(),
            "{\"outer\": {\"inner\": \"a } brace\"}}"
        );
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let text = r#"{"quote": "she said \"}\" loudly"} done"#;
        let map = parse_object(text).unwrap();
        assert_eq!(map["quote"], "she said \"}\" loudly");
    }

    #[test]
    fn tolerates_trailing_commentary() {
        let map = parse_object("{\"score\": 5}\n\nI weighted leadership heavily.").unwrap();
        assert_eq!(map["score"], 5);
    }

    #[test]
    fn reports_missing_and_unterminated_objects() {
        assert_eq!(extract_json("no json here"), Err(ParseError::NoJsonObject));
        assert_eq!(
            extract_json("{\"score\": 5, \"tier\": "),
            Err(ParseError::UnterminatedObject)
        );
    }

    #[test]
    fn invalid_json_is_a_hard_failure() {
        let err = parse_object("```json\n{\"score\": 5,}\n```").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn non_object_fenced_payload_is_rejected() {
        assert_eq!(parse_object("```json\n[1, 2]\n```"), Err(ParseError::NotAnObject));
    }

    #[test]
    fn handles_multibyte_text_around_object() {
        let map = parse_object("Résumé — «analyse» {\"note\": \"naïve café\"} ✓").unwrap();
        assert_eq!(map["note"], "naïve café");
    }
}
