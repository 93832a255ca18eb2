//! Helpers for coaxing JSON out of chat completions

use chronicle_core::{ChronicleError, ChronicleResult, LlmErrorKind};

/// System instruction asking the model to answer with JSON matching `schema`
pub fn json_instruction(schema: &serde_json::Value) -> String {
    format!(
        "Respond with a single JSON value and nothing else. \
         Do not wrap it in markdown. The value must match this JSON schema:\n{}",
        schema
    )
}

/// Parse the JSON payload of a completion
///
/// Accepts bare JSON, fenced ```json blocks and JSON surrounded by prose.
pub fn extract_json(provider: &str, text: &str) -> ChronicleResult<serde_json::Value> {
    let trimmed = strip_fences(text.trim());

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(ChronicleError::llm(
        LlmErrorKind::Failure,
        provider,
        format!(
            "Response is not valid JSON: {}",
            trimmed.chars().take(120).collect::<String>()
        ),
    ))
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_fenced_json() {
        let bare = extract_json("test", r#"{"a": 1}"#).unwrap();
        assert_eq!(bare["a"], 1);

        let fenced = extract_json("test", "```json\n{\"a\": [1, 2]}\n```").unwrap();
        assert_eq!(fenced["a"][1], 2);
    }

    #[test]
    fn parses_json_inside_prose() {
        let value = extract_json("test", "Sure! Here it is: {\"ok\": true} Hope that helps.").unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn rejects_non_json() {
        let err = extract_json("test", "no structure here").unwrap_err();
        assert_eq!(err.error_type(), "llm_failure");
    }
}
