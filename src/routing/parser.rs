use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::types::AiSuggestion;
use super::AiError;

/// First `{` to last `}` across lines.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object regex"));

/// Parse the model's reply into a suggestion.
///
/// Accepts bare JSON, JSON wrapped in ```json fences, or JSON surrounded by
/// prose. The doctor id is returned as text; checking it against the
/// candidate pool is the router's job.
pub fn parse_suggestion(response: &str) -> Result<AiSuggestion, AiError> {
    let unfenced = strip_code_fences(response);
    let json_str = JSON_OBJECT
        .find(unfenced)
        .map(|m| m.as_str())
        .ok_or_else(|| AiError::MalformedSuggestion("No JSON object in response".into()))?;

    #[derive(Deserialize)]
    struct RawSuggestion {
        selected_doctor_id: Option<Value>,
        reasoning: Option<Value>,
    }

    let raw: RawSuggestion = serde_json::from_str(json_str)
        .map_err(|e| AiError::MalformedSuggestion(e.to_string()))?;

    let selected_doctor_id = match raw.selected_doctor_id {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Null) | None => {
            return Err(AiError::MalformedSuggestion(
                "selected_doctor_id missing".into(),
            ))
        }
        Some(other) => {
            return Err(AiError::MalformedSuggestion(format!(
                "selected_doctor_id is not a string: {other}"
            )))
        }
    };

    let reasoning = match raw.reasoning {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    };

    Ok(AiSuggestion {
        selected_doctor_id,
        reasoning,
    })
}

fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(after_open) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    after_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(after_open)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "6f1c2a9e-4d0b-4c47-9a52-1b1f5e6d7c80";

    #[test]
    fn bare_json() {
        let s = parse_suggestion(&format!(
            r#"{{"selected_doctor_id": "{ID}", "reasoning": "Cardiologist for chest pain"}}"#
        ))
        .unwrap();
        assert_eq!(s.selected_doctor_id, ID);
        assert_eq!(s.reasoning, "Cardiologist for chest pain");
    }

    #[test]
    fn fenced_json() {
        let text = format!(
            "```json\n{{\"selected_doctor_id\": \"{ID}\", \"reasoning\": \"online\"}}\n```"
        );
        assert_eq!(parse_suggestion(&text).unwrap().selected_doctor_id, ID);
    }

    #[test]
    fn unlabeled_fence() {
        let text = format!("```\n{{\"selected_doctor_id\": \"{ID}\"}}\n```");
        assert_eq!(parse_suggestion(&text).unwrap().selected_doctor_id, ID);
    }

    #[test]
    fn json_surrounded_by_prose() {
        let text = format!(
            "My choice:\n{{\"selected_doctor_id\": \"{ID}\", \"reasoning\": \"x\"}}\nThanks."
        );
        assert_eq!(parse_suggestion(&text).unwrap().selected_doctor_id, ID);
    }

    #[test]
    fn missing_reasoning_is_empty() {
        let s = parse_suggestion(&format!(r#"{{"selected_doctor_id": "{ID}"}}"#)).unwrap();
        assert!(s.reasoning.is_empty());
    }

    #[test]
    fn id_is_trimmed() {
        let s = parse_suggestion(&format!(r#"{{"selected_doctor_id": "  {ID} "}}"#)).unwrap();
        assert_eq!(s.selected_doctor_id, ID);
    }

    #[test]
    fn no_json_is_malformed() {
        let err = parse_suggestion("I cannot decide.").unwrap_err();
        assert!(matches!(err, AiError::MalformedSuggestion(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_suggestion("{selected_doctor_id: oops}").unwrap_err();
        assert!(matches!(err, AiError::MalformedSuggestion(_)));
    }

    #[test]
    fn missing_or_null_id_is_malformed() {
        assert!(parse_suggestion(r#"{"reasoning": "none"}"#).is_err());
        assert!(parse_suggestion(r#"{"selected_doctor_id": null}"#).is_err());
        assert!(parse_suggestion(r#"{"selected_doctor_id": "   "}"#).is_err());
    }

    #[test]
    fn numeric_id_is_malformed() {
        let err = parse_suggestion(r#"{"selected_doctor_id": 42}"#).unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }
}
