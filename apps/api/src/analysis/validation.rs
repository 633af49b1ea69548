use serde_json::Value;
use thiserror::Error;

/// The model's output was not well-formed JSON.
#[derive(Debug, Error)]
#[error("model output is not valid JSON: {source}")]
pub struct MalformedResponse {
    /// Exact text the model returned.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Parses the model output exactly as returned. No fence stripping, no
/// repair; the `skillGaps`/`atsScore` shape is not enforced.
pub fn validate_model_output(raw: &str) -> Result<Value, MalformedResponse> {
    serde_json::from_str(raw).map_err(|source| MalformedResponse {
        raw: raw.to_string(),
        source,
    })
}

/// Ways a parsed answer deviates from the requested shape. Used for logging
/// only; a non-empty result never rejects the response.
pub fn shape_warnings(value: &Value) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    let Some(object) = value.as_object() else {
        warnings.push("response is not a JSON object");
        return warnings;
    };

    match object.get("skillGaps").and_then(Value::as_array) {
        Some(gaps) if gaps.iter().all(Value::is_string) => {}
        Some(_) => warnings.push("skillGaps contains non-string entries"),
        None => warnings.push("skillGaps is missing or not an array"),
    }

    match object.get("atsScore").and_then(Value::as_f64) {
        Some(score) if (0.0..=100.0).contains(&score) => {}
        Some(_) => warnings.push("atsScore is outside 0-100"),
        None => warnings.push("atsScore is missing or not a number"),
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_output_is_returned_unchanged() {
        let parsed = validate_model_output(r#"{"skillGaps":["SQL"],"atsScore":72}"#).unwrap();
        assert_eq!(parsed, json!({"skillGaps": ["SQL"], "atsScore": 72}));
    }

    #[test]
    fn test_non_json_is_malformed_and_keeps_raw_text() {
        let err = validate_model_output("not json").unwrap_err();
        assert_eq!(err.raw, "not json");
    }

    #[test]
    fn test_fenced_json_is_not_repaired() {
        let fenced = "```json\n{\"atsScore\": 10}\n```";
        assert!(validate_model_output(fenced).is_err());
    }

    #[test]
    fn test_unexpected_shape_still_validates() {
        let parsed = validate_model_output(r#"{"score":"high"}"#).unwrap();
        assert_eq!(shape_warnings(&parsed).len(), 2);
    }

    #[test]
    fn test_shape_warnings() {
        assert!(shape_warnings(&json!({"skillGaps": ["SQL"], "atsScore": 72})).is_empty());
        assert_eq!(
            shape_warnings(&json!({"skillGaps": [1], "atsScore": 140})),
            vec![
                "skillGaps contains non-string entries",
                "atsScore is outside 0-100"
            ]
        );
        assert_eq!(
            shape_warnings(&json!(["SQL"])),
            vec!["response is not a JSON object"]
        );
    }
}
