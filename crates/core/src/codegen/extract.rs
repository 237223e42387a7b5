use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

/// A stage 1 or stage 2 reply that could not be turned into a plan.
#[derive(thiserror::Error, Debug)]
pub enum ResponseFormatError {
    #[error("no JSON object found in model response\nRaw data: {raw}")]
    NoJsonObject { raw: String },

    #[error("failed to decode model response: {source}\nRaw data: {raw}")]
    Decode {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl ResponseFormatError {
    /// The unmodified model reply.
    pub fn raw(&self) -> &str {
        match self {
            ResponseFormatError::NoJsonObject { raw } | ResponseFormatError::Decode { raw, .. } => {
                raw
            }
        }
    }
}

fn json_object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object regex"))
}

/// Return the span from the first `{` to the last `}` in a model reply.
///
/// Returns an empty string when there is no such span. This is a greedy match,
/// so stray braces in prose after the object widen the span and make decoding
/// fail.
pub fn extract_json(response: &str) -> &str {
    json_object_regex()
        .find(response)
        .map_or("", |found| found.as_str())
}

/// Extract the JSON object from a model reply and decode it into `T`.
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> Result<T, ResponseFormatError> {
    let json = extract_json(response);

    if json.is_empty() {
        return Err(ResponseFormatError::NoJsonObject {
            raw: response.to_string(),
        });
    }

    serde_json::from_str(json).map_err(|source| ResponseFormatError::Decode {
        source,
        raw: response.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{FilePathPlan, SharedDependencyPlan};

    #[test]
    fn test_clean_json_passes_through() {
        let json = r#"{"reasoning": ["r"], "file_paths": ["main.py"]}"#;
        assert_eq!(extract_json(json), json);
    }

    #[test]
    fn test_json_surrounded_by_prose() {
        let json = r#"{"reasoning": ["one file"], "file_paths": ["main.py", "lib/util.py"]}"#;
        let response = format!("Sure! Here is the plan:\n\n{json}\n\nLet me know if you need more.");

        assert_eq!(extract_json(&response), json);

        let plan: FilePathPlan = parse_json_response(&response).unwrap();
        assert_eq!(plan.file_paths, vec!["main.py", "lib/util.py"]);
        assert_eq!(plan.reasoning, vec!["one file"]);
    }

    #[test]
    fn test_nested_objects_keep_outer_span() {
        let json = r#"{"reasoning": [], "shared_dependencies": [{"name": "Todo", "description": "d", "symbols": ["id"]}]}"#;
        let response = format!("```json\n{json}\n```");

        assert_eq!(extract_json(&response), json);

        let plan: SharedDependencyPlan = parse_json_response(&response).unwrap();
        assert_eq!(plan.shared_dependencies.len(), 1);
        assert_eq!(plan.shared_dependencies[0].symbols, vec!["id"]);
    }

    #[test]
    fn test_multiline_json() {
        let response = "Plan:\n{\n  \"file_paths\": [\n    \"a.rs\"\n  ]\n}\n";
        let plan: FilePathPlan = parse_json_response(response).unwrap();
        assert_eq!(plan.file_paths, vec!["a.rs"]);
    }

    #[test]
    fn test_no_braces_returns_empty() {
        assert_eq!(extract_json("I cannot help with that."), "");
    }

    #[test]
    fn test_no_braces_is_a_format_error_with_raw_text() {
        let err = parse_json_response::<FilePathPlan>("no json here").unwrap_err();
        assert!(matches!(err, ResponseFormatError::NoJsonObject { .. }));
        assert_eq!(err.raw(), "no json here");
        assert!(err.to_string().contains("Raw data: no json here"));
    }

    #[test]
    fn test_wrong_shape_is_a_decode_error() {
        let err = parse_json_response::<FilePathPlan>(r#"{"files": ["a"]}"#).unwrap_err();
        assert!(matches!(err, ResponseFormatError::Decode { .. }));
        assert_eq!(err.raw(), r#"{"files": ["a"]}"#);
    }

    #[test]
    fn test_braces_in_trailing_prose_widen_the_span() {
        let response = r#"{"file_paths": ["a"]} and then {oops}"#;
        assert_eq!(extract_json(response), response);
        assert!(parse_json_response::<FilePathPlan>(response).is_err());
    }
}
