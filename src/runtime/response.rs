//! Interpretation of Claude CLI output.
//!
//! `--output-format json` normally yields a single result record:
//!
//! ```json
//! {"type":"result","subtype":"success","result":"Hi!","session_id":"abc","is_error":false,
//!  "total_cost_usd":0.0031,"duration_ms":1840,"num_turns":1}
//! ```
//!
//! Anything that is not a JSON object is treated as plain text. That covers
//! CLIs that crashed before printing their record and versions without
//! structured output; it is an expected outcome, not an error.

use crate::core::{InterpretedResponse, ResponseMetadata, SessionId};
use serde_json::{Map, Value};

/// Result of decoding raw CLI output
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedOutput {
    /// A JSON object record
    Structured(Map<String, Value>),
    /// Anything else, trimmed
    RawText(String),
}

/// Decode raw stdout into a structured record or plain text
pub fn decode(stdout: &str) -> DecodedOutput {
    let trimmed = stdout.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(record)) => DecodedOutput::Structured(record),
        _ => DecodedOutput::RawText(trimmed.to_string()),
    }
}

/// Turn raw CLI stdout into a uniform response.
///
/// `fallback_session_id` is used when the output names no session, so a
/// continuation never loses track of a conversation already in progress.
///
/// # Examples
///
/// ```rust
/// use claude_code_mcp::runtime::interpret;
///
/// let response = interpret(r#"{"result":"Hi!","session_id":"abc"}"#, None);
/// assert_eq!(response.response, "Hi!");
/// assert_eq!(response.session_id.as_deref(), Some("abc"));
///
/// let plain = interpret("  Segmentation fault\n", Some("abc"));
/// assert_eq!(plain.response, "Segmentation fault");
/// assert_eq!(plain.session_id.as_deref(), Some("abc"));
/// ```
pub fn interpret(stdout: &str, fallback_session_id: Option<&str>) -> InterpretedResponse {
    let mut interpreted = match decode(stdout) {
        DecodedOutput::Structured(record) => from_record(record),
        DecodedOutput::RawText(text) => InterpretedResponse::text(text),
    };

    if interpreted.session_id.is_none() {
        interpreted.session_id = fallback_session_id
            .filter(|id| !id.is_empty())
            .map(SessionId::from);
    }

    interpreted
}

fn from_record(record: Map<String, Value>) -> InterpretedResponse {
    let session_id = record
        .get("session_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(SessionId::from);

    let is_error = record
        .get("is_error")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let metadata = extract_metadata(&record);

    let response = match record.get("result").and_then(Value::as_str) {
        Some(result) => result.to_string(),
        // Unexpected shape: hand back the whole record rather than drop it.
        None => Value::Object(record).to_string(),
    };

    InterpretedResponse {
        response,
        session_id,
        is_error,
        metadata,
    }
}

fn extract_metadata(record: &Map<String, Value>) -> Option<ResponseMetadata> {
    let metadata = ResponseMetadata {
        cost_usd: record
            .get("total_cost_usd")
            .or_else(|| record.get("cost_usd"))
            .and_then(Value::as_f64),
        duration_ms: record.get("duration_ms").and_then(Value::as_u64),
        num_turns: record
            .get("num_turns")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok()),
    };

    (!metadata.is_empty()).then_some(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_structured_record() {
        let stdout = r#"{"type":"result","result":"Hi!","session_id":"abc","is_error":false}"#;
        let response = interpret(stdout, None);

        assert_eq!(response.response, "Hi!");
        assert_eq!(response.session_id.as_deref(), Some("abc"));
        assert!(!response.is_error);
        assert!(response.metadata.is_none());
    }

    #[test]
    fn test_tool_reported_error_keeps_result_text() {
        let stdout = r#"{"result":"Credit balance is too low","session_id":"s1","is_error":true}"#;
        let response = interpret(stdout, None);

        assert!(response.is_error);
        assert_eq!(response.response, "Credit balance is too low");
    }

    #[test]
    fn test_plain_text_falls_back_verbatim() {
        let response = interpret("\n  Error: not logged in  \n", None);

        assert_eq!(response, InterpretedResponse::text("Error: not logged in"));
        assert!(matches!(decode("Error: not logged in"), DecodedOutput::RawText(_)));
    }

    #[test]
    fn test_non_object_json_is_plain_text() {
        for stdout in ["42", "\"quoted\"", "[1,2,3]", "null", "true"] {
            match decode(stdout) {
                DecodedOutput::RawText(text) => assert_eq!(text, stdout),
                other => panic!("{} should be raw text, got {:?}", stdout, other),
            }
        }
    }

    #[test]
    fn test_truncated_json_is_plain_text() {
        let response = interpret(r#"{"result":"Hi"#, None);
        assert_eq!(response.response, r#"{"result":"Hi"#);
        assert!(response.session_id.is_none());
    }

    #[test]
    fn test_missing_result_returns_whole_record() {
        let stdout = r#"{"type":"result","subtype":"error_max_turns","session_id":"abc"}"#;
        let response = interpret(stdout, None);

        let reparsed: Value = serde_json::from_str(&response.response).unwrap();
        assert_eq!(
            reparsed,
            json!({"type":"result","subtype":"error_max_turns","session_id":"abc"})
        );
        assert_eq!(response.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_non_string_result_returns_whole_record() {
        let response = interpret(r#"{"result":{"nested":true}}"#, None);
        let reparsed: Value = serde_json::from_str(&response.response).unwrap();
        assert_eq!(reparsed, json!({"result":{"nested":true}}));
    }

    #[test]
    fn test_empty_result_is_kept() {
        let response = interpret(r#"{"result":"","session_id":"abc"}"#, None);
        assert_eq!(response.response, "");
    }

    #[test]
    fn test_session_id_fallback() {
        let no_session = r#"{"result":"done"}"#;
        assert_eq!(interpret(no_session, Some("X")).session_id.as_deref(), Some("X"));
        assert_eq!(interpret(no_session, None).session_id, None);

        let empty_session = r#"{"result":"done","session_id":""}"#;
        assert_eq!(
            interpret(empty_session, Some("X")).session_id.as_deref(),
            Some("X")
        );

        // A session id in the output always wins over the fallback.
        let with_session = r#"{"result":"done","session_id":"Y"}"#;
        assert_eq!(
            interpret(with_session, Some("X")).session_id.as_deref(),
            Some("Y")
        );

        assert_eq!(interpret("plain", Some("")).session_id, None);
    }

    #[test]
    fn test_is_error_defaults_to_false() {
        assert!(!interpret(r#"{"result":"ok"}"#, None).is_error);
        assert!(!interpret(r#"{"result":"ok","is_error":"yes"}"#, None).is_error);
    }

    #[test]
    fn test_metadata_extraction() {
        let stdout = json!({
            "result": "ok",
            "session_id": "abc",
            "total_cost_usd": 0.0125,
            "duration_ms": 1840,
            "num_turns": 3
        })
        .to_string();

        let metadata = interpret(&stdout, None).metadata.unwrap();
        assert_eq!(metadata.cost_usd, Some(0.0125));
        assert_eq!(metadata.duration_ms, Some(1840));
        assert_eq!(metadata.num_turns, Some(3));

        let legacy = interpret(r#"{"result":"ok","cost_usd":0.5}"#, None);
        assert_eq!(legacy.metadata.unwrap().cost_usd, Some(0.5));
    }

    proptest! {
        #[test]
        fn prop_structured_roundtrip(
            result in "\\PC*",
            session_id in "[a-f0-9-]{1,36}",
            is_error in any::<bool>(),
        ) {
            let stdout = json!({
                "result": result,
                "session_id": session_id,
                "is_error": is_error,
            })
            .to_string();

            let response = interpret(&stdout, None);
            prop_assert_eq!(response.response, result);
            prop_assert_eq!(response.session_id, Some(session_id));
            prop_assert_eq!(response.is_error, is_error);
        }

        #[test]
        fn prop_plain_text_fallback_is_idempotent(text in "[A-Za-z][A-Za-z0-9 .,!?\n]*") {
            let first = interpret(&text, None);
            prop_assert_eq!(&first.response, text.trim());
            prop_assert_eq!(first.session_id.clone(), None);
            prop_assert!(!first.is_error);

            let second = interpret(&first.response, None);
            prop_assert_eq!(second, first);
        }
    }
}
