//! Answer extraction from arbitrary SUT response payloads.
//!
//! SUTs are arbitrary and unversioned; rather than requiring per-SUT
//! configuration, a fixed, ordered list of common field names is probed.
//! The priority list is explicit and tested per rule so the heuristic stays
//! auditable.

use serde_json::Value;
use tracing::warn;

/// Field names probed in order; first string value wins.
const ANSWER_FIELDS: [&str; 8] = [
    "response", "answer", "text", "content", "message", "output", "result", "reply",
];

/// Wrapper field recursed into when none of the answer fields match directly.
const DATA_WRAPPER: &str = "data";

/// Locate the best candidate answer text inside an arbitrary JSON payload.
///
/// Total function: it never fails. Worst case the whole payload is
/// serialized back to a compact JSON string, which callers must treat as a
/// low-confidence extraction rather than an error.
pub fn extract(payload: &Value) -> String {
    if let Value::String(s) = payload {
        return s.clone();
    }

    if let Value::Object(map) = payload {
        for field in ANSWER_FIELDS {
            if let Some(Value::String(s)) = map.get(field) {
                return s.clone();
            }
        }
        match map.get(DATA_WRAPPER) {
            Some(Value::String(s)) => return s.clone(),
            Some(inner @ Value::Object(_)) => return extract(inner),
            _ => {}
        }
    }

    let serialized = payload.to_string();
    warn!(
        excerpt = %crate::types::truncate_preview(&serialized, 80),
        "no answer field recognized; falling back to serialized payload"
    );
    serialized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_is_returned_unchanged() {
        assert_eq!(extract(&json!("Paris")), "Paris");
    }

    #[test]
    fn recognized_field_wins() {
        assert_eq!(extract(&json!({"response": "Paris"})), "Paris");
        assert_eq!(extract(&json!({"answer": "Madrid"})), "Madrid");
        assert_eq!(extract(&json!({"reply": "Rome"})), "Rome");
    }

    #[test]
    fn probe_order_is_fixed() {
        // "response" outranks "answer" regardless of key order in the map.
        let payload = json!({"answer": "second", "response": "first"});
        assert_eq!(extract(&payload), "first");
    }

    #[test]
    fn non_string_candidates_are_skipped() {
        let payload = json!({"response": 42, "answer": "Madrid"});
        assert_eq!(extract(&payload), "Madrid");
    }

    #[test]
    fn data_wrapper_is_recursed() {
        let payload = json!({"data": {"text": "nested"}});
        assert_eq!(extract(&payload), "nested");
        let deep = json!({"data": {"data": {"output": "deeper"}}});
        assert_eq!(extract(&deep), "deeper");
    }

    #[test]
    fn string_data_value_is_returned() {
        assert_eq!(extract(&json!({"data": "plain"})), "plain");
    }

    #[test]
    fn unrecognized_shape_serializes_whole_payload() {
        let payload = json!({"status": "ok", "code": 7});
        let out = extract(&payload);
        let round: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(round, payload);
    }

    #[test]
    fn arrays_and_numbers_serialize() {
        assert_eq!(extract(&json!([1, 2])), "[1,2]");
        assert_eq!(extract(&json!(7)), "7");
    }
}
