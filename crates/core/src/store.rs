//! Shape tolerance for stored collections.
//!
//! A stored collection should be a JSON array of records, but older writers
//! left objects wrapping a `data` array or single objects. Readers never fail
//! on shape: anything that is not an array is treated as a one-element
//! sequence.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a raw stored value, falling back to a plain string when it is not
/// JSON.
pub fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Turn one decoded value into a sequence.
///
/// - arrays are used as-is
/// - objects with a `data` array yield that array
/// - anything else becomes a one-element sequence
pub fn values_from_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("data".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}

/// Sequence for a stored key. `None` (absent key) is an empty sequence.
pub fn values_from_stored(raw: Option<&str>) -> Vec<Value> {
    match raw {
        None => Vec::new(),
        Some(raw) => values_from_value(decode_value(raw)),
    }
}

/// Deserialize each value, keeping the ones that have the right shape.
///
/// Returns the decoded items and how many values were skipped.
pub fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> (Vec<T>, usize) {
    let total = values.len();
    let items: Vec<T> = values
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    let skipped = total - items.len();
    (items, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AssignmentRecord;
    use serde_json::json;

    #[test]
    fn test_absent_key_is_empty() {
        assert!(values_from_stored(None).is_empty());
    }

    #[test]
    fn test_array_is_used_as_is() {
        let v = values_from_stored(Some(r#"[{"a":1},{"a":2}]"#));
        assert_eq!(v, vec![json!({"a":1}), json!({"a":2})]);
    }

    #[test]
    fn test_data_wrapper_is_unwrapped() {
        let v = values_from_stored(Some(r#"{"data":[1,2,3]}"#));
        assert_eq!(v, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_object_without_data_array_is_singleton() {
        let v = values_from_stored(Some(r#"{"data":"x","b":1}"#));
        assert_eq!(v, vec![json!({"data":"x","b":1})]);
    }

    #[test]
    fn test_non_json_is_string_singleton() {
        let v = values_from_stored(Some("not json"));
        assert_eq!(v, vec![json!("not json")]);
    }

    #[test]
    fn test_decode_all_skips_non_objects() {
        let values = vec![json!({"profesor": "A"}), json!("stray"), json!(3)];
        let (records, skipped) = decode_all::<AssignmentRecord>(values);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 2);
    }
}
