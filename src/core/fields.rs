//! Typed access to JSON request payloads.
//!
//! Request bodies arrive as loose JSON objects. These helpers pull individual keys
//! out with a fixed expected type, distinguishing "absent or null" (`None`) from a
//! value of the wrong type (a validation error).

use crate::errors::{Error, Result};
use serde_json::{Map, Value as JsonValue};

/// A decoded request body.
pub type Payload = Map<String, JsonValue>;

/// Loose truthiness used by the admin panel: null, `false`, zero, and empty
/// strings/arrays/objects are all "not supplied".
#[must_use]
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
    }
}

/// Reads a string field.
pub fn text(payload: &Payload, key: &str) -> Result<Option<String>> {
    match payload.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::validation(format!("Field '{key}' must be a string"))),
    }
}

/// Reads a string field that must be present and non-blank; returns it trimmed.
pub fn required_text(payload: &Payload, key: &str) -> Result<String> {
    text(payload, key)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation(format!("Field '{key}' is required")))
}

/// Reads a 32-bit integer field.
pub fn integer(payload: &Payload, key: &str) -> Result<Option<i32>> {
    match payload.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| Error::validation(format!("Field '{key}' must be an integer"))),
        Some(_) => Err(Error::validation(format!("Field '{key}' must be an integer"))),
    }
}

/// Reads a numeric field.
pub fn number(payload: &Payload, key: &str) -> Result<Option<f64>> {
    match payload.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(Error::validation(format!("Field '{key}' must be a number"))),
    }
}

/// Reads a boolean field.
pub fn flag(payload: &Payload, key: &str) -> Result<Option<bool>> {
    match payload.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(Error::validation(format!("Field '{key}' must be a boolean"))),
    }
}

/// Reads a server-generated integer identifier from the body.
///
/// Accepts a JSON number or a numeric string. Falsy values (`null`, `0`, `""`)
/// count as missing.
pub fn record_id(payload: &Payload, key: &str) -> Result<Option<i64>> {
    match payload.get(key) {
        Some(value) if is_truthy(value) => match value {
            JsonValue::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::validation(format!("Field '{key}' must be an integer id"))),
            JsonValue::String(s) => parse_id(s).map(Some),
            _ => Err(Error::validation(format!("Field '{key}' must be an integer id"))),
        },
        _ => Ok(None),
    }
}

/// Parses an integer identifier taken from a query string or body.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::validation(format!("Invalid id '{raw}'")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn payload(value: JsonValue) -> Payload {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("Vase")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(true)));
    }

    #[test]
    fn test_text_distinguishes_missing_from_wrong_type() {
        let body = payload(json!({"name": "Vase", "nothing": null, "count": 3}));
        assert_eq!(text(&body, "name").unwrap().as_deref(), Some("Vase"));
        assert_eq!(text(&body, "nothing").unwrap(), None);
        assert_eq!(text(&body, "absent").unwrap(), None);
        assert!(matches!(text(&body, "count"), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_required_text_trims_and_rejects_blank() {
        let body = payload(json!({"name": "  Vase ", "blank": "   "}));
        assert_eq!(required_text(&body, "name").unwrap(), "Vase");
        assert!(required_text(&body, "blank").is_err());
        assert!(required_text(&body, "absent").is_err());
    }

    #[test]
    fn test_integer_rejects_fractions_and_overflow() {
        let body = payload(json!({"a": 7, "b": 1.5, "c": 9_999_999_999_i64}));
        assert_eq!(integer(&body, "a").unwrap(), Some(7));
        assert!(integer(&body, "b").is_err());
        assert!(integer(&body, "c").is_err());
    }

    #[test]
    fn test_record_id_accepts_numbers_and_numeric_strings() {
        let body = payload(json!({"a": 5, "b": "12", "c": 0, "d": "", "e": "x"}));
        assert_eq!(record_id(&body, "a").unwrap(), Some(5));
        assert_eq!(record_id(&body, "b").unwrap(), Some(12));
        assert_eq!(record_id(&body, "c").unwrap(), None);
        assert_eq!(record_id(&body, "d").unwrap(), None);
        assert_eq!(record_id(&body, "missing").unwrap(), None);
        assert!(record_id(&body, "e").is_err());
    }

    #[test]
    fn test_number_and_flag() {
        let body = payload(json!({"price": 10.5, "visible": false, "bad": "yes"}));
        assert_eq!(number(&body, "price").unwrap(), Some(10.5));
        assert_eq!(flag(&body, "visible").unwrap(), Some(false));
        assert!(flag(&body, "bad").is_err());
        assert!(number(&body, "bad").is_err());
    }
}
