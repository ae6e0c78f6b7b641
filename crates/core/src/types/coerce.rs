//! Loose coercions for JSON request values.
//!
//! Clients of this API historically sent booleans and ids in whatever shape
//! their form library produced (`"1"`, `1`, `true`, `"on"`). These helpers give
//! every such field one well-defined reading.

use serde_json::Value;
use thiserror::Error;

/// A truthy id value that is not an integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id: {0}")]
pub struct InvalidId(pub String);

/// JavaScript-style truthiness of a JSON value.
///
/// Falsy: `null`, `false`, `0`, `-0`, `""`. Everything else, including empty
/// arrays and objects and the string `"false"`, is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Read an optional reference id sent as a number or a numeric string.
///
/// Falsy values and a zero id mean "not set".
///
/// # Errors
///
/// Returns [`InvalidId`] for any other value that is not an `i32`.
pub fn optional_id(value: Option<&Value>) -> Result<Option<i32>, InvalidId> {
    let Some(value) = value.filter(|v| is_truthy(v)) else {
        return Ok(None);
    };

    let id = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };

    id.map(|id| (id != 0).then_some(id))
        .ok_or_else(|| InvalidId(value.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_falsy_values() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_optional_id_unset() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!("0")] {
            assert_eq!(optional_id(Some(&value)), Ok(None), "{value}");
        }
        assert_eq!(optional_id(None), Ok(None));
    }

    #[test]
    fn test_optional_id_numbers_and_strings() {
        assert_eq!(optional_id(Some(&json!(5))), Ok(Some(5)));
        assert_eq!(optional_id(Some(&json!("3"))), Ok(Some(3)));
        assert_eq!(optional_id(Some(&json!(" 12 "))), Ok(Some(12)));
    }

    #[test]
    fn test_optional_id_rejects_non_integers() {
        for value in [json!("abc"), json!(true), json!(1.5), json!(9_999_999_999_i64), json!([1])] {
            assert!(optional_id(Some(&value)).is_err(), "{value}");
        }
    }
}
