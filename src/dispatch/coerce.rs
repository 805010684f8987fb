//! Typed reads over loosely-typed JSON payloads.
//!
//! Numeric fields arrive either as JSON numbers or as numeric text (form
//! posts, LLM tool arguments). Both are accepted; anything else is a
//! validation failure naming the field. Values are never defaulted to zero.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid {0}: must be a number")]
    NotANumber(&'static str),

    #[error("Invalid {0}: must be a whole number")]
    NotAnInteger(&'static str),

    #[error("Invalid {0}: must be a string")]
    NotAString(&'static str),

    #[error("Invalid {0}: must be true or false")]
    NotABoolean(&'static str),

    #[error("Invalid {field}: {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Required fields missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),

    #[error("Invalid list options: {0}")]
    ListOptions(String),
}

pub fn coerce_number(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::NotANumber(field)),
    }
}

pub fn coerce_integer(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    if let Value::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Ok(i);
        }
    }
    if let Value::String(s) = value {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Ok(i);
        }
    }
    let n = coerce_number(field, value)?;
    if n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
        return Err(ValidationError::NotAnInteger(field));
    }
    Ok(n as i64)
}

/// A JSON object read field by field.
///
/// Absent keys and explicit `null` both read as "not supplied", except for
/// [`Payload::nullable_string`] where `null` means "clear".
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Payload<'a> {
    pub fn new(value: &'a Value, what: &'static str) -> Result<Self, ValidationError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ValidationError::NotAnObject(what)),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Present, not null, and not a blank string.
    pub fn is_present(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    pub fn require(&self, keys: &[&'static str]) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = keys
            .iter()
            .copied()
            .filter(|key| !self.is_present(key))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Fails on the first key that is neither accepted nor silently ignored.
    pub fn reject_unknown(
        &self,
        accepted: &[&str],
        ignored: &[&str],
    ) -> Result<(), ValidationError> {
        match self
            .fields
            .keys()
            .find(|key| !accepted.contains(&key.as_str()) && !ignored.contains(&key.as_str()))
        {
            Some(key) => Err(ValidationError::UnknownField(key.clone())),
            None => Ok(()),
        }
    }

    pub fn number(&self, key: &'static str) -> Result<Option<f64>, ValidationError> {
        self.get(key).map(|v| coerce_number(key, v)).transpose()
    }

    pub fn integer(&self, key: &'static str) -> Result<Option<i64>, ValidationError> {
        self.get(key).map(|v| coerce_integer(key, v)).transpose()
    }

    pub fn string(&self, key: &'static str) -> Result<Option<String>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ValidationError::NotAString(key)),
        }
    }

    /// `None` when absent, `Some(None)` when explicitly null.
    pub fn nullable_string(
        &self,
        key: &'static str,
    ) -> Result<Option<Option<String>>, ValidationError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
            Some(_) => Err(ValidationError::NotAString(key)),
        }
    }

    pub fn boolean(&self, key: &'static str) -> Result<Option<bool>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(ValidationError::NotABoolean(key)),
            },
            Some(_) => Err(ValidationError::NotABoolean(key)),
        }
    }
}

pub fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
    reason: &'static str,
) -> Result<i64, ValidationError> {
    if value < min || value > max {
        Err(ValidationError::OutOfRange { field, reason })
    } else {
        Ok(value)
    }
}

/// A record period year, 2000 through 2100.
pub fn check_year(value: i64) -> Result<i32, ValidationError> {
    Ok(check_range("year", value, 2000, 2100, "must be between 2000 and 2100")? as i32)
}

pub fn check_month(value: i64) -> Result<u32, ValidationError> {
    Ok(check_range("month", value, 1, 12, "must be between 1 and 12")? as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(coerce_number("rate", &json!(12.5)).unwrap(), 12.5);
        assert_eq!(coerce_number("rate", &json!(" 7 ")).unwrap(), 7.0);
        assert_eq!(coerce_integer("count", &json!("3")).unwrap(), 3);
        assert_eq!(coerce_integer("count", &json!(4.0)).unwrap(), 4);
    }

    #[test]
    fn non_numbers_are_rejected_with_field_name() {
        let err = coerce_number("weekendsWorked", &json!("abc")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid weekendsWorked: must be a number");

        assert!(coerce_number("x", &json!("")).is_err());
        assert!(coerce_number("x", &json!("NaN")).is_err());
        assert!(coerce_number("x", &json!(true)).is_err());
        assert_eq!(
            coerce_integer("month", &json!(2.5)),
            Err(ValidationError::NotAnInteger("month"))
        );
    }

    #[test]
    fn require_lists_every_missing_field() {
        let value = json!({"employeeId": 3, "weekendsWorked": null, "notes": "x"});
        let payload = Payload::new(&value, "data").unwrap();
        let err = payload
            .require(&["employeeId", "weekendsWorked", "holidaysWorked"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Required fields missing: weekendsWorked, holidaysWorked"
        );
    }

    #[test]
    fn zero_counts_as_present() {
        let value = json!({"holidaysWorked": 0, "name": "  "});
        let payload = Payload::new(&value, "data").unwrap();
        assert!(payload.is_present("holidaysWorked"));
        assert!(!payload.is_present("name"));
    }

    #[test]
    fn nullable_string_distinguishes_null_from_absent() {
        let value = json!({"notes": null});
        let payload = Payload::new(&value, "data").unwrap();
        assert_eq!(payload.nullable_string("notes").unwrap(), Some(None));
        assert_eq!(payload.nullable_string("cpf").unwrap(), None);
        assert_eq!(payload.string("notes").unwrap(), None);
    }

    #[test]
    fn unknown_keys_are_reported() {
        let value = json!({"name": "Ana", "id": 4, "nickname": "A"});
        let payload = Payload::new(&value, "data").unwrap();
        assert_eq!(
            payload.reject_unknown(&["name"], &["id"]),
            Err(ValidationError::UnknownField("nickname".to_string()))
        );
    }

    #[test]
    fn booleans_accept_form_strings() {
        let value = json!({"a": "TRUE", "b": false, "c": 1});
        let payload = Payload::new(&value, "data").unwrap();
        assert_eq!(payload.boolean("a").unwrap(), Some(true));
        assert_eq!(payload.boolean("b").unwrap(), Some(false));
        assert_eq!(payload.boolean("c"), Err(ValidationError::NotABoolean("c")));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let value = json!([1, 2]);
        assert_eq!(
            Payload::new(&value, "data").unwrap_err().to_string(),
            "data must be a JSON object"
        );
    }
}
