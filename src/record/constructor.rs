//! Validator/constructor: raw input in, validated instance or complete
//! diagnostic out.
//!
//! Validation semantics:
//! - Fields are processed in declaration order
//! - ALL field errors are collected in one pass; no short-circuit
//! - Absent fields resolve through their default policy
//! - Unknown input keys are ignored
//! - Construction is all-or-nothing
//!
//! Coercion rules:
//! - int: JSON integer only, must fit i64; no silent float truncation
//! - float: any JSON number, integers widen
//! - bool: JSON boolean only
//! - string: JSON string only
//! - timestamp: ISO-8601 string (RFC 3339, or a naive datetime taken as UTC)
//! - sequence: JSON array, elements coerced independently; the first failing
//!   element aborts the field and is reported as one field-level error

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::errors::{FieldError, ValidationError};
use super::instance::RecordInstance;
use super::types::{DefaultPolicy, FieldType, RecordType, ScalarType};
use super::value::FieldValue;

/// Constructor that validates raw input against a record type.
///
/// `construct` is a pure function of the definition and the input: no side
/// effects, no logging, safe to call concurrently against one shared
/// definition.
pub struct RecordConstructor<'a> {
    record_type: &'a RecordType,
}

impl<'a> RecordConstructor<'a> {
    /// Creates a constructor for the given record type.
    pub fn new(record_type: &'a RecordType) -> Self {
        Self { record_type }
    }

    /// Validates raw input and builds an instance.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` carrying every field-level failure, in
    /// declaration order, when any field is missing or fails coercion. No
    /// instance is produced on error.
    pub fn construct(&self, raw: &Value) -> Result<RecordInstance, ValidationError> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                return Err(ValidationError::new(
                    self.record_type.name(),
                    vec![FieldError::type_mismatch(
                        "$root",
                        "object",
                        json_type_name(raw),
                    )],
                ));
            }
        };

        let mut entries = Vec::with_capacity(self.record_type.field_count());
        let mut errors = Vec::new();

        for spec in self.record_type.fields() {
            match obj.get(&spec.name) {
                // null counts as not-supplied for optional fields
                Some(Value::Null) if spec.optional => {
                    entries.push((spec.name.clone(), FieldValue::Absent));
                }
                Some(Value::Null) => {
                    errors.push(FieldError::type_mismatch(
                        &spec.name,
                        spec.field_type.to_string(),
                        "null",
                    ));
                }
                Some(value) => match coerce_value(value, &spec.field_type) {
                    Ok(coerced) => entries.push((spec.name.clone(), coerced)),
                    Err(got) => {
                        errors.push(FieldError::type_mismatch(
                            &spec.name,
                            spec.field_type.to_string(),
                            got,
                        ));
                    }
                },
                None => match &spec.default {
                    DefaultPolicy::Static(value) => {
                        entries.push((spec.name.clone(), value.clone()));
                    }
                    // a brand-new container per construction
                    DefaultPolicy::EmptyContainer => {
                        entries.push((spec.name.clone(), FieldValue::Sequence(Vec::new())));
                    }
                    DefaultPolicy::None if spec.optional => {
                        entries.push((spec.name.clone(), FieldValue::Absent));
                    }
                    DefaultPolicy::None => {
                        errors.push(FieldError::missing_required(&spec.name));
                    }
                },
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::new(self.record_type.name(), errors));
        }

        Ok(RecordInstance::new(entries))
    }
}

impl RecordType {
    /// Validates raw input against this definition. See
    /// [`RecordConstructor::construct`].
    pub fn construct(&self, raw: &Value) -> Result<RecordInstance, ValidationError> {
        RecordConstructor::new(self).construct(raw)
    }
}

/// Coerces a non-null raw value to a field type.
///
/// On failure returns the description of what the input held, for the
/// error's `got` slot.
fn coerce_value(value: &Value, field_type: &FieldType) -> Result<FieldValue, String> {
    match field_type {
        FieldType::Int => coerce_scalar(value, ScalarType::Int),
        FieldType::Float => coerce_scalar(value, ScalarType::Float),
        FieldType::Bool => coerce_scalar(value, ScalarType::Bool),
        FieldType::String => coerce_scalar(value, ScalarType::String),
        FieldType::Timestamp => coerce_scalar(value, ScalarType::Timestamp),
        FieldType::Sequence(element) => {
            let arr = match value.as_array() {
                Some(arr) => arr,
                None => return Err(json_type_name(value).to_string()),
            };
            let mut items = Vec::with_capacity(arr.len());
            for (position, item) in arr.iter().enumerate() {
                match coerce_scalar(item, *element) {
                    Ok(coerced) => items.push(coerced),
                    // first failing element aborts the whole field
                    Err(got) => return Err(format!("{} at index {}", got, position)),
                }
            }
            Ok(FieldValue::Sequence(items))
        }
    }
}

/// Coerces a raw value to a scalar type.
fn coerce_scalar(value: &Value, scalar: ScalarType) -> Result<FieldValue, String> {
    match scalar {
        ScalarType::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Int(i))
                } else if n.is_u64() {
                    Err("int out of range".to_string())
                } else {
                    Err("float".to_string())
                }
            }
            other => Err(json_type_name(other).to_string()),
        },
        ScalarType::Float => match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => Ok(FieldValue::Float(f)),
                None => Err("number".to_string()),
            },
            other => Err(json_type_name(other).to_string()),
        },
        ScalarType::Bool => match value {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            other => Err(json_type_name(other).to_string()),
        },
        ScalarType::String => match value {
            Value::String(s) => Ok(FieldValue::Str(s.clone())),
            other => Err(json_type_name(other).to_string()),
        },
        ScalarType::Timestamp => match value {
            Value::String(s) => match parse_timestamp(s) {
                Some(ts) => Ok(FieldValue::Timestamp(ts)),
                None => Err(format!("unparseable timestamp \"{}\"", s)),
            },
            other => Err(json_type_name(other).to_string()),
        },
    }
}

/// Parses an ISO-8601 timestamp string.
///
/// RFC 3339 first; naive forms without an offset are taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::errors::FieldErrorReason;
    use crate::record::types::FieldSpec;
    use chrono::TimeZone;
    use serde_json::json;

    fn user_type() -> RecordType {
        RecordType::define(
            "user",
            vec![
                FieldSpec::required("id", FieldType::Int),
                FieldSpec::with_default("name", FieldType::String, "John Doe"),
                FieldSpec::optional("signup_ts", FieldType::Timestamp),
                FieldSpec::fresh_empty("friends", ScalarType::Int),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_input_produces_instance() {
        let user = user_type();
        let instance = user
            .construct(&json!({
                "id": 7,
                "name": "Alice",
                "signup_ts": "2017-06-01T12:22:00Z",
                "friends": [1, 2, 3]
            }))
            .unwrap();

        assert_eq!(instance.get("id").unwrap().as_int(), Some(7));
        assert_eq!(instance.get("name").unwrap().as_str(), Some("Alice"));
        assert_eq!(
            instance.get("signup_ts").unwrap().as_timestamp(),
            Some(Utc.with_ymd_and_hms(2017, 6, 1, 12, 22, 0).unwrap())
        );
        assert_eq!(instance.get("friends").unwrap().as_sequence().unwrap().len(), 3);
    }

    #[test]
    fn test_defaults_resolve_for_absent_fields() {
        let user = user_type();
        let instance = user.construct(&json!({ "id": 7 })).unwrap();

        assert_eq!(instance.get("name").unwrap().as_str(), Some("John Doe"));
        assert!(instance.get("signup_ts").unwrap().is_absent());
        assert_eq!(instance.get("friends").unwrap().as_sequence().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_required_field() {
        let user = user_type();
        let err = user.construct(&json!({})).unwrap_err();

        assert_eq!(err.error_count(), 1);
        let field_err = &err.errors()[0];
        assert_eq!(field_err.field, "id");
        assert_eq!(field_err.reason, FieldErrorReason::MissingRequired);
    }

    #[test]
    fn test_type_mismatch_reports_expected_and_got() {
        let user = user_type();
        let err = user.construct(&json!({ "id": "x" })).unwrap_err();

        assert_eq!(err.error_count(), 1);
        let field_err = &err.errors()[0];
        assert_eq!(field_err.field, "id");
        assert_eq!(field_err.reason, FieldErrorReason::TypeMismatch);
        assert_eq!(field_err.expected.as_deref(), Some("int"));
        assert_eq!(field_err.got.as_deref(), Some("string"));
    }

    #[test]
    fn test_float_not_silently_truncated_to_int() {
        let user = user_type();
        let err = user.construct(&json!({ "id": 7.0 })).unwrap_err();
        assert_eq!(err.errors()[0].got.as_deref(), Some("float"));
    }

    #[test]
    fn test_int_out_of_range() {
        let user = user_type();
        let err = user.construct(&json!({ "id": u64::MAX })).unwrap_err();
        assert_eq!(err.errors()[0].got.as_deref(), Some("int out of range"));
    }

    #[test]
    fn test_all_errors_collected_in_declaration_order() {
        let user = user_type();
        let err = user
            .construct(&json!({
                "name": 5,
                "friends": "nope"
            }))
            .unwrap_err();

        assert_eq!(err.error_count(), 3);
        assert_eq!(err.errors()[0].field, "id");
        assert_eq!(err.errors()[0].reason, FieldErrorReason::MissingRequired);
        assert_eq!(err.errors()[1].field, "name");
        assert_eq!(err.errors()[1].reason, FieldErrorReason::TypeMismatch);
        assert_eq!(err.errors()[2].field, "friends");
        assert_eq!(err.errors()[2].expected.as_deref(), Some("sequence<int>"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let user = user_type();
        let instance = user
            .construct(&json!({ "id": 7, "nickname": "Al" }))
            .unwrap();
        assert!(instance.get("nickname").is_none());
    }

    #[test]
    fn test_non_object_root_rejected() {
        let user = user_type();
        let err = user.construct(&json!([1, 2])).unwrap_err();
        assert_eq!(err.errors()[0].field, "$root");
        assert_eq!(err.errors()[0].got.as_deref(), Some("array"));
    }

    #[test]
    fn test_null_for_optional_field_is_absent() {
        let user = user_type();
        let instance = user
            .construct(&json!({ "id": 7, "signup_ts": null }))
            .unwrap();
        assert!(instance.get("signup_ts").unwrap().is_absent());
    }

    #[test]
    fn test_null_for_required_field_rejected() {
        let user = user_type();
        let err = user.construct(&json!({ "id": null })).unwrap_err();
        assert_eq!(err.errors()[0].got.as_deref(), Some("null"));
    }

    #[test]
    fn test_sequence_element_failure_is_one_field_error() {
        let user = user_type();
        let err = user
            .construct(&json!({ "id": 7, "friends": [1, "two", 3] }))
            .unwrap_err();

        assert_eq!(err.error_count(), 1);
        let field_err = &err.errors()[0];
        assert_eq!(field_err.field, "friends");
        assert_eq!(field_err.got.as_deref(), Some("string at index 1"));
    }

    #[test]
    fn test_sequence_floats_rejected_for_int_elements() {
        let user = user_type();
        let err = user
            .construct(&json!({ "id": 7, "friends": [1, 2.5] }))
            .unwrap_err();
        assert_eq!(err.errors()[0].got.as_deref(), Some("float at index 1"));
    }

    #[test]
    fn test_timestamp_parse_variants() {
        let user = user_type();
        for raw in [
            "2017-06-01T12:22:00Z",
            "2017-06-01T12:22:00+00:00",
            "2017-06-01T12:22:00",
            "2017-06-01 12:22:00",
        ] {
            let instance = user
                .construct(&json!({ "id": 1, "signup_ts": raw }))
                .unwrap();
            assert_eq!(
                instance.get("signup_ts").unwrap().as_timestamp(),
                Some(Utc.with_ymd_and_hms(2017, 6, 1, 12, 22, 0).unwrap()),
                "failed for {}",
                raw
            );
        }
    }

    #[test]
    fn test_unparseable_timestamp_rejected() {
        let user = user_type();
        let err = user
            .construct(&json!({ "id": 1, "signup_ts": "broken" }))
            .unwrap_err();
        let field_err = &err.errors()[0];
        assert_eq!(field_err.expected.as_deref(), Some("timestamp"));
        assert!(field_err.got.as_deref().unwrap().contains("broken"));
    }

    #[test]
    fn test_supplied_value_overrides_static_default() {
        let user = user_type();
        let instance = user
            .construct(&json!({ "id": 7, "name": "Alice" }))
            .unwrap();
        assert_eq!(instance.get("name").unwrap().as_str(), Some("Alice"));
    }

    #[test]
    fn test_float_field_widens_integers() {
        let record_type = RecordType::define(
            "reading",
            vec![FieldSpec::required("score", FieldType::Float)],
        )
        .unwrap();
        let instance = record_type.construct(&json!({ "score": 100 })).unwrap();
        assert_eq!(instance.get("score").unwrap().as_float(), Some(100.0));
    }

    #[test]
    fn test_bool_field_exact() {
        let record_type = RecordType::define(
            "flag",
            vec![FieldSpec::required("active", FieldType::Bool)],
        )
        .unwrap();
        assert!(record_type.construct(&json!({ "active": true })).is_ok());
        assert!(record_type.construct(&json!({ "active": 1 })).is_err());
    }
}
