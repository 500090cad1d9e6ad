//! Error types for record definition and construction.
//!
//! Two-level taxonomy:
//! - `SchemaError`: structurally invalid definitions, raised at definition or
//!   registration time, never during construction
//! - `ValidationError`: bad input, raised at construction time with the
//!   complete ordered list of per-field failures

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for definition and registration operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Structural defects in a record type definition.
///
/// Fatal to the definition call; a `RecordType` that exists is always
/// structurally valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields share a name
    #[error("duplicate field '{name}' in record type '{record_type}'")]
    DuplicateField { record_type: String, name: String },

    /// A field was declared with an empty name
    #[error("empty field name in record type '{record_type}'")]
    EmptyFieldName { record_type: String },

    /// A static default value does not conform to the field's declared type
    #[error("default for field '{field}' does not match its type: expected {expected}, got {got}")]
    DefaultTypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    /// A fresh-empty-container default on a field that is not sequence-typed
    #[error("fresh-empty default on non-sequence field '{field}'")]
    InvalidEmptyDefault { field: String },

    /// A record type with this name is already registered
    #[error("record type '{name}' is already registered")]
    AlreadyRegistered { name: String },
}

/// Why a single field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorReason {
    /// Required field absent from input
    MissingRequired,
    /// Supplied value could not be coerced to the declared type
    TypeMismatch,
}

impl FieldErrorReason {
    /// Returns the wire string for this reason
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorReason::MissingRequired => "missing_required",
            FieldErrorReason::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for FieldErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single field-level diagnostic produced during construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as declared in the record type
    pub field: String,
    /// Failure classification
    pub reason: FieldErrorReason,
    /// Expected type, for type mismatches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// What the input actually held, for type mismatches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub got: Option<String>,
}

impl FieldError {
    /// A required field was absent from input
    pub fn missing_required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: FieldErrorReason::MissingRequired,
            expected: None,
            got: None,
        }
    }

    /// A supplied value did not coerce to the declared type
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            reason: FieldErrorReason::TypeMismatch,
            expected: Some(expected.into()),
            got: Some(got.into()),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            FieldErrorReason::MissingRequired => {
                write!(f, "field '{}': missing required value", self.field)
            }
            FieldErrorReason::TypeMismatch => write!(
                f,
                "field '{}': expected {}, got {}",
                self.field,
                self.expected.as_deref().unwrap_or("?"),
                self.got.as_deref().unwrap_or("?"),
            ),
        }
    }
}

/// The accumulated outcome of a failed construction.
///
/// Carries every field-level failure in declaration order. A routine,
/// recoverable outcome of bad input; the caller decides whether to retry,
/// reject, or report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    record_type: String,
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn new(record_type: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            record_type: record_type.into(),
            errors,
        }
    }

    /// Name of the record type that rejected the input
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// All field-level failures, in declaration order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Number of failing fields
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the field-level failures
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Consumes the error, yielding the failure list
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation of record type '{}' failed with {} error(s)",
            self.record_type,
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(FieldErrorReason::MissingRequired.code(), "missing_required");
        assert_eq!(FieldErrorReason::TypeMismatch.code(), "type_mismatch");
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::type_mismatch("age", "int", "string");
        let display = format!("{}", err);
        assert!(display.contains("age"));
        assert!(display.contains("int"));
        assert!(display.contains("string"));

        let err = FieldError::missing_required("id");
        assert!(format!("{}", err).contains("missing required"));
    }

    #[test]
    fn test_validation_error_display_lists_all_fields() {
        let err = ValidationError::new(
            "user",
            vec![
                FieldError::missing_required("id"),
                FieldError::type_mismatch("name", "string", "int"),
            ],
        );
        let display = format!("{}", err);
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("'id'"));
        assert!(display.contains("'name'"));
    }

    #[test]
    fn test_field_error_serializes_without_empty_fields() {
        let err = FieldError::missing_required("id");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "id");
        assert_eq!(json["reason"], "missing_required");
        assert!(json.get("expected").is_none());
        assert!(json.get("got").is_none());
    }

    #[test]
    fn test_type_mismatch_serializes_expected_and_got() {
        let err = FieldError::type_mismatch("id", "int", "string");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["reason"], "type_mismatch");
        assert_eq!(json["expected"], "int");
        assert_eq!(json["got"], "string");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::DuplicateField {
            record_type: "user".into(),
            name: "id".into(),
        };
        assert!(format!("{}", err).contains("duplicate field 'id'"));
    }
}
