//! Record type definitions.
//!
//! Supported field types:
//! - int: 64-bit signed integer, exact
//! - float: 64-bit floating point
//! - bool: Boolean
//! - string: UTF-8 string
//! - timestamp: timezone-aware UTC datetime
//! - sequence: homogeneous sequence with a scalar element type
//!
//! A definition is immutable once created and safe to share across many
//! construction calls concurrently.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::value::FieldValue;

/// Scalar types a field (or sequence element) may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    String,
    Timestamp,
}

impl ScalarType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Timestamp => "timestamp",
        }
    }

    /// Whether a constructed value conforms to this scalar type
    pub fn admits(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (ScalarType::Int, FieldValue::Int(_))
                | (ScalarType::Float, FieldValue::Float(_))
                | (ScalarType::Bool, FieldValue::Bool(_))
                | (ScalarType::String, FieldValue::Str(_))
                | (ScalarType::Timestamp, FieldValue::Timestamp(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Declared type of a field: a scalar or a one-level sequence of scalars.
///
/// Sequences nest no further; the element type is scalar by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    Bool,
    String,
    Timestamp,
    /// Homogeneous sequence with the given element type
    Sequence(ScalarType),
}

impl FieldType {
    /// Whether a constructed value conforms to this field type
    pub fn admits(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldType::Int, FieldValue::Int(_)) => true,
            (FieldType::Float, FieldValue::Float(_)) => true,
            (FieldType::Bool, FieldValue::Bool(_)) => true,
            (FieldType::String, FieldValue::Str(_)) => true,
            (FieldType::Timestamp, FieldValue::Timestamp(_)) => true,
            (FieldType::Sequence(element), FieldValue::Sequence(items)) => {
                items.iter().all(|item| element.admits(item))
            }
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::String => write!(f, "string"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::Sequence(element) => write!(f, "sequence<{}>", element),
        }
    }
}

/// How a field resolves when absent from input.
///
/// `Static` stores a constant that is cloned per instance; the clone owns a
/// fresh backing container for sequence values. `EmptyContainer` is a
/// factory: every construction builds a brand-new empty sequence, so no
/// pre-built container can ever be observed by two instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// No default; the field is required unless marked optional
    None,
    /// Constant default, copied per instance
    Static(FieldValue),
    /// Fresh empty sequence built per instance
    EmptyContainer,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        DefaultPolicy::None
    }
}

/// One field declaration: name, type, default policy, optionality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within the record type
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// Default resolution when the field is absent from input
    #[serde(default, skip_serializing_if = "is_no_default")]
    pub default: DefaultPolicy,
    /// Whether the field may resolve to the absent marker
    #[serde(default)]
    pub optional: bool,
}

fn is_no_default(policy: &DefaultPolicy) -> bool {
    matches!(policy, DefaultPolicy::None)
}

impl FieldSpec {
    /// A required field with no default
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: DefaultPolicy::None,
            optional: false,
        }
    }

    /// An optional field that resolves to the absent marker when not supplied
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: DefaultPolicy::None,
            optional: true,
        }
    }

    /// A field with a constant default, copied per instance
    pub fn with_default(
        name: impl Into<String>,
        field_type: FieldType,
        value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: DefaultPolicy::Static(value.into()),
            optional: false,
        }
    }

    /// A sequence field defaulting to a fresh empty container per instance
    pub fn fresh_empty(name: impl Into<String>, element: ScalarType) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Sequence(element),
            default: DefaultPolicy::EmptyContainer,
            optional: false,
        }
    }

    /// A field is required iff it has no default and is not optional
    pub fn is_required(&self) -> bool {
        matches!(self.default, DefaultPolicy::None) && !self.optional
    }
}

/// An immutable record type definition: named, ordered, typed fields.
///
/// Created once via [`RecordType::define`] and reused for any number of
/// construction calls; `&RecordType` is safe to share across threads.
#[derive(Debug, Clone, Serialize)]
pub struct RecordType {
    name: String,
    fields: Vec<FieldSpec>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RecordType {
    /// Defines a record type from an ordered field list.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if two fields share a name, a field name is
    /// empty, a static default does not conform to its field's type, or a
    /// fresh-empty default sits on a non-sequence field.
    pub fn define(name: impl Into<String>, fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        let name = name.into();
        let mut index = HashMap::with_capacity(fields.len());

        for (position, spec) in fields.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(SchemaError::EmptyFieldName { record_type: name });
            }
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    record_type: name,
                    name: spec.name.clone(),
                });
            }
            match &spec.default {
                DefaultPolicy::None => {}
                DefaultPolicy::Static(value) => {
                    if !spec.field_type.admits(value) {
                        return Err(SchemaError::DefaultTypeMismatch {
                            field: spec.name.clone(),
                            expected: spec.field_type.to_string(),
                            got: value.type_name().to_string(),
                        });
                    }
                }
                DefaultPolicy::EmptyContainer => {
                    if !matches!(spec.field_type, FieldType::Sequence(_)) {
                        return Err(SchemaError::InvalidEmptyDefault {
                            field: spec.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            name,
            fields,
            index,
        })
    }

    /// Record type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

// Deserialization re-runs `define` so a decoded definition carries the same
// structural guarantees as a programmatic one.
impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawRecordType {
            name: String,
            fields: Vec<FieldSpec>,
        }

        let raw = RawRecordType::deserialize(deserializer)?;
        RecordType::define(raw.name, raw.fields).map_err(serde::de::Error::custom)
    }
}
