//! Validated record instances.

use std::collections::HashMap;

use super::value::FieldValue;

/// One validated instantiation of a record type.
///
/// Owns its field values exclusively and preserves declaration order. The
/// identity (field names and types) is fixed at construction; values of
/// collection-typed fields may be mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInstance {
    entries: Vec<(String, FieldValue)>,
    index: HashMap<String, usize>,
}

impl RecordInstance {
    pub(crate) fn new(entries: Vec<(String, FieldValue)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, (name, _))| (name.clone(), position))
            .collect();
        Self { entries, index }
    }

    /// Reads a field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.index
            .get(name)
            .map(|&position| &self.entries[position].1)
    }

    /// Mutable access to a field by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        let position = *self.index.get(name)?;
        Some(&mut self.entries[position].1)
    }

    /// Mutable access to a sequence field's backing container
    pub fn sequence_mut(&mut self, name: &str) -> Option<&mut Vec<FieldValue>> {
        self.get_mut(name)?.as_sequence_mut()
    }

    /// True if the named field resolved to the absent marker
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.get(name), Some(FieldValue::Absent))
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterates fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Exports the instance as a JSON object in declaration order.
    ///
    /// Absent fields are omitted, so "not supplied" survives a round trip
    /// distinct from "present but empty".
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (name, value) in &self.entries {
            if !value.is_absent() {
                obj.insert(name.clone(), value.to_json());
            }
        }
        serde_json::Value::Object(obj)
    }
}
