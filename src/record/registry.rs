//! In-memory registry of record type definitions.
//!
//! Definitions are register-once: a name, once taken, cannot be rebound.
//! Lookups hand out `Arc` clones so many construction sites can share one
//! immutable definition.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{SchemaError, SchemaResult};
use super::types::RecordType;

/// Register-once catalog of record types, keyed by name.
#[derive(Debug, Default)]
pub struct RecordTypeRegistry {
    types: HashMap<String, Arc<RecordType>>,
}

impl RecordTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::AlreadyRegistered` if the name is taken.
    pub fn register(&mut self, record_type: RecordType) -> SchemaResult<()> {
        if self.types.contains_key(record_type.name()) {
            return Err(SchemaError::AlreadyRegistered {
                name: record_type.name().to_string(),
            });
        }

        tracing::debug!(
            record_type = record_type.name(),
            fields = record_type.field_count(),
            "record type registered"
        );

        self.types
            .insert(record_type.name().to_string(), Arc::new(record_type));
        Ok(())
    }

    /// Gets a shared handle to a registered record type.
    pub fn get(&self, name: &str) -> Option<Arc<RecordType>> {
        self.types.get(name).map(Arc::clone)
    }

    /// Checks whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered record types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over registered names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}
