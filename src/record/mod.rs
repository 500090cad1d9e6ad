//! Schema-validated record subsystem.
//!
//! # Design Principles
//!
//! - Definitions are immutable once created and shareable across threads
//! - Construction is all-or-nothing: a valid instance or a complete diagnostic
//! - Every field error is collected in one pass, never just the first
//! - Defaults are copied or built fresh per instance, never shared
//! - Unknown input keys are ignored
//! - Construction is deterministic and side-effect free

mod constructor;
mod errors;
mod instance;
mod registry;
mod types;
mod value;

pub use constructor::RecordConstructor;
pub use errors::{FieldError, FieldErrorReason, SchemaError, SchemaResult, ValidationError};
pub use instance::RecordInstance;
pub use registry::RecordTypeRegistry;
pub use types::{DefaultPolicy, FieldSpec, FieldType, RecordType, ScalarType};
pub use value::FieldValue;
