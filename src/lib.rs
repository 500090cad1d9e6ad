//! recval - declarative, schema-validated records
//!
//! A record type declares named fields with static types, default policies,
//! and optional/required semantics. Construction turns raw, untyped input
//! into a fully typed instance or rejects it with a complete per-field
//! diagnostic.

pub mod record;
