//! hustgen
//!
//! The crate code generators depend on. It bundles the compiler front end
//! with the schema model it produces.
//!
//! - `compile` / `compile_source` (re-exported from the compiler)
//! - The `Schema` model and builtin type tables
//! - `schema_to_json` for dumping a verified schema

pub use hustgen_compiler::{check_source, check_with, compile, compile_source, compile_with, CompileOptions};
pub use hustgen_compiler::{CompileError, Diagnostic, ErrorKind, Rule, Violation};
pub use hustgen_schema::{Member, Message, Method, Schema, Service, Span, Type, TypeKind};

/// Pretty-printed JSON of a schema: messages and services in declaration
/// order, each type as `{ "kind", "name" }`.
pub fn schema_to_json(schema: &Schema) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(schema)
}

pub mod error {
    pub use hustgen_compiler::error::{CompileError, ErrorKind};
}

pub mod schema {
    pub use hustgen_schema::*;
}
