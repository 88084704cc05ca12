//! hustgen-compiler
//!
//! This crate implements the front end of the hustgen IDL compiler:
//!  1) A preprocessor that strips `//` comments and blank lines while keeping
//!     a map back to the user's line numbers,
//!  2) A scanner producing positioned tokens,
//!  3) A hand-written recursive-descent parser that fills a `Schema`,
//!  4) A semantic verifier (duplicate names, undefined types, stream and
//!     `void` placement),
//!  5) Error types (`CompileError`) carrying structured `Diagnostic`s.
//!
//! Each call to [`compile`] or [`compile_source`] owns its own `Schema`, so
//! independent files may be compiled from different threads.

pub mod error;
pub mod diagnostic;
pub mod utils;
pub mod preprocess;
pub mod tokenizer;
pub mod parser;
pub mod verifier;
pub mod compiler;

pub use compiler::{check_source, check_with, compile, compile_source, compile_with, CompileOptions, MAX_SOURCE_BYTES};
pub use diagnostic::Diagnostic;
pub use error::{CompileError, ErrorKind};
pub use verifier::{collect_violations, verify_schema, Rule, Violation};
