//! Builtin type names and their metadata.
//!
//! These tables are shared read-only by the compiler and every backend, so a
//! change here is a change to the IDL itself. Bump [BUILTIN_TABLE_VERSION]
//! whenever a name or width is added.

use crate::types::TypeKind;

pub const BUILTIN_TABLE_VERSION: u32 = 1;

pub const VOID: &str = "void";

pub const BUILTIN_TYPES: [&str; 15] = [
    "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64", "uint64",
    "float32", "float64", "string", "void", "stream", "istream", "ostream",
];

pub const STREAM_TYPES: [&str; 3] = ["stream", "istream", "ostream"];

/// Fixed-width scalars and their size in bytes.
pub const SCALAR_WIDTHS: [(&str, usize); 10] = [
    ("int8",    1),
    ("uint8",   1),
    ("int16",   2),
    ("uint16",  2),
    ("int32",   4),
    ("uint32",  4),
    ("float32", 4),
    ("int64",   8),
    ("uint64",  8),
    ("float64", 8),
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

pub fn is_stream(name: &str) -> bool {
    STREAM_TYPES.contains(&name)
}

pub fn is_void(name: &str) -> bool {
    name == VOID
}

/// Byte width of a fixed-width scalar, `None` for `string`, `void`, streams
/// and message references.
pub fn scalar_width(name: &str) -> Option<usize> {
    SCALAR_WIDTHS
        .iter()
        .find(|(scalar, _)| *scalar == name)
        .map(|(_, width)| *width)
}

/// Classify a type name. Anything outside the builtin table is taken to be a
/// message reference; whether that message exists is for the verifier to say.
pub fn classify(name: &str) -> TypeKind {
    if is_stream(name) {
        TypeKind::Stream
    } else if is_builtin(name) {
        TypeKind::Scalar
    } else {
        TypeKind::MessageRef
    }
}
