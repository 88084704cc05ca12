use std::fs;
use std::path::Path;

use hustgen_schema::Schema;

use crate::{
    error::CompileError,
    parser::parse_schema,
    preprocess::preprocess,
    verifier::{collect_violations, verify_schema, Violation},
};

/// Source files of this size or larger are rejected before reading.
pub const MAX_SOURCE_BYTES: u64 = 10 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub max_source_bytes: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { max_source_bytes: MAX_SOURCE_BYTES }
    }
}

/// Compile IDL text into a verified `Schema`.
/// `file` is only used to label diagnostics.
pub fn compile_source(file: &str, text: &str) -> Result<Schema, CompileError> {
    let source = preprocess(file, text)?;
    let mut schema = parse_schema(&source)?;
    verify_schema(&mut schema, &source)?;
    tracing::debug!(
        file,
        messages = schema.messages.len(),
        services = schema.services.len(),
        "compiled schema"
    );
    Ok(schema)
}

/// Read and compile one IDL file with the default options.
pub fn compile(path: impl AsRef<Path>) -> Result<Schema, CompileError> {
    compile_with(path, &CompileOptions::default())
}

pub fn compile_with(path: impl AsRef<Path>, options: &CompileOptions) -> Result<Schema, CompileError> {
    let path = path.as_ref();
    let text = read_source(path, options)?;
    compile_source(&path.display().to_string(), &text)
}

/// Like [compile_source], but instead of stopping at the first semantic
/// violation returns all of them. Lex and syntax errors are still fatal.
/// An empty list means the text compiles.
pub fn check_source(file: &str, text: &str) -> Result<Vec<Violation>, CompileError> {
    let source = preprocess(file, text)?;
    let schema = parse_schema(&source)?;
    Ok(collect_violations(&schema, &source))
}

pub fn check_with(path: impl AsRef<Path>, options: &CompileOptions) -> Result<Vec<Violation>, CompileError> {
    let path = path.as_ref();
    let text = read_source(path, options)?;
    check_source(&path.display().to_string(), &text)
}

fn read_source(path: &Path, options: &CompileOptions) -> Result<String, CompileError> {
    let io_err = |source| CompileError::Io { path: path.to_path_buf(), source };

    let size = fs::metadata(path).map_err(io_err)?.len();
    if size >= options.max_source_bytes {
        return Err(CompileError::FileTooLarge {
            path:  path.to_path_buf(),
            size,
            limit: options.max_source_bytes,
        });
    }

    fs::read_to_string(path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_compile_source() {
        let schema = compile_source("m.idl", "message M {\n\tint32 a\n}\nservice S {\n\tM get(int32)\n}").unwrap();
        assert_eq!(schema.messages.len(), 1);
        assert_eq!(schema.services.len(), 1);
    }

    #[test]
    fn test_check_source_collects_every_violation() {
        let text = "message M {\n\tFoo a\n\tstream b\n}\nservice S {\n\tBar get()\n}";
        let found = check_source("m.idl", text).unwrap();
        assert_eq!(found.len(), 3);
        assert!(compile_source("m.idl", text).is_err());
    }

    #[test]
    fn test_check_source_stops_at_syntax_error() {
        let err = check_source("m.idl", "message M {\n}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = compile("/definitely/not/here.idl").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, CompileError::Io { .. }));
    }

    #[test]
    fn test_default_limit_is_ten_megabytes() {
        assert_eq!(CompileOptions::default().max_source_bytes, 10 * 1024 * 1024);
    }
}
