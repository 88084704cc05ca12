use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, source files must be smaller than {limit} bytes", path.display())]
    FileTooLarge {
        path:  PathBuf,
        size:  u64,
        limit: u64,
    },

    #[error("lex error at {0}")]
    Lex(Diagnostic),

    #[error("syntax error at {0}")]
    Syntax(Diagnostic),

    #[error("semantic error at {0}")]
    Semantic(Diagnostic),
}

/// Broad category of a [CompileError]. Every category ends the compilation
/// of the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Lex,
    Syntax,
    Semantic,
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Io { .. } | CompileError::FileTooLarge { .. } => ErrorKind::Io,
            CompileError::Lex(_) => ErrorKind::Lex,
            CompileError::Syntax(_) => ErrorKind::Syntax,
            CompileError::Semantic(_) => ErrorKind::Semantic,
        }
    }

    /// The positioned report behind a lex, syntax or semantic error.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CompileError::Lex(d) | CompileError::Syntax(d) | CompileError::Semantic(d) => Some(d),
            CompileError::Io { .. } | CompileError::FileTooLarge { .. } => None,
        }
    }

    /// A [Diagnostic] for any error. I/O failures have no position and are
    /// reported against line 0 of the file.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Io { path, .. } | CompileError::FileTooLarge { path, .. } => {
                Diagnostic::new(self.to_string(), path.display().to_string(), 0)
            }
            CompileError::Lex(d) | CompileError::Syntax(d) | CompileError::Semantic(d) => d.clone(),
        }
    }
}
