use hustgen_schema::Span;

use crate::{diagnostic::Diagnostic, error::CompileError};

/// Source text ready for scanning.
///
/// `text` holds the retained lines joined by `\n` with no trailing newline.
/// Line `i` of `text` is `lines[i]` and came from original line
/// `line_map[i]` (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub file:     String,
    pub text:     String,
    pub lines:    Vec<String>,
    pub line_map: Vec<u32>,
    original:     Vec<String>,
}

/// Strip `//` comments and blank lines from `raw`.
///
/// A `/` that does not start a `//` comment is a lex error.
pub fn preprocess(file: &str, raw: &str) -> Result<Source, CompileError> {
    let raw = raw.trim_end_matches([' ', '\t', '\r', '\n']);
    let original: Vec<String> = if raw.is_empty() {
        Vec::new()
    } else {
        raw.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    };

    let mut lines = Vec::new();
    let mut line_map = Vec::new();

    for (index, full) in original.iter().enumerate() {
        let line_no = index as u32 + 1;
        let code = match full.find("//") {
            Some(at) => &full[..at],
            None => full.as_str(),
        };
        if let Some(at) = code.find('/') {
            let column = code[..at].chars().count() as u32;
            return Err(CompileError::Lex(
                Diagnostic::new("expected \"//\" to start a comment", file, line_no)
                    .with_span(column, 1)
                    .with_source_line(full.clone()),
            ));
        }
        if code.chars().all(|c| c == ' ' || c == '\t') {
            continue;
        }
        lines.push(code.to_string());
        line_map.push(line_no);
    }

    tracing::debug!(file, original = original.len(), retained = lines.len(), "preprocessed source");

    Ok(Source {
        file: file.to_string(),
        text: lines.join("\n"),
        lines,
        line_map,
        original,
    })
}

impl Source {
    /// Original 1-based line number of cleaned line `index`. Positions past the
    /// last retained line, such as end of input, map to the last line.
    pub fn original_line(&self, index: usize) -> u32 {
        self.line_map
            .get(index)
            .or_else(|| self.line_map.last())
            .copied()
            .unwrap_or(1)
    }

    /// The line as the user wrote it, comment included.
    pub fn original_text(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        self.original.get(index).map(String::as_str)
    }

    pub fn span(&self, line: usize, column: usize, length: usize) -> Span {
        Span::new(self.original_line(line), column as u32, length as u32)
    }

    pub fn diagnostic(&self, message: impl Into<String>, span: Span) -> Diagnostic {
        let diag = Diagnostic::new(message, self.file.as_str(), span.line)
            .with_span(span.column, span.length);
        match self.original_text(span.line) {
            Some(text) => diag.with_source_line(text),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_strip_comments_and_blank_lines() {
        let raw = "// header\nmessage M {\n\n\t// inner\n\tint32 a // trailing\n  \t \n}\n\n\n";
        let source = preprocess("m.idl", raw).unwrap();
        assert_eq!(source.lines, vec!["message M {", "\tint32 a ", "}"]);
        assert_eq!(source.line_map, vec![2, 5, 7]);
        assert_eq!(source.text, "message M {\n\tint32 a \n}");
    }

    #[test]
    fn test_original_text_keeps_comment() {
        let source = preprocess("m.idl", "message M {\n\tint32 a // x\n}").unwrap();
        assert_eq!(source.original_text(2), Some("\tint32 a // x"));
        assert_eq!(source.original_text(0), None);
        assert_eq!(source.original_text(9), None);
    }

    #[test]
    fn test_crlf_line_endings() {
        let source = preprocess("m.idl", "message M {\r\n\tint32 a\r\n}\r\n").unwrap();
        assert_eq!(source.lines, vec!["message M {", "\tint32 a", "}"]);
        assert_eq!(source.line_map, vec![1, 2, 3]);
    }

    #[test]
    fn test_single_slash_is_lex_error() {
        let err = preprocess("m.idl", "message M {\n\tint32 a / b\n}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, Some(9));
        assert_eq!(diag.span_length, Some(1));
    }

    #[test]
    fn test_slash_before_comment_is_lex_error() {
        let err = preprocess("m.idl", "a/b // c").unwrap_err();
        assert_eq!(err.diagnostic().unwrap().column, Some(1));
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        let source = preprocess("e.idl", "  \n// nothing\n\t\n").unwrap();
        assert!(source.lines.is_empty());
        assert_eq!(source.text, "");
        assert_eq!(source.original_line(0), 1);
        assert!(preprocess("e.idl", "").unwrap().lines.is_empty());
    }

    #[test]
    fn test_original_line_past_end_maps_to_last() {
        let source = preprocess("m.idl", "\n\nmessage M {\n\tint32 a\n}").unwrap();
        assert_eq!(source.original_line(0), 3);
        assert_eq!(source.original_line(2), 5);
        assert_eq!(source.original_line(10), 5);
    }
}
