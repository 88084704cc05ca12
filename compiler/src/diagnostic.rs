use std::fmt;

use serde::Serialize;

const HIGHLIGHT: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// A positioned compiler report.
///
/// `line` is the 1-based line in the file as the user wrote it, comments and
/// blank lines included. `column` is the 0-based character offset of the
/// offending token in that line and `span_length` its width, so a caller can
/// underline the exact token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message:     String,
    pub file:        String,
    pub line:        u32,
    pub column:      Option<u32>,
    pub span_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Diagnostic {
            message:     message.into(),
            file:        file.into(),
            line,
            column:      None,
            span_length: None,
            source_line: None,
        }
    }

    pub fn with_span(mut self, column: u32, length: u32) -> Self {
        self.column = Some(column);
        self.span_length = Some(length);
        self
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }

    fn location(&self) -> String {
        match self.column {
            Some(column) => format!("{}:{}:{}", self.file, self.line, column),
            None => format!("{}:{}", self.file, self.line),
        }
    }

    /// Multi-line report: the message, then the source line prefixed with its
    /// location and the offending span highlighted, then a caret underline.
    /// `color` switches the highlight to ANSI bold red.
    pub fn render(&self, color: bool) -> String {
        let prefix = format!("[{}] ", self.location());
        let mut out = format!("{}:\n", self.message);

        let Some(line) = &self.source_line else {
            out.push_str(prefix.trim_end());
            out.push('\n');
            return out;
        };

        let Some(column) = self.column else {
            out.push_str(&prefix);
            out.push_str(line);
            out.push('\n');
            return out;
        };

        let width = self.span_length.unwrap_or(1).max(1) as usize;
        let (before, span, after) = split_chars(line, column as usize, width);

        out.push_str(&prefix);
        out.push_str(before);
        if color && !span.is_empty() {
            out.push_str(HIGHLIGHT);
            out.push_str(span);
            out.push_str(RESET);
        } else {
            out.push_str(span);
        }
        out.push_str(after);
        out.push('\n');

        let pad = prefix.chars().count() + before.chars().count();
        out.push_str(&" ".repeat(pad));
        out.push_str(&"^".repeat(width));
        out.push('\n');
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.message)
    }
}

/// Split `line` around `len` characters starting at character `start`,
/// clamping both ends to the line.
fn split_chars(line: &str, start: usize, len: usize) -> (&str, &str, &str) {
    let byte_at = |n: usize| {
        line.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    };
    let begin = byte_at(start);
    let end = byte_at(start + len);
    (&line[..begin], &line[begin..end], &line[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        Diagnostic::new("expected \"{\" after \"Point\", but got \"int32\"", "geo.idl", 2)
            .with_span(14, 5)
            .with_source_line("message Point int32 {")
    }

    #[test]
    fn test_display_location() {
        assert_eq!(
            sample().to_string(),
            "geo.idl:2:14: expected \"{\" after \"Point\", but got \"int32\""
        );
        assert_eq!(Diagnostic::new("oops", "a.idl", 7).to_string(), "a.idl:7: oops");
    }

    #[test]
    fn test_render_underlines_span() {
        let rendered = sample().render(false);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[1], "[geo.idl:2:14] message Point int32 {");
        let caret = lines[2].find('^').unwrap();
        assert_eq!(&lines[1][caret..caret + 5], "int32");
        assert_eq!(lines[2].trim(), "^^^^^");
    }

    #[test]
    fn test_render_color_wraps_span() {
        let rendered = sample().render(true);
        assert!(rendered.contains("\x1b[1;31mint32\x1b[0m"));
    }

    #[test]
    fn test_render_span_past_end_of_line() {
        let diag = Diagnostic::new("expected \"{\"", "geo.idl", 1)
            .with_span(13, 1)
            .with_source_line("message Point");
        let rendered = diag.render(false);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[1], "[geo.idl:1:13] message Point");
        assert_eq!(lines[2].find('^'), Some("[geo.idl:1:13] message Point".len()));
    }

    #[test]
    fn test_render_without_source_line() {
        let rendered = Diagnostic::new("file is empty", "x.idl", 0).render(false);
        assert_eq!(rendered, "file is empty:\n[x.idl:0]\n");
    }
}
