use lazy_static::lazy_static;
use regex::Regex;

use crate::{error::CompileError, preprocess::Source, utils::quote};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Message,
    Service,
    Ident,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Comma,
    Newline,
    Eof,
}

/// A token of the cleaned source. `line` indexes [Source::lines]; `column`
/// is the 0-based character offset within that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   String,
    pub line:   usize,
    pub column: usize,
    pub length: usize,
}

impl Token {
    /// How the token is shown in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => quote(&self.text),
        }
    }
}

/// Produces tokens one at a time from a [Source]. After [TokenKind::Eof] has
/// been returned the caller must stop asking.
pub struct Scanner<'a> {
    source:     &'a Source,
    bytes:      &'a [u8],
    cursor:     usize,
    line:       usize,
    line_start: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a Source) -> Self {
        Scanner {
            source,
            bytes: source.text.as_bytes(),
            cursor: 0,
            line: 0,
            line_start: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        while matches!(self.bytes.get(self.cursor), Some(b' ' | b'\t')) {
            self.cursor += 1;
        }

        let start = self.cursor;
        let column = start - self.line_start;
        let Some(&byte) = self.bytes.get(start) else {
            return Ok(self.token(TokenKind::Eof, start, 0));
        };

        let token = match byte {
            b'\n' => {
                let token = self.token(TokenKind::Newline, start, 1);
                self.line += 1;
                self.line_start = start + 1;
                token
            }
            b'{' => self.token(TokenKind::LeftBrace, start, 1),
            b'}' => self.token(TokenKind::RightBrace, start, 1),
            b'(' => self.token(TokenKind::LeftParen, start, 1),
            b')' => self.token(TokenKind::RightParen, start, 1),
            b',' => self.token(TokenKind::Comma, start, 1),
            _ => match IDENTIFIER.find(&self.source.text[start..]) {
                Some(ident) => {
                    let kind = match ident.as_str() {
                        "message" => TokenKind::Message,
                        "service" => TokenKind::Service,
                        _ => TokenKind::Ident,
                    };
                    self.token(kind, start, ident.len())
                }
                None => {
                    let bad = self.source.text[start..].chars().next().unwrap_or('\0');
                    let span = self.source.span(self.line, column, 1);
                    return Err(CompileError::Lex(self.source.diagnostic(
                        format!("invalid character {}", quote(&bad.to_string())),
                        span,
                    )));
                }
            },
        };

        self.cursor = start + token.length;
        tracing::trace!(kind = ?token.kind, line = token.line, column = token.column, "token");
        Ok(token)
    }

    fn token(&self, kind: TokenKind, start: usize, length: usize) -> Token {
        Token {
            kind,
            text: self.source.text[start..start + length].to_string(),
            line: self.line,
            column: start - self.line_start,
            length,
        }
    }
}

/// Scan the whole source, ending with a single [TokenKind::Eof] token.
pub fn tokenize(source: &Source) -> Result<Vec<Token>, CompileError> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, preprocess::preprocess};

    fn kinds(text: &str) -> Vec<TokenKind> {
        let source = preprocess("t.idl", text).unwrap();
        tokenize(&source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_method() {
        use TokenKind::*;
        assert_eq!(
            kinds("Point add(Point, Point)"),
            vec![Ident, Ident, LeftParen, Ident, Comma, Ident, RightParen, Eof]
        );
    }

    #[test]
    fn test_keywords() {
        use TokenKind::*;
        assert_eq!(
            kinds("message service messages _service"),
            vec![Message, Service, Ident, Ident, Eof]
        );
    }

    #[test]
    fn test_positions() {
        let source = preprocess("t.idl", "message Point {\n\tint32 x_1\n}").unwrap();
        let tokens = tokenize(&source).unwrap();
        let expected = vec![
            Token { kind: TokenKind::Message,    text: "message".into(), line: 0, column: 0,  length: 7 },
            Token { kind: TokenKind::Ident,      text: "Point".into(),   line: 0, column: 8,  length: 5 },
            Token { kind: TokenKind::LeftBrace,  text: "{".into(),       line: 0, column: 14, length: 1 },
            Token { kind: TokenKind::Newline,    text: "\n".into(),      line: 0, column: 15, length: 1 },
            Token { kind: TokenKind::Ident,      text: "int32".into(),   line: 1, column: 1,  length: 5 },
            Token { kind: TokenKind::Ident,      text: "x_1".into(),     line: 1, column: 7,  length: 3 },
            Token { kind: TokenKind::Newline,    text: "\n".into(),      line: 1, column: 10, length: 1 },
            Token { kind: TokenKind::RightBrace, text: "}".into(),       line: 2, column: 0,  length: 1 },
            Token { kind: TokenKind::Eof,        text: "".into(),        line: 2, column: 1,  length: 0 },
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        let source = preprocess("t.idl", "int32 9lives").unwrap();
        let err = tokenize(&source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.column, Some(6));
        assert!(diag.message.contains("\"9\""), "got {}", diag.message);
    }

    #[test]
    fn test_invalid_character_reports_original_line() {
        let source = preprocess("t.idl", "// comment\n\nmessage M {\n\tint32 a;\n}").unwrap();
        let err = tokenize(&source).unwrap_err();
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.line, 4);
        assert_eq!(diag.column, Some(8));
        assert_eq!(diag.source_line.as_deref(), Some("\tint32 a;"));
    }

    #[test]
    fn test_non_ascii_character() {
        let source = preprocess("t.idl", "int32 é").unwrap();
        let err = tokenize(&source).unwrap_err();
        assert!(err.diagnostic().unwrap().message.contains("é"));
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_describe() {
        let source = preprocess("t.idl", "a\nb").unwrap();
        let tokens = tokenize(&source).unwrap();
        assert_eq!(tokens[0].describe(), "\"a\"");
        assert_eq!(tokens[1].describe(), "\"\\n\"");
        assert_eq!(tokens[3].describe(), "end of file");
    }
}
