//! Recursive-descent parser for the IDL grammar:
//!
//! ```text
//! Code        → Stmt Extra | NEWLINE Extra | ε
//! Stmt        → MsgStmt | ServiceStmt
//! Extra       → NEWLINE Stmt Extra | ε                  (at EOF)
//! MsgStmt     → "message" IDENT "{" NEWLINE Member MembersTail "}"
//! Member      → IDENT IDENT
//! MembersTail → NEWLINE Member MembersTail | NEWLINE     (before "}")
//! ServiceStmt → "service" IDENT "{" NEWLINE Func FuncsTail "}"
//! Func        → IDENT IDENT "(" ArgList ")"
//! ArgList     → IDENT ("," IDENT)* | ε                  (before ")")
//! FuncsTail   → NEWLINE Func FuncsTail | NEWLINE         (before "}")
//! ```
//!
//! The tail productions are written as loops. Messages and services are
//! registered in the [Schema] as soon as their closing brace is read, which
//! is where duplicate names are caught.

use hustgen_schema::{Member, Message, Method, Schema, Service, Span, Type};

use crate::{
    error::CompileError,
    preprocess::Source,
    tokenizer::{Scanner, Token, TokenKind},
    utils::quote,
};

pub struct Parser<'a> {
    source:   &'a Source,
    scanner:  Scanner<'a>,
    token:    Token,
    previous: Token,
    schema:   Schema,
}

/// Parse a preprocessed source into a schema that has not been verified yet.
pub fn parse_schema(source: &Source) -> Result<Schema, CompileError> {
    Parser::new(source)?.parse()
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source) -> Result<Self, CompileError> {
        let mut scanner = Scanner::new(source);
        let token = scanner.next_token()?;
        Ok(Parser {
            source,
            scanner,
            previous: token.clone(),
            token,
            schema: Schema::new(),
        })
    }

    pub fn parse(mut self) -> Result<Schema, CompileError> {
        self.parse_code()?;
        if self.token.kind != TokenKind::Eof {
            return Err(self.syntax_error(format!(
                "expected end of file, but got {}",
                self.token.describe()
            )));
        }
        Ok(self.schema)
    }

    fn parse_code(&mut self) -> Result<(), CompileError> {
        match self.token.kind {
            TokenKind::Eof => Ok(()),
            TokenKind::Message | TokenKind::Service => {
                self.parse_stmt()?;
                self.parse_extra()
            }
            TokenKind::Newline => self.parse_extra(),
            _ => Err(self.syntax_error(format!(
                "expected \"message\" or \"service\", but got {}",
                self.token.describe()
            ))),
        }
    }

    fn parse_stmt(&mut self) -> Result<(), CompileError> {
        match self.token.kind {
            TokenKind::Message => {
                let message = self.parse_message()?;
                self.register_message(message)
            }
            TokenKind::Service => {
                let service = self.parse_service()?;
                self.register_service(service)
            }
            _ => Err(self.syntax_error(format!(
                "expected \"message\" or \"service\" after {}, but got {}",
                self.previous.describe(),
                self.token.describe()
            ))),
        }
    }

    fn parse_extra(&mut self) -> Result<(), CompileError> {
        loop {
            match self.token.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    self.parse_stmt()?;
                }
                TokenKind::Eof => return Ok(()),
                _ => {
                    return Err(self.syntax_error(format!(
                        "expected \"\\n\" after {}, but got {}",
                        self.previous.describe(),
                        self.token.describe()
                    )))
                }
            }
        }
    }

    fn parse_message(&mut self) -> Result<Message, CompileError> {
        self.expect(TokenKind::Message, "\"message\"")?;
        let name = self.expect(TokenKind::Ident, "a message name")?;
        self.expect(TokenKind::LeftBrace, "\"{\"")?;
        self.expect_body_start("message", &name)?;

        let mut members = Vec::new();
        loop {
            members.push(self.parse_member()?);
            self.expect(TokenKind::Newline, "\"\\n\"")?;
            if self.token.kind == TokenKind::RightBrace {
                self.advance()?;
                break;
            }
        }

        Ok(Message::new(name.text.clone(), self.span(&name), members))
    }

    fn parse_member(&mut self) -> Result<Member, CompileError> {
        let type_tok = self.expect(TokenKind::Ident, "a member type or \"}\"")?;
        let type_ = Type::at(type_tok.text.clone(), self.span(&type_tok));
        let name = self.expect(TokenKind::Ident, "a member name")?;
        Ok(Member::new(type_, name.text.clone(), self.span(&name)))
    }

    fn parse_service(&mut self) -> Result<Service, CompileError> {
        self.expect(TokenKind::Service, "\"service\"")?;
        let name = self.expect(TokenKind::Ident, "a service name")?;
        self.expect(TokenKind::LeftBrace, "\"{\"")?;
        self.expect_body_start("service", &name)?;

        let mut methods = Vec::new();
        loop {
            methods.push(self.parse_method()?);
            self.expect(TokenKind::Newline, "\"\\n\"")?;
            if self.token.kind == TokenKind::RightBrace {
                self.advance()?;
                break;
            }
        }

        // Owners are assigned only now that the method list is complete.
        Ok(Service::new(name.text.clone(), self.span(&name), methods))
    }

    fn parse_method(&mut self) -> Result<Method, CompileError> {
        let ret_tok = self.expect(TokenKind::Ident, "a return type or \"}\"")?;
        let response_type = Type::at(ret_tok.text.clone(), self.span(&ret_tok));
        let name = self.expect(TokenKind::Ident, "a method name")?;
        self.expect(TokenKind::LeftParen, "\"(\"")?;
        let request_types = self.parse_arg_list()?;
        self.expect(TokenKind::RightParen, "\")\"")?;
        Ok(Method::new(name.text.clone(), self.span(&name), response_type, request_types))
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Type>, CompileError> {
        let mut args = Vec::new();
        match self.token.kind {
            TokenKind::RightParen => return Ok(args),
            TokenKind::Ident => {}
            _ => {
                return Err(self.syntax_error(format!(
                    "expected a type or \")\" after \"(\", but got {}",
                    self.token.describe()
                )))
            }
        }

        loop {
            let tok = self.expect(TokenKind::Ident, "a parameter type")?;
            args.push(Type::at(tok.text.clone(), self.span(&tok)));
            match self.token.kind {
                TokenKind::Comma => self.advance()?,
                TokenKind::RightParen => return Ok(args),
                _ => {
                    return Err(self.syntax_error(format!(
                        "expected \",\" or \")\" after {}, but got {}",
                        self.previous.describe(),
                        self.token.describe()
                    )))
                }
            }
        }
    }

    /// `{` must be followed by a newline and at least one entry.
    fn expect_body_start(&mut self, what: &str, name: &Token) -> Result<(), CompileError> {
        if self.token.kind == TokenKind::RightBrace {
            return Err(self.empty_body(what, name));
        }
        self.expect(TokenKind::Newline, "\"\\n\"")?;
        if self.token.kind == TokenKind::RightBrace {
            return Err(self.empty_body(what, name));
        }
        Ok(())
    }

    fn empty_body(&self, what: &str, name: &Token) -> CompileError {
        let entry = if what == "message" { "member" } else { "method" };
        self.syntax_error(format!(
            "{} {} must declare at least one {}",
            what,
            quote(&name.text),
            entry
        ))
    }

    fn register_message(&mut self, message: Message) -> Result<(), CompileError> {
        tracing::debug!(name = %message.name, members = message.members.len(), "parsed message");
        self.schema.insert_message(message).map_err(|dup| {
            let first = self.schema.messages[&dup.name].span.line;
            CompileError::Semantic(self.source.diagnostic(
                format!("repeated message {}, first declared at line {}", quote(&dup.name), first),
                dup.span,
            ))
        })
    }

    fn register_service(&mut self, service: Service) -> Result<(), CompileError> {
        tracing::debug!(name = %service.name, methods = service.methods.len(), "parsed service");
        self.schema.insert_service(service).map_err(|dup| {
            let first = self.schema.services[&dup.name].span.line;
            CompileError::Semantic(self.source.diagnostic(
                format!("repeated service {}, first declared at line {}", quote(&dup.name), first),
                dup.span,
            ))
        })
    }

    fn advance(&mut self) -> Result<(), CompileError> {
        let next = self.scanner.next_token()?;
        self.previous = std::mem::replace(&mut self.token, next);
        Ok(())
    }

    /// Consume a token of `kind` and return it, or fail with
    /// "expected `what` after <previous>, but got <current>".
    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, CompileError> {
        if self.token.kind != kind {
            return Err(self.syntax_error(format!(
                "expected {} after {}, but got {}",
                what,
                self.previous.describe(),
                self.token.describe()
            )));
        }
        let tok = self.token.clone();
        self.advance()?;
        Ok(tok)
    }

    fn span(&self, token: &Token) -> Span {
        self.source.span(token.line, token.column, token.length)
    }

    /// Syntax error positioned on the current token.
    fn syntax_error(&self, message: String) -> CompileError {
        CompileError::Syntax(self.source.diagnostic(message, self.span(&self.token)))
    }
}
