use std::collections::HashSet;

use hustgen_schema::{Message, Method, Schema, Service, Span, Type, TypeKind};

use crate::{diagnostic::Diagnostic, error::CompileError, preprocess::Source, utils::quote};

/// The checks run over a parsed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    DuplicateMember,
    DuplicateMethod,
    UndefinedType,
    MisplacedVoid,
    MultipleStreams,
    StreamMember,
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Rule::DuplicateMember => "duplicate_member",
            Rule::DuplicateMethod => "duplicate_method",
            Rule::UndefinedType   => "undefined_type",
            Rule::MisplacedVoid   => "misplaced_void",
            Rule::MultipleStreams => "multiple_streams",
            Rule::StreamMember    => "stream_member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule:       Rule,
    pub diagnostic: Diagnostic,
}

/// Check `schema` and, when it passes, rewrite every `f(void)` request list
/// to an empty one. Returns the first violation found.
pub fn verify_schema(schema: &mut Schema, source: &Source) -> Result<(), CompileError> {
    let violations = collect_violations(schema, source);
    tracing::debug!(file = %source.file, violations = violations.len(), "verified schema");
    if let Some(first) = violations.into_iter().next() {
        return Err(CompileError::Semantic(first.diagnostic));
    }
    for service in schema.services.values_mut() {
        for method in &mut service.methods {
            if method.request_types.len() == 1 && method.request_types[0].is_void() {
                method.request_types.clear();
            }
        }
    }
    Ok(())
}

/// Every violation in `schema`, messages first, then services, each in
/// declaration order. The schema is not modified.
pub fn collect_violations(schema: &Schema, source: &Source) -> Vec<Violation> {
    let mut checker = Checker { schema, source, violations: Vec::new() };
    for message in schema.messages.values() {
        checker.check_message(message);
    }
    for service in schema.services.values() {
        checker.check_service(service);
    }
    checker.violations
}

struct Checker<'a> {
    schema:     &'a Schema,
    source:     &'a Source,
    violations: Vec<Violation>,
}

impl Checker<'_> {
    fn report(&mut self, rule: Rule, message: String, span: Span) {
        let diagnostic = self.source.diagnostic(message, span);
        self.violations.push(Violation { rule, diagnostic });
    }

    fn check_message(&mut self, message: &Message) {
        let mut seen = HashSet::new();
        for member in &message.members {
            if !seen.insert(member.name.as_str()) {
                self.report(
                    Rule::DuplicateMember,
                    format!("repeated member {} in message {}", quote(&member.name), quote(&message.name)),
                    member.span,
                );
            }
            let ty = &member.type_;
            match ty.kind() {
                TypeKind::Stream => self.report(
                    Rule::StreamMember,
                    format!(
                        "{} cannot be the type of member {} in message {}",
                        quote(ty.name()),
                        quote(&member.name),
                        quote(&message.name)
                    ),
                    ty.span(),
                ),
                TypeKind::Scalar if ty.is_void() => self.report(
                    Rule::MisplacedVoid,
                    format!(
                        "\"void\" cannot be the type of member {} in message {}",
                        quote(&member.name),
                        quote(&message.name)
                    ),
                    ty.span(),
                ),
                TypeKind::Scalar => {}
                TypeKind::MessageRef => {
                    let context = format!("in message {}", quote(&message.name));
                    self.check_defined(ty, &context);
                }
            }
        }
    }

    fn check_service(&mut self, service: &Service) {
        let mut seen = HashSet::new();
        for method in &service.methods {
            if !seen.insert(method.name.as_str()) {
                self.report(
                    Rule::DuplicateMethod,
                    format!("repeated method {} in service {}", quote(&method.name), quote(&service.name)),
                    method.span,
                );
            }
            self.check_method(service, method);
        }
    }

    fn check_method(&mut self, service: &Service, method: &Method) {
        let context = format!("in method {}.{}", service.name, method.name);

        if method.response_type.kind() == TypeKind::MessageRef {
            self.check_defined(&method.response_type, &context);
        }

        let sole = method.request_types.len() == 1;
        let mut streaming = false;
        for ty in &method.request_types {
            match ty.kind() {
                TypeKind::Scalar if ty.is_void() && !sole => self.report(
                    Rule::MisplacedVoid,
                    format!("\"void\" must be the only parameter {}", context),
                    ty.span(),
                ),
                TypeKind::Scalar => {}
                TypeKind::Stream if streaming => self.report(
                    Rule::MultipleStreams,
                    format!("at most one stream parameter is allowed {}", context),
                    ty.span(),
                ),
                TypeKind::Stream => streaming = true,
                TypeKind::MessageRef => self.check_defined(ty, &context),
            }
        }
    }

    fn check_defined(&mut self, ty: &Type, context: &str) {
        if self.schema.message(ty.name()).is_none() {
            self.report(
                Rule::UndefinedType,
                format!("undefined type {} {}", quote(ty.name()), context),
                ty.span(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, parser::parse_schema, preprocess::preprocess};

    fn violations(text: &str) -> Vec<Violation> {
        let source = preprocess("v.idl", text).unwrap();
        let schema = parse_schema(&source).unwrap();
        collect_violations(&schema, &source)
    }

    fn rules(text: &str) -> Vec<Rule> {
        violations(text).into_iter().map(|v| v.rule).collect()
    }

    fn verify(text: &str) -> Result<Schema, CompileError> {
        let source = preprocess("v.idl", text)?;
        let mut schema = parse_schema(&source)?;
        verify_schema(&mut schema, &source)?;
        Ok(schema)
    }

    #[test]
    fn test_valid_schema_has_no_violations() {
        let text = "message P {\n\tint32 x\n\tstring s\n}\nservice S {\n\tP get(int32, istream)\n\tvoid ping(void)\n\tostream open()\n}";
        assert!(violations(text).is_empty());
    }

    #[test]
    fn test_duplicate_member() {
        let found = violations("message P {\n\tint32 x\n\tint64 x\n}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::DuplicateMember);
        assert_eq!(found[0].diagnostic.line, 3);
        assert_eq!(found[0].diagnostic.message, "repeated member \"x\" in message \"P\"");
    }

    #[test]
    fn test_duplicate_method() {
        let found = violations("service S {\n\tvoid a()\n\tint32 a(int32)\n}");
        assert_eq!(found[0].rule, Rule::DuplicateMethod);
        assert_eq!(found[0].diagnostic.line, 3);
        assert_eq!(found[0].diagnostic.column, Some(7));
    }

    #[test]
    fn test_undefined_types_everywhere() {
        let text = "message P {\n\tQ q\n}\nservice S {\n\tFoo get(Bar)\n}";
        let found = violations(text);
        let names: Vec<_> = found.iter().map(|v| v.diagnostic.message.as_str()).collect();
        assert_eq!(
            names,
            [
                "undefined type \"Q\" in message \"P\"",
                "undefined type \"Foo\" in method S.get",
                "undefined type \"Bar\" in method S.get",
            ]
        );
        assert!(found.iter().all(|v| v.rule == Rule::UndefinedType));
    }

    #[test]
    fn test_message_may_reference_later_message() {
        assert!(violations("message A {\n\tB b\n}\nmessage B {\n\tint32 x\n}").is_empty());
    }

    #[test]
    fn test_void_only_request_list_is_cleared() {
        let schema = verify("service S {\n\tvoid ping(void)\n}").unwrap();
        assert!(schema.services["S"].methods[0].request_types.is_empty());
    }

    #[test]
    fn test_void_mixed_with_parameters_is_rejected() {
        assert_eq!(rules("service S {\n\tvoid f(void, int32)\n}"), [Rule::MisplacedVoid]);
        assert_eq!(rules("service S {\n\tvoid f(int32, void)\n}"), [Rule::MisplacedVoid]);
        assert_eq!(rules("service S {\n\tvoid f(void, void)\n}"), [Rule::MisplacedVoid, Rule::MisplacedVoid]);
    }

    #[test]
    fn test_void_member_is_rejected() {
        assert_eq!(rules("message P {\n\tvoid v\n}"), [Rule::MisplacedVoid]);
    }

    #[test]
    fn test_two_streams_rejected() {
        let found = violations("service S {\n\tvoid f(stream, ostream)\n}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::MultipleStreams);
        assert_eq!(found[0].diagnostic.column, Some(16));
        assert!(violations("service S {\n\tvoid f(stream, int32)\n}").is_empty());
    }

    #[test]
    fn test_stream_member_rejected() {
        for stream in ["stream", "istream", "ostream"] {
            let text = format!("message P {{\n\t{} s\n}}", stream);
            assert_eq!(rules(&text), [Rule::StreamMember]);
        }
    }

    #[test]
    fn test_all_violations_are_collected_in_order() {
        let text = "message P {\n\tstream s\n\tint32 s\n}\nservice S {\n\tvoid f(stream, stream)\n\tvoid f()\n}";
        assert_eq!(
            rules(text),
            [Rule::StreamMember, Rule::DuplicateMember, Rule::MultipleStreams, Rule::DuplicateMethod]
        );
    }

    #[test]
    fn test_verify_returns_first_violation() {
        let err = verify("message P {\n\tFoo a\n\tstream b\n}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.diagnostic().unwrap().message, "undefined type \"Foo\" in message \"P\"");
    }

    #[test]
    fn test_failed_verification_leaves_void_list() {
        let source = preprocess("v.idl", "service S {\n\tvoid ping(void)\n\tFoo bad()\n}").unwrap();
        let mut schema = parse_schema(&source).unwrap();
        assert!(verify_schema(&mut schema, &source).is_err());
        assert_eq!(schema.services["S"].methods[0].request_types, vec![Type::new("void")]);
    }

    #[test]
    fn test_rule_codes_are_distinct() {
        let all = [
            Rule::DuplicateMember,
            Rule::DuplicateMethod,
            Rule::UndefinedType,
            Rule::MisplacedVoid,
            Rule::MultipleStreams,
            Rule::StreamMember,
        ];
        let codes: HashSet<_> = all.iter().map(Rule::code).collect();
        assert_eq!(codes.len(), all.len());
    }
}
