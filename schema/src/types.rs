use indexmap::IndexMap;
use serde::Serialize;

use crate::builtin::{classify, is_stream, is_void, scalar_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Scalar,
    Stream,
    MessageRef,
}

/// Location of a token in the user's file: 1-based original line, 0-based
/// column within that line, and length in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line:   u32,
    pub column: u32,
    pub length: u32,
}

impl Span {
    pub fn new(line: u32, column: u32, length: u32) -> Self {
        Span { line, column, length }
    }
}

/// A type as written in the IDL. The kind is derived from the name when the
/// value is built and cannot be changed afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Type {
    kind: TypeKind,
    name: String,
    #[serde(skip)]
    span: Span,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self::at(name, Span::default())
    }

    pub fn at(name: impl Into<String>, span: Span) -> Self {
        let name = name.into();
        Type {
            kind: classify(&name),
            name,
            span,
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_void(&self) -> bool {
        is_void(&self.name)
    }

    pub fn is_stream(&self) -> bool {
        is_stream(&self.name)
    }

    pub fn width(&self) -> Option<usize> {
        scalar_width(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub type_: Type,
    pub name:  String,
    #[serde(skip)]
    pub span:  Span,
}

impl Member {
    pub fn new(type_: Type, name: impl Into<String>, span: Span) -> Self {
        Member { type_, name: name.into(), span }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub name:    String,
    pub members: Vec<Member>,
    #[serde(skip)]
    pub span:    Span,
}

impl Message {
    pub fn new(name: impl Into<String>, span: Span, members: Vec<Member>) -> Self {
        Message { name: name.into(), members, span }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Method {
    pub name:          String,
    pub request_types: Vec<Type>,
    pub response_type: Type,
    #[serde(skip)]
    pub span:          Span,
    /// Name of the owning service, the key of that service in [Schema::services].
    service: String,
}

impl Method {
    /// A method not yet attached to a service. [Service::new] sets the owner.
    pub fn new(name: impl Into<String>, span: Span, response_type: Type, request_types: Vec<Type>) -> Self {
        Method {
            name: name.into(),
            request_types,
            response_type,
            span,
            service: String::new(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// The single stream parameter, if the method takes one.
    pub fn stream_parameter(&self) -> Option<&Type> {
        self.request_types.iter().find(|t| t.kind() == TypeKind::Stream)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub name:    String,
    pub methods: Vec<Method>,
    #[serde(skip)]
    pub span:    Span,
}

impl Service {
    /// Builds the service and points every method back at it. The method list
    /// must be complete; methods added later have no owner.
    pub fn new(name: impl Into<String>, span: Span, mut methods: Vec<Method>) -> Self {
        let name = name.into();
        for method in &mut methods {
            method.service = name.clone();
        }
        Service { name, methods, span }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

// Where something was written is not part of what it is: spans never take
// part in equality, so comments and blank lines cannot change a schema.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.type_ == other.type_ && self.name == other.name
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.members == other.members
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.request_types == other.request_types
            && self.response_type == other.response_type
            && self.service == other.service
    }
}

impl PartialEq for Service {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.methods == other.methods
    }
}

impl Eq for Type {}
impl Eq for Member {}
impl Eq for Message {}
impl Eq for Method {}
impl Eq for Service {}

/// Symbol table for one compilation unit. Messages and services are separate
/// namespaces and both keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub messages: IndexMap<String, Message>,
    pub services: IndexMap<String, Service>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.services.is_empty()
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.get(name)
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Registers a message. A name that is already taken hands the rejected
    /// message back untouched.
    pub fn insert_message(&mut self, message: Message) -> Result<(), Message> {
        if self.messages.contains_key(&message.name) {
            return Err(message);
        }
        self.messages.insert(message.name.clone(), message);
        Ok(())
    }

    pub fn insert_service(&mut self, service: Service) -> Result<(), Service> {
        if self.services.contains_key(&service.name) {
            return Err(service);
        }
        self.services.insert(service.name.clone(), service);
        Ok(())
    }

    pub fn service_of(&self, method: &Method) -> Option<&Service> {
        self.services.get(method.service())
    }

    /// Every method of every service, services in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.services.values().flat_map(|s| s.methods.iter())
    }

    pub fn request_types(&self) -> impl Iterator<Item = &Type> {
        self.methods().flat_map(|m| m.request_types.iter())
    }

    pub fn response_types(&self) -> impl Iterator<Item = &Type> {
        self.methods().map(|m| &m.response_type)
    }
}
