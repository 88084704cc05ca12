//! The resolved symbol graph produced by the hustgen front end.
//!
//! A [Schema] owns every message and service declared in one IDL file. Code
//! generators receive it read-only, after the compiler has verified it, and
//! use the builtin tables in [builtin] to map scalar types to their target
//! language.
//!
//! ```
//! use hustgen_schema::*;
//!
//! let mut schema = Schema::new();
//! schema
//!     .insert_message(Message::new("Point", Span::default(), vec![
//!         Member::new(Type::new("int32"), "x", Span::default()),
//!         Member::new(Type::new("int32"), "y", Span::default()),
//!     ]))
//!     .unwrap();
//!
//! let point = schema.message("Point").unwrap();
//! assert_eq!(point.members[1].type_.kind(), TypeKind::Scalar);
//! assert_eq!(scalar_width("int32"), Some(4));
//! ```

pub mod builtin;
pub mod types;

pub use builtin::*;
pub use types::*;
