// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! A single-pass, arena-backed parser for the [Internet Object] data format.
//!
//! Internet Object is a JSON-superset document language: keys and string
//! values may be unquoted, documents are ordered `---`-separated sections
//! with optional names and schema references, and `~` introduces collections
//! of records. This crate implements the tokenless core parser: one pass over
//! a borrowed byte buffer that materializes a flat, index-based tree in
//! reusable arenas, with byte-exact positions on every diagnostic and no
//! heap allocation across repeated parses of comparable documents.
//!
//! ```
//! use internet_object::{Parser, Value};
//!
//! let mut parser = Parser::new();
//! let (root, err) = parser.parse_value(br#"{name: "Ada", age: 36, tags: [admin, ops]}"#);
//! assert!(err.is_none());
//! let root = parser.value(root.unwrap());
//! assert_eq!(parser.object_get(root, b"age"), Some(Value::Int(36)));
//! match parser.object_get(root, b"name").unwrap() {
//!     Value::String(name) => assert_eq!(parser.string(name), "Ada"),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! Malformed input never panics and never aborts the parse outright: the
//! parser records diagnostics, recovers at member, element, and section
//! granularity, and returns whatever it could build. Borrowed views returned
//! by the accessors live until the next parse; the borrow checker enforces
//! the boundary because parsing takes `&mut self`.
//!
//! [Internet Object]: https://internetobject.org

mod document;
mod dynamic;
mod error;
pub mod parse;
mod value;

pub use document::{Document, Section, SectionId, Token, TokenFlag, TokenKind};
pub use dynamic::{Dynamic, DynamicMember};
pub use error::{ErrorKind, ParseError};
pub use parse::{Parser, ParserOptions};
pub use value::{Children, Member, MemberId, StrSpan, Value, ValueId};
