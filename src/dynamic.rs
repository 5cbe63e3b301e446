// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! Owned materialization of parsed values.
//!
//! [`Parser::to_dynamic`] walks the flat arenas into an owned tree for
//! callers that want to keep data past the next parse. It copies every string
//! and allocates per node; the index-based accessors are the hot path.

use crate::{
    parse::Parser,
    value::{Value, ValueId},
};

/// An owned, self-contained value tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Arrays and collections both materialize here.
    Array(Vec<Dynamic>),
    /// Members in source order; keys are `None` for indexed members.
    Object(Vec<DynamicMember>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicMember {
    pub key: Option<String>,
    pub value: Dynamic,
}

impl Dynamic {
    /// Finds a keyed object member. Linear scan, like
    /// [`Parser::object_get`].
    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        match self {
            Dynamic::Object(members) => members
                .iter()
                .find(|m| m.key.as_deref() == Some(key))
                .map(|m| &m.value),
            _ => None,
        }
    }
}

impl Parser {
    /// Materializes the value at `id` as an owned [`Dynamic`] tree.
    pub fn to_dynamic(&self, id: ValueId) -> Dynamic {
        let value = self.value(id);
        match value {
            Value::Null => Dynamic::Null,
            Value::Bool(b) => Dynamic::Bool(b),
            Value::Int(n) => Dynamic::Int(n),
            Value::Float(f) => Dynamic::Float(f),
            Value::String(s) => Dynamic::String(self.string(s).to_owned()),
            Value::Object(_) => Dynamic::Object(
                self.members_of(value)
                    .iter()
                    .map(|m| DynamicMember {
                        key: m.key().map(|k| self.string(k).to_owned()),
                        value: self.to_dynamic(m.value()),
                    })
                    .collect(),
            ),
            Value::Array(_) | Value::Collection(_) => Dynamic::Array(
                self.elements_of(value)
                    .map(|e| self.to_dynamic(e))
                    .collect(),
            ),
        }
    }
}
