// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! The three append-only arenas a parse writes into.
//!
//! The arenas outlive any single parse: [`Arenas::reset`] truncates their
//! logical lengths to zero while keeping capacity, so repeated parses of
//! comparable documents perform no heap allocation in steady state.

use std::fmt::{self, Debug, Formatter};

use bstr::ByteSlice;

use crate::value::{Member, StrSpan, Value, ValueId};

pub(crate) struct Arenas {
    pub(crate) values: Vec<Value>,
    pub(crate) members: Vec<Member>,
    pub(crate) strings: Vec<u8>,
}

impl Arenas {
    pub(crate) fn with_capacity(values: usize, members: usize, strings: usize) -> Self {
        Arenas {
            values: Vec::with_capacity(values),
            members: Vec::with_capacity(members),
            strings: Vec::with_capacity(strings),
        }
    }

    /// Truncates all logical lengths to zero, retaining capacity.
    pub(crate) fn reset(&mut self) {
        self.values.clear();
        self.members.clear();
        self.strings.clear();
    }

    #[inline]
    pub(crate) fn push_value(&mut self, value: Value) -> ValueId {
        debug_assert!(self.values.len() < u32::MAX as usize);
        let id = ValueId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    #[inline]
    pub(crate) fn value(&self, id: ValueId) -> Value {
        self.values[id.0 as usize]
    }

    /// Appends bytes to the string arena and returns their span.
    #[inline]
    pub(crate) fn intern(&mut self, bytes: &[u8]) -> StrSpan {
        let start = self.strings.len();
        self.strings.extend_from_slice(bytes);
        StrSpan::new(start, bytes.len())
    }

    #[inline]
    pub(crate) fn str_bytes(&self, span: StrSpan) -> &[u8] {
        let start = span.start as usize;
        &self.strings[start..start + span.len as usize]
    }
}

impl Debug for Arenas {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arenas")
            .field("values", &self.values.len())
            .field("members", &self.members.len())
            .field("strings", &self.strings.as_bstr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_capacity() {
        let mut arenas = Arenas::with_capacity(4, 4, 16);
        for i in 0..100 {
            arenas.push_value(Value::Int(i));
        }
        arenas.intern(b"some interned text");
        let (vcap, scap) = (arenas.values.capacity(), arenas.strings.capacity());
        arenas.reset();
        assert_eq!(arenas.values.len(), 0);
        assert_eq!(arenas.strings.len(), 0);
        assert_eq!(arenas.values.capacity(), vcap);
        assert_eq!(arenas.strings.capacity(), scap);
    }

    #[test]
    fn interned_spans_round_trip() {
        let mut arenas = Arenas::with_capacity(0, 0, 0);
        let a = arenas.intern(b"alpha");
        let b = arenas.intern(b"beta");
        assert_eq!(arenas.str_bytes(a), b"alpha");
        assert_eq!(arenas.str_bytes(b), b"beta");
        assert_eq!(a.start, 0);
        assert_eq!(b.start, 5);
    }
}
