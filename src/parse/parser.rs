// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

use log::{debug, trace};
use static_assertions::assert_impl_all;

use crate::{
    document::{Document, Section, SectionId},
    error::{ErrorKind, ParseError},
    parse::{
        arena::Arenas,
        classify::{is_ident_start, is_value_terminator},
        cursor::{Cursor, Mark},
    },
    value::{Children, Member, MemberId, StrSpan, Value, ValueId},
};

/// Capacity estimates and limits for a [`Parser`].
///
/// The arena capacities are starting points only; arenas grow geometrically on
/// demand and keep whatever they grew to across resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Initial capacity of the value arena, in values.
    pub values: usize,
    /// Initial capacity of the member arena, in members.
    pub members: usize,
    /// Initial capacity of the string arena, in bytes.
    pub strings: usize,
    /// Byte cap on the lookahead that decides between an open object and an
    /// unquoted string. The scan also stops at the end of the current record
    /// or line, whichever comes first.
    pub lookahead: usize,
    /// Maximum nesting depth of composite values. Exceeding it records
    /// [`ErrorKind::NestingTooDeep`] and skips the construct.
    pub max_depth: usize,
}

impl ParserOptions {
    const INIT_VALUE_CAPACITY: usize = 128;
    const INIT_MEMBER_CAPACITY: usize = 128;
    const INIT_STRING_CAPACITY: usize = 1024;
    const DEFAULT_LOOKAHEAD: usize = 1024;
    const DEFAULT_MAX_DEPTH: usize = 128;
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            values: Self::INIT_VALUE_CAPACITY,
            members: Self::INIT_MEMBER_CAPACITY,
            strings: Self::INIT_STRING_CAPACITY,
            lookahead: Self::DEFAULT_LOOKAHEAD,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// A reusable single-pass parser for Internet Object text.
///
/// The parser owns three arenas (values, members, string bytes), a section
/// list, and a diagnostic vector, all of which are truncated and reused on
/// every parse so that parsing comparable documents allocates nothing in
/// steady state. Parsed entities are 32-bit indices into the arenas.
///
/// Input buffers are borrowed read-only for the duration of one call and
/// never retained. Slices returned by the accessors borrow from the arenas
/// and are invalidated by the next parse; the borrow checker enforces this
/// because parsing takes `&mut self`.
///
/// A single parser must not be shared between concurrent parses. Distinct
/// parsers are fully independent.
pub struct Parser {
    arenas: Arenas,
    errors: Vec<ParseError>,
    sections: Vec<Section>,
    /// Members of every currently-open object, staged here so each object can
    /// flush its run contiguously into the member arena when it closes.
    member_scratch: Vec<Member>,
    /// Element ids of every currently-open array or collection.
    elem_scratch: Vec<u32>,
    options: ParserOptions,
}

assert_impl_all!(Parser: Send, Sync);

impl Parser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Parser {
            arenas: Arenas::with_capacity(options.values, options.members, options.strings),
            errors: Vec::new(),
            sections: Vec::new(),
            member_scratch: Vec::new(),
            elem_scratch: Vec::new(),
            options,
        }
    }

    /// Truncates all parse state, retaining capacity.
    fn begin(&mut self) {
        self.arenas.reset();
        self.errors.clear();
        self.sections.clear();
        self.member_scratch.clear();
        self.elem_scratch.clear();
    }

    /// Parses a single top-level value. Content after the value is rejected
    /// with [`ErrorKind::TrailingContent`].
    ///
    /// Returns the root value (absent if nothing could be parsed) and the
    /// last-recorded diagnostic; the full list is available from
    /// [`Parser::errors`]. Any previous parse's state is discarded.
    pub fn parse_value(&mut self, input: &[u8]) -> (Option<ValueId>, Option<ParseError>) {
        debug!("parse ({} bytes, value mode)", input.len());
        self.begin();
        let mut pass = Pass {
            cur: Cursor::new(input),
            arenas: &mut self.arenas,
            errors: &mut self.errors,
            sections: &mut self.sections,
            member_scratch: &mut self.member_scratch,
            elem_scratch: &mut self.elem_scratch,
            options: &self.options,
            document: false,
            depth: 0,
        };
        let root = pass.parse_root_value();
        (root, self.errors.last().cloned())
    }

    /// Parses a section-structured document. See [`Document`].
    pub fn parse_document(&mut self, input: &[u8]) -> (Document, Option<ParseError>) {
        debug!("parse ({} bytes, document mode)", input.len());
        self.begin();
        let mut pass = Pass {
            cur: Cursor::new(input),
            arenas: &mut self.arenas,
            errors: &mut self.errors,
            sections: &mut self.sections,
            member_scratch: &mut self.member_scratch,
            elem_scratch: &mut self.elem_scratch,
            options: &self.options,
            document: true,
            depth: 0,
        };
        let doc = pass.parse_document_root();
        (doc, self.errors.last().cloned())
    }

    /// Every diagnostic recorded by the last parse, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The value at `id`, by copy.
    #[inline]
    pub fn value(&self, id: ValueId) -> Value {
        self.arenas.value(id)
    }

    /// The member at `id`, by copy.
    #[inline]
    pub fn member(&self, id: MemberId) -> Member {
        self.arenas.members[id.0 as usize]
    }

    /// Zero-copy view of a span of the string arena. Valid until the next
    /// parse.
    #[inline]
    pub fn string_bytes(&self, span: StrSpan) -> &[u8] {
        self.arenas.str_bytes(span)
    }

    /// The same view as [`Parser::string_bytes`], as text.
    #[inline]
    pub fn string(&self, span: StrSpan) -> &str {
        let bytes = self.string_bytes(span);
        debug_assert!(std::str::from_utf8(bytes).is_ok());
        // SAFETY: the scanners validate everything they commit to the string
        // arena, so every span handed out is valid UTF-8.
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }

    /// A member's key bytes, or `None` for an indexed member.
    #[inline]
    pub fn member_key_bytes(&self, member: Member) -> Option<&[u8]> {
        member.key().map(|k| self.string_bytes(k))
    }

    /// The members of an object, in source order. Empty for any other kind.
    pub fn members_of(&self, value: Value) -> &[Member] {
        match value {
            Value::Object(c) => {
                let first = c.first as usize;
                &self.arenas.members[first..first + c.count as usize]
            }
            _ => &[],
        }
    }

    /// The member ids of an object, in source order. Empty for any other
    /// kind.
    pub fn member_ids_of(&self, value: Value) -> impl Iterator<Item = MemberId> {
        let children = match value {
            Value::Object(c) => c,
            _ => Children::EMPTY,
        };
        (children.first..children.first + children.count).map(MemberId)
    }

    /// The element ids of an array or collection, in source order. Empty for
    /// any other kind.
    pub fn elements_of(&self, value: Value) -> impl Iterator<Item = ValueId> {
        let children = match value {
            Value::Array(c) | Value::Collection(c) => c,
            _ => Children::EMPTY,
        };
        (children.first..children.first + children.count).map(ValueId)
    }

    /// Finds an object member by key text. Linear in the member count;
    /// indexed members are not considered.
    pub fn object_get(&self, value: Value, key: &[u8]) -> Option<Value> {
        for member in self.members_of(value) {
            if let Some(k) = member.key() {
                if self.string_bytes(k) == key {
                    return Some(self.value(member.value));
                }
            }
        }
        None
    }

    /// The sections of the last document-mode parse, in source order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[inline]
    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0 as usize]
    }

    /// Finds a section by its effective (possibly auto-renamed) name.
    pub fn section_by_name(&self, name: &[u8]) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.is_some_and(|n| self.string_bytes(n) == name))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// One parse in flight: the cursor over the borrowed input plus mutable
/// borrows of the parser's arenas and scratch state.
pub(crate) struct Pass<'p, 'a> {
    pub(crate) cur: Cursor<'a>,
    pub(crate) arenas: &'p mut Arenas,
    pub(crate) errors: &'p mut Vec<ParseError>,
    pub(crate) sections: &'p mut Vec<Section>,
    pub(crate) member_scratch: &'p mut Vec<Member>,
    pub(crate) elem_scratch: &'p mut Vec<u32>,
    pub(crate) options: &'p ParserOptions,
    pub(crate) document: bool,
    pub(crate) depth: usize,
}

impl<'p, 'a> Pass<'p, 'a> {
    pub(crate) fn record(&mut self, kind: ErrorKind) {
        let mark = self.cur.mark();
        self.record_at(kind, mark);
    }

    pub(crate) fn record_at(&mut self, kind: ErrorKind, mark: Mark) {
        debug!("diagnostic at {}:{}: {}", mark.row, mark.col, kind);
        self.errors.push(ParseError {
            kind,
            pos: mark.pos,
            row: mark.row,
            col: mark.col,
        });
    }

    /// Value-mode entry point.
    pub(crate) fn parse_root_value(&mut self) -> Option<ValueId> {
        self.cur.skip_whitespace();
        if self.cur.at_end() {
            self.record(ErrorKind::UnexpectedEndOfInput);
            return None;
        }
        let root = self.parse_value();
        self.cur.skip_whitespace();
        if !self.cur.at_end() {
            self.record(ErrorKind::TrailingContent);
        }
        root
    }

    /// Parses one value, dispatching on the first non-whitespace byte.
    ///
    /// Returns `None` when the value could not be materialized; the error has
    /// already been recorded and the caller is responsible for resynchronizing
    /// the cursor.
    pub(crate) fn parse_value(&mut self) -> Option<ValueId> {
        self.cur.skip_whitespace();
        if self.cur.at_end() {
            self.record(ErrorKind::UnexpectedEndOfInput);
            return None;
        }
        match self.cur.peek() {
            b'{' => self.parse_object(true),
            b'[' => self.parse_array(),
            q @ (b'"' | b'\'') => {
                let span = self.parse_quoted_string(q)?;
                Some(self.arenas.push_value(Value::String(span)))
            }
            b'~' => {
                let span = self.parse_raw_string()?;
                Some(self.arenas.push_value(Value::String(span)))
            }
            b'-' | b'+' | b'0'..=b'9' => self.parse_number(),
            // Literal leads are also legal open-object keys and open-string
            // heads, so the open-object lookahead runs first and a mismatched
            // literal falls back to an open string inside `parse_literal`.
            b't' | b'f' | b'T' | b'F' | b'n' | b'N' => {
                if self.member_has_colon() {
                    self.parse_object(false)
                } else {
                    self.parse_literal()
                }
            }
            b if is_ident_start(b) => {
                if self.member_has_colon() {
                    self.parse_object(false)
                } else {
                    let span = self.parse_unquoted_string()?;
                    Some(self.arenas.push_value(Value::String(span)))
                }
            }
            _ => {
                self.record(ErrorKind::InvalidLiteral);
                self.cur.bump();
                None
            }
        }
    }

    /// Bounded lookahead for a `:` within the current record, which selects an
    /// open object over an unquoted string. The window ends at the record's
    /// terminators or at `ParserOptions::lookahead` bytes.
    fn member_has_colon(&self) -> bool {
        let rest = self.cur.rest();
        let window = rest.len().min(self.options.lookahead);
        for &b in &rest[..window] {
            match b {
                b':' => return true,
                b',' | b'}' | b']' | b'\n' => return false,
                b'~' if self.document => return false,
                _ => {}
            }
        }
        false
    }

    /// Parses an object. When `braced`, the cursor is at `{`; otherwise it is
    /// at the first member of an open object, which is delimited only by the
    /// enclosing context.
    pub(crate) fn parse_object(&mut self, braced: bool) -> Option<ValueId> {
        if self.depth >= self.options.max_depth {
            self.record(ErrorKind::NestingTooDeep);
            self.skip_balanced();
            return None;
        }
        if braced {
            self.cur.bump();
        }
        self.depth += 1;
        trace!("object open (braced: {braced})");
        let header = self.arenas.push_value(Value::Object(Children::EMPTY));
        let scratch_start = self.member_scratch.len();
        loop {
            self.cur.skip_whitespace();
            let b = self.cur.peek();
            if braced {
                if b == b'}' {
                    self.cur.bump();
                    break;
                }
                if self.cur.at_end() {
                    self.record(ErrorKind::UnexpectedEndOfInput);
                    break;
                }
                if b == b']' {
                    // Mismatched closer; skip it and keep going.
                    self.record(ErrorKind::ExpectedCommaOrCloseBrace);
                    self.cur.bump();
                    continue;
                }
            } else if self.cur.at_end()
                || b == b'}'
                || b == b']'
                || (self.document && (b == b'~' || self.at_section_sep()))
            {
                break;
            }
            if b == b',' {
                // Empty slot.
                self.cur.bump();
                continue;
            }
            self.parse_member(scratch_start);
            self.cur.skip_whitespace();
            if self.cur.peek() == b',' {
                self.cur.bump();
            }
            // Members may also be separated by whitespace alone; anything that
            // is not a separator is re-examined at the top of the loop.
        }
        self.depth -= 1;
        self.flush_members(header, scratch_start);
        Some(header)
    }

    /// Parses one member of the current object onto the member scratch stack.
    fn parse_member(&mut self, scratch_start: usize) {
        let mark = self.cur.mark();
        let b = self.cur.peek();
        if b == b'"' || b == b'\'' {
            // Quoted text is a key only if a colon follows it; otherwise it
            // was an indexed member's string value.
            let Some(span) = self.parse_quoted_string(b) else {
                self.sync_member();
                return;
            };
            self.cur.skip_whitespace();
            if self.cur.peek() == b':' {
                self.cur.bump();
                match self.parse_value() {
                    Some(value) => self.push_member(scratch_start, span, value, mark),
                    None => self.sync_member(),
                }
            } else {
                let value = self.arenas.push_value(Value::String(span));
                self.member_scratch.push(Member {
                    key: StrSpan::NONE,
                    value,
                });
            }
            return;
        }
        if self.member_has_colon() {
            let Some(key) = self.scan_key() else {
                self.sync_member();
                return;
            };
            self.cur.skip_whitespace();
            if self.cur.peek() != b':' {
                self.record(ErrorKind::ExpectedColon);
                self.sync_member();
                return;
            }
            self.cur.bump();
            match self.parse_value() {
                Some(value) => self.push_member(scratch_start, key, value, mark),
                None => self.sync_member(),
            }
        } else {
            // Indexed member: a bare value in a member slot.
            match self.parse_value() {
                Some(value) => self.member_scratch.push(Member {
                    key: StrSpan::NONE,
                    value,
                }),
                None => self.sync_member(),
            }
        }
    }

    /// Stages a keyed member unless its key duplicates one already staged for
    /// the same object, in which case the member is dropped and the duplicate
    /// recorded.
    fn push_member(&mut self, scratch_start: usize, key: StrSpan, value: ValueId, mark: Mark) {
        let mut duplicate = false;
        {
            let new_key = self.arenas.str_bytes(key);
            for member in &self.member_scratch[scratch_start..] {
                if let Some(k) = member.key() {
                    if self.arenas.str_bytes(k) == new_key {
                        duplicate = true;
                        break;
                    }
                }
            }
        }
        if duplicate {
            let text = String::from_utf8_lossy(self.arenas.str_bytes(key)).into_owned();
            self.record_at(ErrorKind::DuplicateKey(text), mark);
            return;
        }
        self.member_scratch.push(Member { key, value });
    }

    /// Flushes the object's staged members as one contiguous run of the member
    /// arena and back-patches the header. Nested objects flushed earlier, so
    /// the run holds exactly this object's members.
    fn flush_members(&mut self, header: ValueId, scratch_start: usize) {
        let first = self.arenas.members.len() as u32;
        self.arenas
            .members
            .extend_from_slice(&self.member_scratch[scratch_start..]);
        self.member_scratch.truncate(scratch_start);
        let count = self.arenas.members.len() as u32 - first;
        self.arenas.values[header.0 as usize] = Value::Object(Children { first, count });
        trace!("object close ({count} members)");
    }

    fn parse_array(&mut self) -> Option<ValueId> {
        if self.depth >= self.options.max_depth {
            self.record(ErrorKind::NestingTooDeep);
            self.skip_balanced();
            return None;
        }
        self.cur.bump();
        self.depth += 1;
        trace!("array open");
        let header = self.arenas.push_value(Value::Array(Children::EMPTY));
        let scratch_start = self.elem_scratch.len();
        'elements: loop {
            self.cur.skip_whitespace();
            if self.cur.peek() == b']' {
                self.cur.bump();
                break;
            }
            if self.cur.at_end() {
                self.record(ErrorKind::UnexpectedEndOfInput);
                break;
            }
            match self.parse_value() {
                Some(id) => self.elem_scratch.push(id.0),
                None => {
                    self.sync_element();
                    continue;
                }
            }
            self.cur.skip_whitespace();
            match self.cur.peek() {
                b',' => self.cur.bump(),
                b']' => {}
                b'}' => {
                    self.record(ErrorKind::ExpectedCommaOrCloseBracket);
                    break 'elements;
                }
                _ => {
                    if !self.cur.at_end() {
                        self.record(ErrorKind::ExpectedCommaOrCloseBracket);
                        self.sync_element();
                    }
                }
            }
        }
        self.depth -= 1;
        self.finish_elements(header, scratch_start, Value::Array);
        Some(header)
    }

    /// Closes an array or collection: points the header at its elements,
    /// guaranteeing they form one contiguous value-arena block.
    ///
    /// When every element is a leaf the ids are already the run right after
    /// the header and are used in place. Otherwise the element headers are
    /// re-appended as a fresh block at the arena tail; the superseded slots
    /// stay behind, unreferenced, until the next reset.
    pub(crate) fn finish_elements(
        &mut self,
        header: ValueId,
        scratch_start: usize,
        wrap: fn(Children) -> Value,
    ) {
        let count = (self.elem_scratch.len() - scratch_start) as u32;
        let first = if count == 0 {
            0
        } else {
            let run_start = header.0 + 1;
            let contiguous = self.elem_scratch[scratch_start..]
                .iter()
                .enumerate()
                .all(|(i, &id)| id == run_start + i as u32);
            if contiguous {
                run_start
            } else {
                let first = self.arenas.values.len() as u32;
                for i in scratch_start..self.elem_scratch.len() {
                    let elem = self.arenas.values[self.elem_scratch[i] as usize];
                    self.arenas.values.push(elem);
                }
                first
            }
        };
        self.elem_scratch.truncate(scratch_start);
        self.arenas.values[header.0 as usize] = wrap(Children { first, count });
        trace!("container close ({count} elements)");
    }

    /// Skips past a failed member: forward to the next separator or closer,
    /// consuming a trailing comma so the member loop resumes cleanly.
    fn sync_member(&mut self) {
        loop {
            if self.cur.at_end() {
                return;
            }
            match self.cur.peek() {
                b',' => {
                    self.cur.bump();
                    return;
                }
                b'}' | b']' | b'\n' => return,
                b'~' if self.document => return,
                _ => self.cur.bump(),
            }
        }
    }

    /// Skips past a failed array element.
    fn sync_element(&mut self) {
        loop {
            if self.cur.at_end() {
                return;
            }
            match self.cur.peek() {
                b',' => {
                    self.cur.bump();
                    return;
                }
                b']' | b'}' => return,
                _ => self.cur.bump(),
            }
        }
    }

    /// Skips a composite that will not be materialized (nesting too deep),
    /// consuming through its balanced closer. Quotes are not interpreted;
    /// recovery on such input is best-effort.
    fn skip_balanced(&mut self) {
        let mut level = 0usize;
        loop {
            if self.cur.at_end() {
                return;
            }
            let b = self.cur.peek();
            match b {
                b'{' | b'[' => level += 1,
                b'}' | b']' => {
                    level = level.saturating_sub(1);
                    if level == 0 {
                        self.cur.bump();
                        return;
                    }
                }
                _ => {
                    if level == 0 && is_value_terminator(b) {
                        return;
                    }
                }
            }
            self.cur.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(parser: &Parser, value: Value) -> Vec<i64> {
        parser
            .elements_of(value)
            .map(|id| match parser.value(id) {
                Value::Int(n) => n,
                other => panic!("expected int, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn simple_object() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(br#"{"name": "John", "age": 30, "active": true}"#);
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        let members = parser.members_of(root);
        assert_eq!(members.len(), 3);
        let keys: Vec<_> = members
            .iter()
            .map(|m| parser.string_bytes(m.key().unwrap()))
            .collect();
        assert_eq!(keys, [&b"name"[..], &b"age"[..], &b"active"[..]]);
        assert_eq!(
            parser.object_get(root, b"name"),
            Some(Value::String(StrSpan::new(4, 4)))
        );
        match parser.object_get(root, b"name").unwrap() {
            Value::String(s) => assert_eq!(parser.string(s), "John"),
            other => panic!("{other:?}"),
        }
        assert_eq!(parser.object_get(root, b"age"), Some(Value::Int(30)));
        assert_eq!(parser.object_get(root, b"active"), Some(Value::Bool(true)));
        assert_eq!(parser.object_get(root, b"missing"), None);
    }

    #[test]
    fn flat_array_is_contiguous_after_header() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"[1, 2, 3]");
        assert_eq!(err, None);
        let id = root.unwrap();
        let root = parser.value(id);
        assert_eq!(ints(&parser, root), [1, 2, 3]);
        // Elements sit immediately after the header slot.
        let Value::Array(children) = root else {
            panic!("{root:?}");
        };
        assert_eq!(children.first, id.0 + 1);
        assert_eq!(children.count, 3);
    }

    #[test]
    fn nested_arrays_still_have_contiguous_elements() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"[1, [2, 3], 4]");
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        let Value::Array(_) = root else {
            panic!("{root:?}");
        };
        let elems: Vec<_> = parser.elements_of(root).collect();
        assert_eq!(elems.len(), 3);
        // The element run must be contiguous even though the inner array's
        // children were interleaved during parsing.
        assert_eq!(elems[1].0, elems[0].0 + 1);
        assert_eq!(elems[2].0, elems[1].0 + 1);
        assert_eq!(parser.value(elems[0]), Value::Int(1));
        let inner = parser.value(elems[1]);
        assert_eq!(ints(&parser, inner), [2, 3]);
        assert_eq!(parser.value(elems[2]), Value::Int(4));
    }

    #[test]
    fn duplicate_key_is_dropped_and_reported() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(br#"{"name": "John", "name": "Jane"}"#);
        assert_eq!(
            err.map(|e| e.kind),
            Some(ErrorKind::DuplicateKey("name".into()))
        );
        let root = parser.value(root.unwrap());
        let members = parser.members_of(root);
        assert_eq!(members.len(), 1);
        match parser.object_get(root, b"name").unwrap() {
            Value::String(s) => assert_eq!(parser.string(s), "John"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn overflowing_member_is_not_committed() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(br#"{"big": 9223372036854775808}"#);
        assert_eq!(err.map(|e| e.kind), Some(ErrorKind::NumberOverflow));
        let root = parser.value(root.unwrap());
        assert_eq!(parser.members_of(root).len(), 0);
    }

    #[test]
    fn open_object_at_top_level() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"name: John, age: 30");
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        assert_eq!(parser.members_of(root).len(), 2);
        match parser.object_get(root, b"name").unwrap() {
            Value::String(s) => assert_eq!(parser.string(s), "John"),
            other => panic!("{other:?}"),
        }
        assert_eq!(parser.object_get(root, b"age"), Some(Value::Int(30)));
    }

    #[test]
    fn indexed_members() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(br#"{"John", 30, active: true}"#);
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        let members = parser.members_of(root);
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].key(), None);
        assert_eq!(members[1].key(), None);
        assert!(members[2].key().is_some());
        // Indexed members are invisible to keyed lookup.
        assert_eq!(parser.object_get(root, b"John"), None);
        assert_eq!(parser.object_get(root, b"active"), Some(Value::Bool(true)));
    }

    #[test]
    fn indexed_members_do_not_trip_duplicate_check() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"{1, 2, 3}");
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        assert_eq!(parser.members_of(root).len(), 3);
    }

    #[test]
    fn nested_object_does_not_confuse_duplicate_scan() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(br#"{a: {x: 1}, x: 2}"#);
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        assert_eq!(parser.members_of(root).len(), 2);
        assert_eq!(parser.object_get(root, b"x"), Some(Value::Int(2)));
        let inner = parser.object_get(root, b"a").unwrap();
        assert_eq!(parser.object_get(inner, b"x"), Some(Value::Int(1)));
    }

    #[test]
    fn empty_input_is_an_error() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"");
        assert_eq!(root, None);
        assert_eq!(err.map(|e| e.kind), Some(ErrorKind::UnexpectedEndOfInput));

        let (root, err) = parser.parse_value(b"  \t\n ");
        assert_eq!(root, None);
        assert_eq!(err.map(|e| e.kind), Some(ErrorKind::UnexpectedEndOfInput));
    }

    #[test]
    fn trailing_content_is_rejected() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"[1] [2]");
        assert!(root.is_some());
        assert_eq!(err.map(|e| e.kind), Some(ErrorKind::TrailingContent));
    }

    #[test]
    fn mismatched_closer_in_object() {
        let mut parser = Parser::new();
        let (root, _) = parser.parse_value(b"{a: 1]}");
        assert!(parser
            .errors()
            .iter()
            .any(|e| e.kind == ErrorKind::ExpectedCommaOrCloseBrace));
        let root = parser.value(root.unwrap());
        assert_eq!(parser.object_get(root, b"a"), Some(Value::Int(1)));
    }

    #[test]
    fn array_missing_comma() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"[1 2]");
        assert!(root.is_some());
        assert_eq!(
            err.map(|e| e.kind),
            Some(ErrorKind::ExpectedCommaOrCloseBracket)
        );
    }

    #[test]
    fn reset_reparse_matches_fresh_parser() {
        let input = br#"{"a": [1, {"b": "two"}], "c": 3.5}"#;
        let mut reused = Parser::new();
        reused.parse_value(b"[9, 8, 7, [6, 5], {x: ~y~}]");
        let (root_a, err_a) = reused.parse_value(input);

        let mut fresh = Parser::new();
        let (root_b, err_b) = fresh.parse_value(input);

        assert_eq!(root_a, root_b);
        assert_eq!(err_a, err_b);
        assert_eq!(reused.errors(), fresh.errors());
        let a = reused.to_dynamic(root_a.unwrap());
        let b = fresh.to_dynamic(root_b.unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut parser = Parser::with_options(ParserOptions {
            max_depth: 8,
            ..ParserOptions::default()
        });
        let mut input = Vec::new();
        input.extend_from_slice(&[b'['; 64]);
        input.extend_from_slice(&[b']'; 64]);
        let (_, err) = parser.parse_value(&input);
        assert_eq!(err.map(|e| e.kind), Some(ErrorKind::NestingTooDeep));
    }

    #[test]
    fn error_positions() {
        let mut parser = Parser::new();
        // `x` scans as the key, but the colon seen by the lookahead belongs
        // to `y`, so the member is malformed.
        let (_, err) = parser.parse_value(b"{a: 1,\n x y: 2}");
        let err = err.unwrap();
        assert_eq!(err.kind, ErrorKind::ExpectedColon);
        assert_eq!(err.row, 2);
    }

    #[test]
    fn member_ids_resolve_through_the_member_arena() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"{a: 1, b: 2}");
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        let ids: Vec<_> = parser.member_ids_of(root).collect();
        assert_eq!(ids.len(), 2);
        let b = parser.member(ids[1]);
        assert_eq!(parser.member_key_bytes(b), Some(&b"b"[..]));
        assert_eq!(parser.value(b.value()), Value::Int(2));
    }

    #[test]
    fn member_without_colon_is_indexed_not_an_error() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"{a: 1, b}");
        assert_eq!(err, None);
        let root = parser.value(root.unwrap());
        let members = parser.members_of(root);
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].key(), None);
        match parser.value(members[1].value()) {
            Value::String(s) => assert_eq!(parser.string(s), "b"),
            other => panic!("{other:?}"),
        }
    }
}
