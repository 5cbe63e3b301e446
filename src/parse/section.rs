// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! Document mode: `---`-separated sections, their head tokens, and `~`
//! collections.

use enumflags2::BitFlags;
use log::trace;

use crate::{
    document::{Document, Section, SectionId, Token, TokenFlag, TokenKind},
    error::ErrorKind,
    parse::{
        classify::{is_ident_continue, is_ident_start},
        cursor::Mark,
        parser::Pass,
    },
    value::{Children, Value, ValueId},
};

impl<'p, 'a> Pass<'p, 'a> {
    /// Whether the cursor is at a section separator: `---` as the first
    /// non-blank content of a line.
    pub(crate) fn at_section_sep(&self) -> bool {
        self.cur.at_line_start() && self.cur.rest().starts_with(b"---")
    }

    /// Document-mode entry point.
    pub(crate) fn parse_document_root(&mut self) -> Document {
        self.cur.skip_whitespace();
        if self.cur.at_end() {
            return Document::default();
        }
        let mut header = None;
        if !self.at_section_sep() {
            // Content before any separator is the unnamed header section.
            let content = self.parse_section_content();
            let id = SectionId(self.sections.len() as u32);
            self.sections.push(Section {
                name: None,
                name_token: None,
                schema_token: None,
                content,
            });
            header = Some(id);
        }
        loop {
            self.cur.skip_whitespace();
            if self.cur.at_end() {
                break;
            }
            if self.at_section_sep() {
                let (name_token, schema_token) = self.parse_section_head();
                let content = self.parse_section_content();
                self.push_named_section(name_token, schema_token, content);
            } else {
                self.record(ErrorKind::ExpectedSectionSeparator);
                self.sync_to_recovery_point();
                if !self.cur.at_end() && !self.at_section_sep() {
                    // Resynchronized at a collection sigil: resume there and
                    // give the collection an unnamed section so its data
                    // survives the recovery.
                    let content = self.parse_section_content();
                    self.sections.push(Section {
                        name: None,
                        name_token: None,
                        schema_token: None,
                        content,
                    });
                }
            }
        }
        Document {
            header,
            section_count: self.sections.len() as u32,
        }
    }

    /// Parses the remainder of a `---` line: an optional section name
    /// (`users` or `~users`) and an optional schema reference (`$schema`),
    /// in either order.
    fn parse_section_head(&mut self) -> (Option<Token>, Option<Token>) {
        self.cur.advance(3);
        // Tolerate decorative separators like `------`.
        while self.cur.peek() == b'-' {
            self.cur.bump();
        }
        let mut name = None;
        let mut schema = None;
        loop {
            self.cur.skip_inline_whitespace();
            let b = self.cur.peek();
            if b == b'\n' {
                self.cur.bump();
                break;
            }
            if self.cur.at_end() {
                break;
            }
            let parsed = match b {
                b'$' => {
                    self.cur.bump();
                    match self.head_token(TokenKind::SchemaRef, true) {
                        Some(tok) => {
                            schema.get_or_insert(tok);
                            true
                        }
                        None => false,
                    }
                }
                b'~' => {
                    self.cur.bump();
                    match self.head_token(TokenKind::SectionName, true) {
                        Some(tok) => {
                            name.get_or_insert(tok);
                            true
                        }
                        None => false,
                    }
                }
                b if is_ident_start(b) => match self.head_token(TokenKind::SectionName, false) {
                    Some(tok) => {
                        name.get_or_insert(tok);
                        true
                    }
                    None => false,
                },
                _ => false,
            };
            if !parsed {
                self.record(ErrorKind::InvalidLiteral);
                self.skip_head_line();
                break;
            }
        }
        (name, schema)
    }

    /// Scans an identifier at the cursor into a head token. The token spans
    /// the identifier only; a consumed sigil is recorded in the flags.
    fn head_token(&mut self, kind: TokenKind, sigil: bool) -> Option<Token> {
        let mark = self.cur.mark();
        let rest = self.cur.rest();
        let mut n = 0;
        while n < rest.len() && is_ident_continue(rest[n]) {
            n += 1;
        }
        if n == 0 {
            return None;
        }
        self.cur.advance(n);
        let mut flags = BitFlags::empty();
        if sigil {
            flags |= TokenFlag::Sigil;
        }
        Some(Token {
            kind,
            start: mark.pos,
            end: mark.pos + n as u32,
            row: mark.row.min(u16::MAX as u32) as u16,
            col: mark.col.min(u16::MAX as u32) as u16,
            flags,
        })
    }

    fn skip_head_line(&mut self) {
        while !self.cur.at_end() {
            let b = self.cur.peek();
            self.cur.bump();
            if b == b'\n' {
                return;
            }
        }
    }

    /// Parses a section's content value: a collection when the section body
    /// opens with `~`, otherwise any value (typically an object or array).
    fn parse_section_content(&mut self) -> Option<ValueId> {
        self.cur.skip_whitespace();
        if self.cur.at_end() || self.at_section_sep() {
            return None;
        }
        if self.cur.peek() == b'~' {
            self.parse_collection()
        } else {
            self.parse_value()
        }
    }

    /// Stores a named section, renaming it with a numeric suffix when its
    /// name collides with an earlier section so lookups still resolve.
    fn push_named_section(
        &mut self,
        mut name_token: Option<Token>,
        schema_token: Option<Token>,
        content: Option<ValueId>,
    ) {
        let name = match &mut name_token {
            Some(tok) => {
                let text = self.cur.slice(tok.start as usize, tok.end as usize);
                if self.section_name_taken(text) {
                    self.record_at(
                        ErrorKind::DuplicateSection(String::from_utf8_lossy(text).into_owned()),
                        Mark {
                            pos: tok.start,
                            row: tok.row as u32,
                            col: tok.col as u32,
                        },
                    );
                    let mut n = 2;
                    let renamed = loop {
                        let candidate = format!("{}_{n}", String::from_utf8_lossy(text));
                        if !self.section_name_taken(candidate.as_bytes()) {
                            break candidate;
                        }
                        n += 1;
                    };
                    tok.flags |= TokenFlag::Renamed;
                    Some(self.arenas.intern(renamed.as_bytes()))
                } else {
                    Some(self.arenas.intern(text))
                }
            }
            None => None,
        };
        trace!("section close (named: {})", name.is_some());
        self.sections.push(Section {
            name,
            name_token,
            schema_token,
            content,
        });
    }

    fn section_name_taken(&self, name: &[u8]) -> bool {
        self.sections
            .iter()
            .any(|s| s.name.is_some_and(|n| self.arenas.str_bytes(n) == name))
    }

    /// Parses a `~`-introduced collection of values. The cursor is at the
    /// first `~`. A further `~` starts the next item; a line-start `---`
    /// or the end of input terminates the collection.
    pub(crate) fn parse_collection(&mut self) -> Option<ValueId> {
        trace!("collection open");
        let header = self.arenas.push_value(Value::Collection(Children::EMPTY));
        let scratch_start = self.elem_scratch.len();
        loop {
            // At an item's `~` sigil.
            self.cur.bump();
            self.cur.skip_whitespace();
            if self.cur.at_end() || self.at_section_sep() {
                break;
            }
            if self.cur.peek() == b'~' && self.cur.at_line_start() {
                // A sigil alone on its line left this item empty; the
                // line-start `~` opens the next item. A mid-line `~` here is
                // in value position and begins a raw string instead.
                continue;
            }
            match self.parse_value() {
                Some(id) => self.elem_scratch.push(id.0),
                None => self.sync_collection_item(),
            }
            self.cur.skip_whitespace();
            if self.cur.peek() == b'~' && !self.at_section_sep() {
                continue;
            }
            break;
        }
        self.finish_elements(header, scratch_start, Value::Collection);
        Some(header)
    }

    /// Skips past a failed collection item, to the next item sigil, section
    /// separator, or end of input.
    fn sync_collection_item(&mut self) {
        while !self.cur.at_end() {
            if self.cur.peek() == b'~' || self.at_section_sep() {
                return;
            }
            self.cur.bump();
        }
    }

    /// Document-level panic-mode synchronization: skips forward to the next
    /// line-start `~` or `---`, or the end of input. Sigils are only
    /// recognized at line start so a `~` buried in junk does not fork the
    /// parse.
    fn sync_to_recovery_point(&mut self) {
        while !self.cur.at_end() {
            if self.at_section_sep() || (self.cur.peek() == b'~' && self.cur.at_line_start()) {
                return;
            }
            self.cur.bump();
        }
    }
}
