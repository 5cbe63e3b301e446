// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! Document-mode records.
//!
//! A document is a sequence of sections separated by `---` lines. Each section
//! may carry a name and a schema reference on its separator line, recorded as
//! position-stamped [`Token`]s, and holds one content value (an object, array,
//! or collection).

use enumflags2::{bitflags, BitFlags};

use crate::value::{StrSpan, ValueId};

/// Index of a [`Section`] in the parser's section list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(pub(crate) u32);

/// What a section head token names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    SectionName,
    SchemaRef,
}

/// Flag bits carried on a [`Token`].
#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenFlag {
    /// The token was written with its `~` or `$` sigil in the source.
    Sigil,
    /// The owning section was renamed to resolve a duplicate; the interned
    /// name no longer matches the source text.
    Renamed,
}

/// A section head token, addressing `start..end` of the source buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
    pub row: u16,
    pub col: u16,
    pub flags: BitFlags<TokenFlag>,
}

/// One section of a document.
///
/// `name` is interned in the string arena (so auto-renamed sections resolve by
/// their effective name); the tokens preserve the source positions. A section
/// with unparseable or absent content has `content == None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Section {
    pub name: Option<StrSpan>,
    pub name_token: Option<Token>,
    pub schema_token: Option<Token>,
    pub content: Option<ValueId>,
}

/// The result of a document-mode parse.
///
/// All sections, the unnamed header included, live in the parser's section
/// list in source order; `header` points at the first slot when the document
/// opened with content rather than a `---` separator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub header: Option<SectionId>,
    pub section_count: u32,
}

impl Document {
    /// Ids of every section in source order, header first when present.
    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> {
        (0..self.section_count).map(SectionId)
    }

    pub fn is_empty(&self) -> bool {
        self.section_count == 0
    }
}
