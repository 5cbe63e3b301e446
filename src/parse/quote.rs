// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! String scanning: quoted strings with escape processing, raw strings, and
//! unquoted (open) strings and keys.
//!
//! Everything committed to the string arena is validated UTF-8; that is the
//! invariant the borrowed `&str` accessor relies on. A failed string commits
//! nothing: the arena is rolled back to its pre-scan length.

use memchr::{memchr, memchr2};

use crate::{
    error::ErrorKind,
    parse::{
        classify::{is_hex_digit, is_key_terminator, is_value_terminator},
        parser::Pass,
    },
    value::StrSpan,
};

impl<'p, 'a> Pass<'p, 'a> {
    /// Parses a quoted string, `quote` being `"` or `'`. The cursor is at the
    /// opening quote. On error the scan still runs to the closing quote so the
    /// surrounding composite can resume, but returns `None` and commits no
    /// bytes.
    pub(crate) fn parse_quoted_string(&mut self, quote: u8) -> Option<StrSpan> {
        let arena_start = self.arenas.strings.len();
        self.cur.bump();
        let mut poisoned = false;
        loop {
            let rest = self.cur.rest();
            let stop = match memchr2(quote, b'\\', rest) {
                Some(stop) => stop,
                None => {
                    // Validate what we can, then report the missing quote.
                    self.take_text(rest.len(), &mut poisoned);
                    self.record(ErrorKind::UnterminatedString);
                    self.arenas.strings.truncate(arena_start);
                    return None;
                }
            };
            self.take_text(stop, &mut poisoned);
            if self.cur.peek() == quote {
                self.cur.bump();
                break;
            }
            // Escape sequence.
            self.cur.bump();
            match self.cur.peek() {
                b'"' | b'\'' | b'\\' | b'/' => {
                    let b = self.cur.peek();
                    self.arenas.strings.push(b);
                    self.cur.bump();
                }
                b'b' => self.push_escape(0x08),
                b'f' => self.push_escape(0x0C),
                b'n' => self.push_escape(b'\n'),
                b'r' => self.push_escape(b'\r'),
                b't' => self.push_escape(b'\t'),
                b'u' => {
                    self.cur.bump();
                    if !self.parse_unicode_escape() {
                        poisoned = true;
                    }
                }
                _ => {
                    if self.cur.at_end() {
                        self.record(ErrorKind::UnterminatedString);
                        self.arenas.strings.truncate(arena_start);
                        return None;
                    }
                    self.record(ErrorKind::InvalidEscape(self.cur.peek() as char));
                    self.cur.bump();
                    poisoned = true;
                }
            }
        }
        if poisoned {
            self.arenas.strings.truncate(arena_start);
            return None;
        }
        Some(StrSpan::new(arena_start, self.arenas.strings.len() - arena_start))
    }

    /// Consumes `n` bytes of literal string text, validating them and
    /// appending them to the string arena. On a validation error the text is
    /// still consumed, the error recorded, and the string poisoned.
    fn take_text(&mut self, n: usize, poisoned: &mut bool) {
        let chunk = &self.cur.rest()[..n];
        match validate_text(chunk, false) {
            Ok(()) => {
                if !*poisoned {
                    self.arenas.strings.extend_from_slice(chunk);
                }
                self.cur.advance(n);
            }
            Err((at, kind)) => {
                self.cur.advance(at);
                self.record(kind);
                self.cur.advance(n - at);
                *poisoned = true;
            }
        }
    }

    #[inline]
    fn push_escape(&mut self, decoded: u8) {
        self.arenas.strings.push(decoded);
        self.cur.bump();
    }

    /// Parses the `XXXX` of a `\uXXXX` escape, combining a surrogate pair
    /// into its supplementary code point. A lone surrogate is rejected so the
    /// arena never holds ill-formed UTF-8. Returns whether the escape was
    /// appended.
    fn parse_unicode_escape(&mut self) -> bool {
        let Some(unit) = self.hex4() else {
            self.record(ErrorKind::InvalidUnicodeEscape);
            return false;
        };
        let code = match unit {
            0xD800..=0xDBFF => {
                // High surrogate: require the low half immediately after.
                if self.cur.peek() != b'\\' || self.cur.peek_at(1) != b'u' {
                    self.record(ErrorKind::InvalidUnicodeEscape);
                    return false;
                }
                self.cur.advance(2);
                let Some(low) = self.hex4() else {
                    self.record(ErrorKind::InvalidUnicodeEscape);
                    return false;
                };
                if !(0xDC00..=0xDFFF).contains(&low) {
                    self.record(ErrorKind::InvalidUnicodeEscape);
                    return false;
                }
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                self.record(ErrorKind::InvalidUnicodeEscape);
                return false;
            }
            _ => unit,
        };
        let Some(ch) = char::from_u32(code) else {
            self.record(ErrorKind::InvalidUnicodeEscape);
            return false;
        };
        let mut buf = [0u8; 4];
        self.arenas
            .strings
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        true
    }

    /// Reads four hex digits as a code unit, consuming them on success only.
    fn hex4(&mut self) -> Option<u32> {
        let rest = self.cur.rest();
        if rest.len() < 4 || !rest[..4].iter().all(|&b| is_hex_digit(b)) {
            return None;
        }
        let mut unit = 0u32;
        for &b in &rest[..4] {
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                _ => b - b'A' + 10,
            };
            unit = unit << 4 | digit as u32;
        }
        self.cur.advance(4);
        Some(unit)
    }

    /// Parses a `~…~` raw string: no escape processing, terminated by the
    /// next `~`. Control characters are allowed; the text must still be
    /// valid UTF-8.
    pub(crate) fn parse_raw_string(&mut self) -> Option<StrSpan> {
        self.cur.bump();
        let rest = self.cur.rest();
        let Some(end) = memchr(b'~', rest) else {
            self.cur.advance(rest.len());
            self.record(ErrorKind::UnterminatedString);
            return None;
        };
        let text = &rest[..end];
        if let Err((at, kind)) = validate_text(text, true) {
            self.cur.advance(at);
            self.record(kind);
            self.cur.advance(end - at + 1);
            return None;
        }
        let span = self.arenas.intern(text);
        self.cur.advance(end + 1);
        Some(span)
    }

    /// Parses an unquoted (open) string value: bytes up to a value
    /// terminator, trailing whitespace trimmed.
    pub(crate) fn parse_unquoted_string(&mut self) -> Option<StrSpan> {
        let rest = self.cur.rest();
        let mut n = 0;
        while n < rest.len() && !is_value_terminator(rest[n]) {
            if self.document && rest[n] == b'~' {
                break;
            }
            n += 1;
        }
        let text = trim_trailing_whitespace(&rest[..n]);
        if let Err((at, kind)) = validate_text(text, false) {
            self.cur.advance(at);
            self.record(kind);
            self.cur.advance(n - at);
            return None;
        }
        let span = self.arenas.intern(text);
        self.cur.advance(n);
        Some(span)
    }

    /// Scans an unquoted member key: bytes up to a key terminator.
    pub(crate) fn scan_key(&mut self) -> Option<StrSpan> {
        let rest = self.cur.rest();
        let mut n = 0;
        while n < rest.len() && !is_key_terminator(rest[n]) {
            n += 1;
        }
        let text = &rest[..n];
        if let Err((at, kind)) = validate_text(text, false) {
            self.cur.advance(at);
            self.record(kind);
            self.cur.advance(n - at);
            return None;
        }
        let span = self.arenas.intern(text);
        self.cur.advance(n);
        Some(span)
    }
}

/// Trims ASCII whitespace from the end of an unquoted string's text.
fn trim_trailing_whitespace(text: &[u8]) -> &[u8] {
    let mut end = text.len();
    while end > 0 && matches!(text[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    &text[..end]
}

/// Validates literal string text: no control characters (unless `raw`) and
/// exact UTF-8 for everything above ASCII. Overlong encodings, surrogate
/// encodings and code points beyond U+10FFFF are rejected, which is what
/// keeps the string arena readable as `&str` without copying.
///
/// Returns the byte offset of the first offending byte and the error kind.
fn validate_text(text: &[u8], raw: bool) -> Result<(), (usize, ErrorKind)> {
    let mut i = 0;
    while i < text.len() {
        let b = text[i];
        if b < 0x20 && !raw {
            return Err((i, ErrorKind::InvalidControlCharacter));
        }
        if b < 0x80 {
            i += 1;
            continue;
        }
        let (len, low, high) = match b {
            0xC2..=0xDF => (2, 0x80, 0xBF),
            0xE0 => (3, 0xA0, 0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80, 0xBF),
            0xED => (3, 0x80, 0x9F),
            0xF0 => (4, 0x90, 0xBF),
            0xF1..=0xF3 => (4, 0x80, 0xBF),
            0xF4 => (4, 0x80, 0x8F),
            _ => return Err((i, ErrorKind::InvalidUtf8)),
        };
        if i + len > text.len() {
            return Err((i, ErrorKind::InvalidUtf8));
        }
        // The first continuation byte carries the tightened range; the rest
        // are plain 0x80..=0xBF.
        if !(low..=high).contains(&text[i + 1]) {
            return Err((i, ErrorKind::InvalidUtf8));
        }
        for k in 2..len {
            if !(0x80..=0xBF).contains(&text[i + k]) {
                return Err((i, ErrorKind::InvalidUtf8));
            }
        }
        i += len;
    }
    Ok(())
}
