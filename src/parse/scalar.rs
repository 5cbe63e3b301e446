// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! Scalar scanning: numbers, booleans and null.

use crate::{
    error::ErrorKind,
    parse::{
        classify::{is_binary_digit, is_digit, is_hex_digit, is_ident_continue, is_octal_digit},
        cursor::Mark,
        parser::Pass,
    },
    value::{Value, ValueId},
};

impl<'p, 'a> Pass<'p, 'a> {
    /// Parses a number: optionally signed decimal with fraction and exponent,
    /// or a `0x`/`0o`/`0b` radix integer.
    ///
    /// Integers accumulate into an `i64` with a pre-multiplication overflow
    /// check against the signed limits (the negative magnitude limit is one
    /// higher on the low digit). A float accumulator runs alongside, so a
    /// long integer body that turns out to be a float does not falsely
    /// overflow.
    pub(crate) fn parse_number(&mut self) -> Option<ValueId> {
        let mark = self.cur.mark();
        let mut negative = false;
        match self.cur.peek() {
            b'-' => {
                negative = true;
                self.cur.bump();
            }
            b'+' => self.cur.bump(),
            _ => {}
        }
        let limit: u64 = if negative { 1 << 63 } else { i64::MAX as u64 };

        if self.cur.peek() == b'0' {
            let radix: Option<(u64, fn(u8) -> bool)> = match self.cur.peek_at(1) {
                b'x' | b'X' => Some((16, is_hex_digit)),
                b'o' | b'O' => Some((8, is_octal_digit)),
                b'b' | b'B' => Some((2, is_binary_digit)),
                _ => None,
            };
            if let Some((radix, pred)) = radix {
                self.cur.advance(2);
                return self.parse_radix_digits(radix, pred, negative, limit, mark);
            }
        }

        let mut acc: u64 = 0;
        let mut acc_f: f64 = 0.0;
        let mut digits = 0usize;
        let mut overflow = false;
        while is_digit(self.cur.peek()) {
            let d = (self.cur.peek() - b'0') as u64;
            if acc > limit / 10 || (acc == limit / 10 && d > limit % 10) {
                overflow = true;
            } else {
                acc = acc * 10 + d;
            }
            acc_f = acc_f * 10.0 + d as f64;
            digits += 1;
            self.cur.bump();
        }
        if digits == 0 {
            // A bare sign, or something like `+.5`.
            self.record_at(ErrorKind::InvalidNumber, mark);
            self.sync_number();
            return None;
        }

        let mut is_float = false;
        let mut value_f = acc_f;
        if self.cur.peek() == b'.' {
            is_float = true;
            self.cur.bump();
            let mut divisor = 10.0f64;
            let mut frac_digits = 0usize;
            while is_digit(self.cur.peek()) {
                value_f += (self.cur.peek() - b'0') as f64 / divisor;
                divisor *= 10.0;
                frac_digits += 1;
                self.cur.bump();
            }
            if frac_digits == 0 {
                self.record_at(ErrorKind::InvalidNumber, mark);
                self.sync_number();
                return None;
            }
        }
        if matches!(self.cur.peek(), b'e' | b'E') {
            is_float = true;
            self.cur.bump();
            let mut exp_negative = false;
            match self.cur.peek() {
                b'-' => {
                    exp_negative = true;
                    self.cur.bump();
                }
                b'+' => self.cur.bump(),
                _ => {}
            }
            let mut exp: i32 = 0;
            let mut exp_digits = 0usize;
            while is_digit(self.cur.peek()) {
                let d = (self.cur.peek() - b'0') as i32;
                exp = exp.saturating_mul(10).saturating_add(d);
                exp_digits += 1;
                self.cur.bump();
            }
            if exp_digits == 0 {
                self.record_at(ErrorKind::InvalidNumber, mark);
                self.sync_number();
                return None;
            }
            value_f *= 10f64.powi(if exp_negative { -exp } else { exp });
        }

        // `123abc` and `1.2.3` are not numbers.
        if is_ident_continue(self.cur.peek()) || self.cur.peek() == b'.' {
            self.record_at(ErrorKind::InvalidNumber, mark);
            self.sync_number();
            return None;
        }

        if is_float {
            if !value_f.is_finite() {
                self.record_at(ErrorKind::NumberOverflow, mark);
                return None;
            }
            let v = if negative { -value_f } else { value_f };
            Some(self.arenas.push_value(Value::Float(v)))
        } else {
            if overflow {
                self.record_at(ErrorKind::NumberOverflow, mark);
                return None;
            }
            let v = if negative {
                (acc as i64).wrapping_neg()
            } else {
                acc as i64
            };
            Some(self.arenas.push_value(Value::Int(v)))
        }
    }

    fn parse_radix_digits(
        &mut self,
        radix: u64,
        pred: fn(u8) -> bool,
        negative: bool,
        limit: u64,
        mark: Mark,
    ) -> Option<ValueId> {
        let mut acc: u64 = 0;
        let mut digits = 0usize;
        let mut overflow = false;
        while pred(self.cur.peek()) {
            let d = hex_value(self.cur.peek()) as u64;
            if acc > (limit - d) / radix {
                overflow = true;
            } else {
                acc = acc * radix + d;
            }
            digits += 1;
            self.cur.bump();
        }
        if digits == 0 || is_ident_continue(self.cur.peek()) {
            self.record_at(ErrorKind::InvalidNumber, mark);
            self.sync_number();
            return None;
        }
        if overflow {
            self.record_at(ErrorKind::NumberOverflow, mark);
            return None;
        }
        let v = if negative {
            (acc as i64).wrapping_neg()
        } else {
            acc as i64
        };
        Some(self.arenas.push_value(Value::Int(v)))
    }

    /// Skips the remainder of a malformed number token.
    fn sync_number(&mut self) {
        while !self.cur.at_end()
            && (is_ident_continue(self.cur.peek()) || self.cur.peek() == b'.')
        {
            self.cur.bump();
        }
    }

    /// Parses `true`, `false` or `null`, case-insensitively (the dispatch
    /// accepts both cases of the leading letter). A word that is none of the
    /// three is an open string that happens to share a first letter.
    pub(crate) fn parse_literal(&mut self) -> Option<ValueId> {
        let rest = self.cur.rest();
        let mut n = 0;
        while n < rest.len() && is_ident_continue(rest[n]) {
            n += 1;
        }
        let word = &rest[..n];
        let value = if word.eq_ignore_ascii_case(b"true") {
            Some(Value::Bool(true))
        } else if word.eq_ignore_ascii_case(b"false") {
            Some(Value::Bool(false))
        } else if word.eq_ignore_ascii_case(b"null") {
            Some(Value::Null)
        } else {
            None
        };
        match value {
            Some(v) => {
                self.cur.advance(n);
                Some(self.arenas.push_value(v))
            }
            None => {
                let span = self.parse_unquoted_string()?;
                Some(self.arenas.push_value(Value::String(span)))
            }
        }
    }
}

#[inline(always)]
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, Parser, Value};

    fn parse_one(input: &[u8]) -> Result<Value, ErrorKind> {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(input);
        match err {
            Some(err) => Err(err.kind),
            None => Ok(parser.value(root.unwrap())),
        }
    }

    #[test]
    fn integers() {
        assert_eq!(parse_one(b"0"), Ok(Value::Int(0)));
        assert_eq!(parse_one(b"42"), Ok(Value::Int(42)));
        assert_eq!(parse_one(b"-17"), Ok(Value::Int(-17)));
        assert_eq!(parse_one(b"+17"), Ok(Value::Int(17)));
    }

    #[test]
    fn integer_limits() {
        assert_eq!(
            parse_one(b"9223372036854775807"),
            Ok(Value::Int(i64::MAX))
        );
        assert_eq!(
            parse_one(b"-9223372036854775808"),
            Ok(Value::Int(i64::MIN))
        );
        assert_eq!(
            parse_one(b"9223372036854775808"),
            Err(ErrorKind::NumberOverflow)
        );
        assert_eq!(
            parse_one(b"-9223372036854775809"),
            Err(ErrorKind::NumberOverflow)
        );
        assert_eq!(
            parse_one(b"99999999999999999999"),
            Err(ErrorKind::NumberOverflow)
        );
    }

    /// Fractional digits accumulate with a decrementing divisor, so results
    /// can be off by an ulp from the decimal literal; compare with a relative
    /// tolerance.
    fn assert_float(input: &[u8], expected: f64) {
        match parse_one(input) {
            Ok(Value::Float(f)) => {
                let tolerance = expected.abs() * 1e-12 + f64::MIN_POSITIVE;
                assert!(
                    (f - expected).abs() <= tolerance,
                    "{f} != {expected} for {:?}",
                    std::str::from_utf8(input)
                );
            }
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn floats() {
        assert_float(b"3.5", 3.5);
        assert_float(b"-0.25", -0.25);
        assert_float(b"10.0", 10.0);
        assert_float(b"1234.5678", 1234.5678);
    }

    #[test]
    fn long_integer_body_may_still_be_a_float() {
        assert_float(b"99999999999999999999.0", 1e20);
    }

    #[test]
    fn exponents() {
        assert_float(b"1e3", 1000.0);
        assert_float(b"2.5E-3", 0.0025);
        assert_float(b"1e+2", 100.0);
        assert_eq!(parse_one(b"1e400"), Err(ErrorKind::NumberOverflow));
        assert_eq!(parse_one(b"1e"), Err(ErrorKind::InvalidNumber));
    }

    #[test]
    fn radix_integers() {
        assert_eq!(parse_one(b"0x1F"), Ok(Value::Int(31)));
        assert_eq!(parse_one(b"0XFF"), Ok(Value::Int(255)));
        assert_eq!(parse_one(b"0o17"), Ok(Value::Int(15)));
        assert_eq!(parse_one(b"0b101"), Ok(Value::Int(5)));
        assert_eq!(parse_one(b"-0x10"), Ok(Value::Int(-16)));
        assert_eq!(
            parse_one(b"0x7FFFFFFFFFFFFFFF"),
            Ok(Value::Int(i64::MAX))
        );
        assert_eq!(
            parse_one(b"-0x8000000000000000"),
            Ok(Value::Int(i64::MIN))
        );
        assert_eq!(
            parse_one(b"0x8000000000000000"),
            Err(ErrorKind::NumberOverflow)
        );
        assert_eq!(parse_one(b"0x"), Err(ErrorKind::InvalidNumber));
        assert_eq!(parse_one(b"0b102"), Err(ErrorKind::InvalidNumber));
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(parse_one(b"-"), Err(ErrorKind::InvalidNumber));
        assert_eq!(parse_one(b"+"), Err(ErrorKind::InvalidNumber));
        assert_eq!(parse_one(b"1."), Err(ErrorKind::InvalidNumber));
        assert_eq!(parse_one(b"1.2.3"), Err(ErrorKind::InvalidNumber));
        assert_eq!(parse_one(b"123abc"), Err(ErrorKind::InvalidNumber));
    }

    #[test]
    fn literals() {
        assert_eq!(parse_one(b"true"), Ok(Value::Bool(true)));
        assert_eq!(parse_one(b"false"), Ok(Value::Bool(false)));
        assert_eq!(parse_one(b"null"), Ok(Value::Null));
        assert_eq!(parse_one(b"True"), Ok(Value::Bool(true)));
        assert_eq!(parse_one(b"FALSE"), Ok(Value::Bool(false)));
        assert_eq!(parse_one(b"NULL"), Ok(Value::Null));
    }

    #[test]
    fn near_literals_are_open_strings() {
        let mut parser = Parser::new();
        let (root, err) = parser.parse_value(b"truthy");
        assert_eq!(err, None);
        match parser.value(root.unwrap()) {
            Value::String(s) => assert_eq!(parser.string(s), "truthy"),
            other => panic!("{other:?}"),
        }
    }
}
