// Copyright (C) the internet-object-rust contributors. All rights reserved.
//
// This file is part of internet-object-rust, distributed under the MIT
// license. For the full terms, see the included LICENSE file.

//! The single-pass parsing core.

mod arena;
mod classify;
mod cursor;
mod parser;
mod quote;
mod scalar;
mod section;

pub use parser::{Parser, ParserOptions};
