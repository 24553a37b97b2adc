// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small backtracking regular-expression engine, plus an incremental
//! SQL lexer/folder and a properties-file lexer/folder, for embedding
//! in an editor component.
//!
//! The three pieces share nothing but a logging discipline (via the
//! `log` facade — the embedding application picks the sink) and the
//! general shape of running against a host-provided document rather
//! than owning a buffer:
//!
//! - [`regex_engine::RegexEngine`] compiles a pattern once and searches
//!   it over any number of [`input::CharacterIndexer`]-backed texts.
//! - [`sql::SqlLexer`] and [`properties`] both run against a host
//!   [`host::Styler`] (and, for SQL, [`host::WordList`] keyword sets),
//!   producing per-byte styles and per-line fold levels incrementally.
//!
//! None of the three owns a document buffer or a widget; all of that
//! lives on the host side of the traits in [`input`] and [`host`].

pub mod backtrack;
pub mod compile;
pub mod error;
pub mod host;
pub mod input;
pub mod inst;
pub mod options;
pub mod properties;
pub mod regex_engine;
pub mod sql;

#[cfg(test)]
pub(crate) mod test_support;

pub use backtrack::Captures;
pub use compile::CompileOptions;
pub use error::Error;
pub use host::{Styler, WordList};
pub use input::{ByteIndexer, CharacterIndexer, Direction};
pub use options::{PropertiesOptions, SqlOptions};
pub use regex_engine::{MatchDiagnostics, RegexEngine};
pub use sql::SqlLexer;
