// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `SqlLexer::Colourise`: a streaming Mealy machine over a `Styler`.
//! Each position either extends the current token or closes it (with,
//! for identifiers, a keyword-list lookup deciding the final style of
//! the whole span) and opens the next one.

use crate::host::{Styler, WordList};
use crate::options::SqlOptions;
use crate::sql::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Default,
    Number { seen_dot: bool, in_exponent: bool, awaiting_sign: bool },
    Hex,
    Hex2 { quote: u8 },
    Bit,
    Bit2 { quote: u8 },
    Variable,
    Identifier,
    QuotedIdentifier,
    Comment,
    CommentLine,
    CommentLineDoc,
    Character,
    String,
    Operator,
}

impl State {
    /// The style a mid-token restart, or a range boundary falling
    /// inside this token, should carry. The final style (for
    /// `Identifier`) is only known once the token closes; see
    /// `resolve_identifier`.
    fn provisional_style(&self) -> u8 {
        match self {
            State::Default => SCE_SQL_DEFAULT,
            State::Number { .. } => SCE_SQL_NUMBER,
            State::Hex => SCE_SQL_HEX,
            State::Hex2 { .. } => SCE_SQL_HEX2,
            State::Bit => SCE_SQL_BIT,
            State::Bit2 { .. } => SCE_SQL_BIT2,
            State::Variable => SCE_SQL_VARIABLE,
            State::Identifier => SCE_SQL_IDENTIFIER,
            State::QuotedIdentifier => SCE_SQL_QUOTEDIDENTIFIER,
            State::Comment => SCE_SQL_COMMENT,
            State::CommentLine => SCE_SQL_COMMENTLINE,
            State::CommentLineDoc => SCE_SQL_COMMENTLINEDOC,
            State::Character => SCE_SQL_CHARACTER,
            State::String => SCE_SQL_STRING,
            State::Operator => SCE_SQL_OPERATOR,
        }
    }

    /// Reconstruct a restart state from a previously assigned style.
    /// Sub-token flags (seen_dot, which quote a HEX2/BIT2 literal
    /// expects) can't be recovered from the style alone; restarts are
    /// expected at token boundaries, so this only has to be exactly
    /// right when resuming mid-token is itself an edge case the host
    /// doesn't rely on for correctness, per `spec.md` §4.3's
    /// restartability note.
    fn from_style(style: u8) -> State {
        match style {
            SCE_SQL_NUMBER => State::Number { seen_dot: false, in_exponent: false, awaiting_sign: false },
            SCE_SQL_HEX => State::Hex,
            SCE_SQL_HEX2 => State::Hex2 { quote: b'\'' },
            SCE_SQL_BIT => State::Bit,
            SCE_SQL_BIT2 => State::Bit2 { quote: b'\'' },
            SCE_SQL_VARIABLE => State::Variable,
            SCE_SQL_IDENTIFIER | SCE_SQL_WORD | SCE_SQL_WORD2 | SCE_SQL_USER1 => State::Identifier,
            SCE_SQL_QUOTEDIDENTIFIER => State::QuotedIdentifier,
            SCE_SQL_COMMENT => State::Comment,
            SCE_SQL_COMMENTLINE => State::CommentLine,
            SCE_SQL_COMMENTLINEDOC => State::CommentLineDoc,
            SCE_SQL_CHARACTER => State::Character,
            SCE_SQL_STRING => State::String,
            _ => State::Default,
        }
    }
}

fn char_or_zero(styler: &dyn Styler, pos: usize) -> u8 {
    if pos < styler.length() {
        styler.char_at(pos)
    } else {
        0
    }
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

fn read_lower(styler: &dyn Styler, start: usize, end: usize) -> String {
    (start..end).map(|i| styler.char_at(i).to_ascii_lowercase() as char).collect()
}

fn resolve_identifier(
    styler: &dyn Styler,
    keywords1: &dyn WordList,
    keywords2: &dyn WordList,
    keywords_user1: &dyn WordList,
    start: usize,
    end: usize,
) -> u8 {
    let word = read_lower(styler, start, end);
    if keywords1.in_list(&word) {
        return SCE_SQL_WORD;
    }
    if keywords2.in_list(&word) {
        return SCE_SQL_WORD2;
    }
    let mut p = end;
    while p < styler.length() && is_space(styler.char_at(p)) {
        p += 1;
    }
    if p < styler.length() && styler.char_at(p) == b'(' && keywords_user1.in_list_abbreviated(&word, '(') {
        SCE_SQL_USER1
    } else {
        SCE_SQL_DEFAULT
    }
}

/// Decide what a `Default`-state character starts. Returns the new
/// state and how many bytes its opening delimiter consumes (1 or 2).
fn enter_state(c: u8, next: u8, opts: SqlOptions) -> Option<(State, usize)> {
    if c == b'0' && (next == b'x' || next == b'X') {
        return Some((State::Hex, 2));
    }
    if c == b'0' && (next == b'b' || next == b'B') {
        return Some((State::Bit, 2));
    }
    if (c == b'x' || c == b'X') && (next == b'\'' || next == b'"') {
        return Some((State::Hex2 { quote: next }, 2));
    }
    if (c == b'b' || c == b'B') && next == b'\'' {
        return Some((State::Bit2 { quote: b'\'' }, 2));
    }
    if c.is_ascii_digit() {
        return Some((State::Number { seen_dot: false, in_exponent: false, awaiting_sign: false }, 1));
    }
    if c == b'.' && next.is_ascii_digit() {
        return Some((State::Number { seen_dot: true, in_exponent: false, awaiting_sign: false }, 1));
    }
    if c == b'@' {
        return Some((State::Variable, 1));
    }
    if is_ident_start(c) {
        return Some((State::Identifier, 1));
    }
    if c == b'`' && opts.backtick_identifiers {
        return Some((State::QuotedIdentifier, 1));
    }
    if c == b'/' && next == b'*' {
        return Some((State::Comment, 2));
    }
    if c == b'-' && next == b'-' {
        return Some((State::CommentLine, 2));
    }
    if c == b'#' && opts.numbersign_comment {
        return Some((State::CommentLineDoc, 1));
    }
    if c == b'\'' {
        return Some((State::Character, 1));
    }
    if c == b'"' {
        return Some((State::String, 1));
    }
    if is_operator_char(c) {
        return Some((State::Operator, 1));
    }
    None
}

/// Run the Mealy machine over `styler[start, start+length)`, with
/// `init_style` as the restart style. `words1`/`words2` are the SQL and
/// dialect-extension keyword lists; `words_user1` backs the
/// abbreviation-marker USER1 style.
pub fn colourise(
    styler: &mut dyn Styler,
    words1: &dyn WordList,
    words2: &dyn WordList,
    words_user1: &dyn WordList,
    start: usize,
    length: usize,
    init_style: u8,
    opts: SqlOptions,
) {
    let end = start + length;
    styler.start_at(start);
    let mut state = State::from_style(init_style);
    let mut seg_start = start;
    let mut pos = start;

    while pos < end {
        let c = styler.char_at(pos);
        let next = char_or_zero(styler, pos + 1);

        match &mut state {
            State::Default => {
                if let Some((ns, consumed)) = enter_state(c, next, opts) {
                    flush(styler, seg_start, pos, SCE_SQL_DEFAULT);
                    seg_start = pos;
                    state = ns;
                    pos += consumed;
                } else {
                    pos += 1;
                }
            }

            State::Operator => {
                flush(styler, seg_start, pos + 1, SCE_SQL_OPERATOR);
                seg_start = pos + 1;
                state = State::Default;
                pos += 1;
            }

            State::Number { seen_dot, in_exponent, awaiting_sign } => {
                if c.is_ascii_digit() {
                    *awaiting_sign = false;
                    pos += 1;
                } else if c == b'.' && !*seen_dot && !*in_exponent {
                    *seen_dot = true;
                    pos += 1;
                } else if (c == b'e' || c == b'E') && !*in_exponent {
                    *in_exponent = true;
                    *awaiting_sign = true;
                    pos += 1;
                } else if (c == b'+' || c == b'-') && *awaiting_sign {
                    *awaiting_sign = false;
                    pos += 1;
                } else {
                    flush(styler, seg_start, pos, SCE_SQL_NUMBER);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::Hex => {
                if c.is_ascii_hexdigit() {
                    pos += 1;
                } else {
                    flush(styler, seg_start, pos, SCE_SQL_HEX);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::Bit => {
                if c == b'0' || c == b'1' {
                    pos += 1;
                } else {
                    flush(styler, seg_start, pos, SCE_SQL_BIT);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::Hex2 { quote } => {
                let q = *quote;
                pos += 1;
                if c == q {
                    flush(styler, seg_start, pos, SCE_SQL_HEX2);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::Bit2 { quote } => {
                let q = *quote;
                pos += 1;
                if c == q {
                    flush(styler, seg_start, pos, SCE_SQL_BIT2);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::Variable => {
                if is_ident_char(c, false) {
                    pos += 1;
                } else {
                    flush(styler, seg_start, pos, SCE_SQL_VARIABLE);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::Identifier => {
                if is_ident_char(c, opts.allow_dotted_word) {
                    pos += 1;
                } else {
                    let style = resolve_identifier(styler, words1, words2, words_user1, seg_start, pos);
                    flush(styler, seg_start, pos, style);
                    seg_start = pos;
                    state = State::Default;
                }
            }

            State::QuotedIdentifier => {
                if c == b'`' {
                    if next == b'`' {
                        pos += 2;
                    } else {
                        pos += 1;
                        flush(styler, seg_start, pos, SCE_SQL_QUOTEDIDENTIFIER);
                        seg_start = pos;
                        state = State::Default;
                    }
                } else {
                    pos += 1;
                }
            }

            State::String => {
                if opts.backslash_escapes && c == b'\\' {
                    pos += 2;
                } else if c == b'"' {
                    if next == b'"' {
                        pos += 2;
                    } else {
                        pos += 1;
                        flush(styler, seg_start, pos, SCE_SQL_STRING);
                        seg_start = pos;
                        state = State::Default;
                    }
                } else {
                    pos += 1;
                }
            }

            State::Character => {
                if opts.backslash_escapes && c == b'\\' {
                    pos += 2;
                } else if c == b'\'' {
                    if next == b'\'' || next == b'"' {
                        pos += 2;
                    } else {
                        pos += 1;
                        flush(styler, seg_start, pos, SCE_SQL_CHARACTER);
                        seg_start = pos;
                        state = State::Default;
                    }
                } else {
                    pos += 1;
                }
            }

            State::Comment => {
                if c == b'*' && next == b'/' {
                    pos += 2;
                    flush(styler, seg_start, pos, SCE_SQL_COMMENT);
                    seg_start = pos;
                    state = State::Default;
                } else {
                    pos += 1;
                }
            }

            State::CommentLine => {
                if c == b'\n' || c == b'\r' {
                    flush(styler, seg_start, pos, SCE_SQL_COMMENTLINE);
                    seg_start = pos;
                    state = State::Default;
                } else {
                    pos += 1;
                }
            }

            State::CommentLineDoc => {
                if c == b'\n' || c == b'\r' {
                    flush(styler, seg_start, pos, SCE_SQL_COMMENTLINEDOC);
                    seg_start = pos;
                    state = State::Default;
                } else {
                    pos += 1;
                }
            }
        }
    }

    // The final in-flight token is closed the same way stream
    // exhaustion closes it mid-document: an identifier still gets its
    // keyword lookup, everything else just takes its provisional
    // style.
    let final_style = match state {
        State::Identifier => resolve_identifier(styler, words1, words2, words_user1, seg_start, end),
        ref s => s.provisional_style(),
    };
    flush(styler, seg_start, end, final_style);
}

fn flush(styler: &mut dyn Styler, seg_start: usize, pos: usize, style: u8) {
    if pos > seg_start {
        styler.colour_to(pos - 1, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Styler as _;
    use crate::test_support::{TestStyler, TestWordList};

    fn run(text: &[u8], words1: &[&str], words2: &[&str], user1: &[&str]) -> TestStyler {
        let mut styler = TestStyler::new(text);
        let kw1 = TestWordList::new(words1);
        let kw2 = TestWordList::new(words2);
        let ku1 = TestWordList::new(user1);
        colourise(&mut styler, &kw1, &kw2, &ku1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());
        styler
    }

    #[test]
    fn keywords_and_numbers() {
        let styler = run(b"SELECT 0x1F FROM t;", &["select", "from"], &[], &[]);
        assert_eq!(styler.style_at(0), SCE_SQL_WORD);
        assert_eq!(styler.style_at(7), SCE_SQL_HEX);
        assert_eq!(styler.style_at(12), SCE_SQL_WORD);
    }

    #[test]
    fn doubled_quote_escapes() {
        let styler = run(br#"'it''s'"#, &[], &[], &[]);
        for i in 0..8 {
            assert_eq!(styler.style_at(i), SCE_SQL_CHARACTER);
        }
    }

    #[test]
    fn backtick_identifier() {
        let styler = run(b"`ident`", &[], &[], &[]);
        for i in 0..7 {
            assert_eq!(styler.style_at(i), SCE_SQL_QUOTEDIDENTIFIER);
        }
    }

    #[test]
    fn plain_identifier_is_default_style() {
        let styler = run(b"foo", &["select"], &[], &[]);
        assert_eq!(styler.style_at(0), SCE_SQL_DEFAULT);
    }

    #[test]
    fn restart_mid_document_matches_full_pass() {
        let text: &[u8] = b"SELECT a FROM t WHERE a > 1;";
        let words1 = &["select", "from", "where"];
        let full = run(text, words1, &[], &[]);

        let split = 10;
        let mut partial = TestStyler::new(text);
        let kw1 = TestWordList::new(words1);
        let kw2 = TestWordList::new(&[]);
        let ku1 = TestWordList::new(&[]);
        colourise(&mut partial, &kw1, &kw2, &ku1, 0, split, SCE_SQL_DEFAULT, SqlOptions::default());
        let resume_style = partial.style_at(split - 1);
        colourise(&mut partial, &kw1, &kw2, &ku1, split, text.len() - split, resume_style, SqlOptions::default());

        for i in 0..text.len() {
            assert_eq!(partial.style_at(i), full.style_at(i), "byte {}", i);
        }
    }
}
