// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `SqlLexer::Fold`: a second pass over lines already styled by
//! `colourise`, producing one fold level per line from a per-line
//! nested-statement bitfield.

use crate::host::{Styler, SC_FOLDLEVELBASE, SC_FOLDLEVELHEADERFLAG, SC_FOLDLEVELWHITEFLAG};
use crate::options::SqlOptions;
use crate::sql::*;

/// Packed per-line fold state: 9 bits of nested-CASE depth plus seven
/// flags. A plain value type, not a bitflags type, because several of
/// the fields (`nested_cases`) aren't booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FoldState(u16);

impl FoldState {
    const NESTED_CASES_MASK: u16 = 0x01FF;
    const IN_SELECT_OR_ASSIGN: u16 = 1 << 9;
    const CASE_MERGE_NO_WHEN: u16 = 1 << 10;
    const IN_MERGE: u16 = 1 << 11;
    const IN_DECLARE: u16 = 1 << 12;
    const IN_EXCEPTION: u16 = 1 << 13;
    const IN_CONDITION: u16 = 1 << 14;
    const IGNORE_WHEN: u16 = 1 << 15;

    pub fn new() -> FoldState {
        FoldState(0)
    }

    pub fn nested_cases(&self) -> u16 {
        self.0 & Self::NESTED_CASES_MASK
    }

    pub fn set_nested_cases(&mut self, v: u16) {
        let v = v.min(Self::NESTED_CASES_MASK);
        self.0 = (self.0 & !Self::NESTED_CASES_MASK) | v;
    }

    pub fn inc_nested_cases(&mut self) {
        self.set_nested_cases(self.nested_cases().saturating_add(1));
    }

    pub fn dec_nested_cases(&mut self) {
        self.set_nested_cases(self.nested_cases().saturating_sub(1));
    }

    fn flag(&self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    fn set_flag(&mut self, bit: u16, v: bool) {
        if v {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn in_select_or_assign(&self) -> bool {
        self.flag(Self::IN_SELECT_OR_ASSIGN)
    }
    pub fn set_in_select_or_assign(&mut self, v: bool) {
        self.set_flag(Self::IN_SELECT_OR_ASSIGN, v)
    }
    pub fn case_merge_no_when(&self) -> bool {
        self.flag(Self::CASE_MERGE_NO_WHEN)
    }
    pub fn set_case_merge_no_when(&mut self, v: bool) {
        self.set_flag(Self::CASE_MERGE_NO_WHEN, v)
    }
    pub fn in_merge(&self) -> bool {
        self.flag(Self::IN_MERGE)
    }
    pub fn set_in_merge(&mut self, v: bool) {
        self.set_flag(Self::IN_MERGE, v)
    }
    pub fn in_declare(&self) -> bool {
        self.flag(Self::IN_DECLARE)
    }
    pub fn set_in_declare(&mut self, v: bool) {
        self.set_flag(Self::IN_DECLARE, v)
    }
    pub fn in_exception(&self) -> bool {
        self.flag(Self::IN_EXCEPTION)
    }
    pub fn set_in_exception(&mut self, v: bool) {
        self.set_flag(Self::IN_EXCEPTION, v)
    }
    pub fn in_condition(&self) -> bool {
        self.flag(Self::IN_CONDITION)
    }
    pub fn set_in_condition(&mut self, v: bool) {
        self.set_flag(Self::IN_CONDITION, v)
    }
    pub fn ignore_when(&self) -> bool {
        self.flag(Self::IGNORE_WHEN)
    }
    pub fn set_ignore_when(&mut self, v: bool) {
        self.set_flag(Self::IGNORE_WHEN, v)
    }
}

/// Grow `states` to cover `len` lines. §6.1's Open Question resolution:
/// always store, unconditionally, rather than only when the computed
/// word is non-zero — the latter would silently drop state for blank
/// lines and break restartability.
fn ensure_len(states: &mut Vec<FoldState>, len: usize) {
    if states.len() < len {
        states.resize(len, FoldState::new());
    }
}

fn is_comment_style(style: u8) -> bool {
    matches!(style, SCE_SQL_COMMENT | SCE_SQL_COMMENTLINE | SCE_SQL_COMMENTLINEDOC)
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
}

fn read_lower(styler: &dyn Styler, start: usize, end: usize) -> String {
    (start..end).map(|i| styler.char_at(i).to_ascii_lowercase() as char).collect()
}

/// True iff `line` is (after any leading whitespace) a single
/// line-comment token running to the end of the line.
fn line_is_pure_comment(styler: &dyn Styler, line: usize) -> bool {
    let s = styler.line_start(line);
    let e = styler.line_end(line);
    let mut p = s;
    while p < e && is_space(styler.char_at(p)) {
        p += 1;
    }
    if p >= e {
        return false;
    }
    matches!(styler.style_at(p), SCE_SQL_COMMENTLINE | SCE_SQL_COMMENTLINEDOC)
}

/// Run the folder over `styler[start, start+length)`, persisting
/// per-line state in `states` (owned by the calling `SqlLexer`
/// instance so it survives between incremental calls).
pub fn fold(
    states: &mut Vec<FoldState>,
    styler: &mut dyn Styler,
    start: usize,
    length: usize,
    opts: SqlOptions,
) {
    if !opts.fold_enable || length == 0 {
        return;
    }
    let end = start + length;
    let start_line = styler.line_of(start);
    let end_line = styler.line_of(end.saturating_sub(1).max(start));

    let mut level_current = if start_line > 0 {
        styler.level_at(start_line - 1) & !SC_FOLDLEVELHEADERFLAG & !SC_FOLDLEVELWHITEFLAG
    } else {
        SC_FOLDLEVELBASE
    };

    // Carried forward from the previous line, not re-read per line: a
    // line's `FoldState` describes what's still open going into it, the
    // same way `level_current` does for fold depth. `states[line]` is
    // only ever written to, as a cache of what this pass computed.
    let mut st = if start_line > 0 {
        states.get(start_line - 1).copied().unwrap_or_default()
    } else {
        FoldState::new()
    };

    for line in start_line..=end_line {
        ensure_len(states, line + 1);

        let line_start = styler.line_start(line);
        let line_end = styler.line_end(line);

        let mut level_next = level_current;
        let mut statement_found = false;
        let mut had_visible = false;
        let mut dropped_once = false;
        let mut pending_end_delta: i32 = 0;
        let mut in_comment = line_start > 0 && is_comment_style(styler.style_at(line_start - 1));

        let mut pos = line_start;
        while pos < line_end {
            let style = styler.style_at(pos);
            let c = styler.char_at(pos);
            let is_comment_now = is_comment_style(style);

            if !is_space(c) {
                had_visible = true;
            }

            if opts.fold_comment {
                if style == SCE_SQL_COMMENT && !in_comment {
                    level_next += 1;
                } else if in_comment && style != SCE_SQL_COMMENT && styler.style_at(pos - 1) == SCE_SQL_COMMENT {
                    level_next -= 1;
                }
            }
            in_comment = is_comment_now;

            if is_comment_now {
                pos += 1;
                continue;
            }

            match c {
                b'(' => {
                    level_next += 1;
                    pos += 1;
                }
                b')' => {
                    let would_be = level_next - 1;
                    if would_be < level_current {
                        if !dropped_once {
                            dropped_once = true;
                            level_next = would_be.max(SC_FOLDLEVELBASE);
                        } else {
                            level_next = level_current;
                        }
                    } else {
                        level_next = would_be;
                    }
                    pos += 1;
                }
                b':' if pos + 1 < line_end && styler.char_at(pos + 1) == b'=' => {
                    st.set_in_select_or_assign(true);
                    pos += 2;
                }
                b';' => {
                    if st.in_merge() {
                        level_next -= if st.case_merge_no_when() { 2 } else { 1 };
                        level_next = level_next.max(SC_FOLDLEVELBASE);
                        st.set_in_merge(false);
                        st.set_case_merge_no_when(false);
                    }
                    st.set_in_select_or_assign(false);
                    if pending_end_delta != 0 {
                        st.set_in_exception(false);
                    }
                    st.set_ignore_when(false);
                    statement_found = true;
                    pos += 1;
                }
                _ if style == SCE_SQL_WORD || style == SCE_SQL_WORD2 => {
                    let wstart = pos;
                    while pos < line_end && matches!(styler.style_at(pos), SCE_SQL_WORD | SCE_SQL_WORD2) {
                        pos += 1;
                    }
                    let word = read_lower(styler, wstart, pos);
                    apply_keyword(
                        &word,
                        &mut st,
                        &mut level_next,
                        &mut statement_found,
                        &mut pending_end_delta,
                        opts,
                    );
                }
                _ => {
                    pos += 1;
                }
            }
        }

        level_next = level_next.max(SC_FOLDLEVELBASE);

        let is_comment_line = line_is_pure_comment(styler, line);
        let prev_is_comment_line = line > 0 && line_is_pure_comment(styler, line - 1);
        let next_is_comment_line = line_is_pure_comment(styler, line + 1);

        let mut stored_level = level_current;
        let mut header = level_next > level_current;

        if is_comment_line {
            if prev_is_comment_line {
                stored_level = level_current + 1;
            }
            header = !prev_is_comment_line && next_is_comment_line;
        } else {
            stored_level = level_current;
        }

        let mut packed = stored_level;
        if header {
            packed |= SC_FOLDLEVELHEADERFLAG;
        }
        if !had_visible && opts.fold_compact {
            packed |= SC_FOLDLEVELWHITEFLAG;
        }
        styler.set_level(line, packed);
        log::trace!("fold line {}: level {} header {}", line, stored_level, header);

        states[line] = st;
        level_current = level_next;
    }
}

fn apply_keyword(
    word: &str,
    st: &mut FoldState,
    level_next: &mut i32,
    statement_found: &mut bool,
    pending_end_delta: &mut i32,
    opts: SqlOptions,
) {
    match word {
        "select" => {
            st.set_in_select_or_assign(true);
        }
        "if" | "loop" | "case" | "while" | "repeat" => {
            if *pending_end_delta != 0 {
                *level_next += *pending_end_delta;
                *pending_end_delta = 0;
            } else {
                st.set_in_condition(true);
                if word == "case" {
                    st.inc_nested_cases();
                    st.set_case_merge_no_when(true);
                }
            }
        }
        "then" => {
            if st.in_condition() {
                st.set_in_condition(false);
                if !*statement_found {
                    *level_next += 1;
                }
            }
        }
        "elsif" if opts.fold_at_else && !*statement_found => {
            st.set_in_condition(true);
            *level_next -= 1;
        }
        "else" if opts.fold_at_else && !*statement_found => {
            if st.case_merge_no_when() {
                *level_next += 1;
            } else {
                *level_next -= 1;
            }
        }
        "begin" | "start" => {
            *level_next += 1;
            st.set_in_declare(false);
            *statement_found = true;
        }
        "end" | "endif" => {
            let mut delta = 1;
            if st.in_select_or_assign() && !st.case_merge_no_when() {
                delta += 1;
            }
            *level_next -= delta;
            *pending_end_delta = delta;
            if st.nested_cases() > 0 {
                st.dec_nested_cases();
            }
        }
        "when" if !st.ignore_when() && !st.in_exception() && (st.in_merge() || st.nested_cases() > 0) => {
            st.set_in_condition(true);
            if !*statement_found && !st.case_merge_no_when() {
                *level_next -= 1;
            }
            st.set_case_merge_no_when(false);
        }
        "exit" => {
            st.set_ignore_when(true);
        }
        "exception" if !st.in_declare() => {
            st.set_in_exception(true);
        }
        "declare" | "function" | "procedure" | "package" => {
            st.set_in_declare(true);
        }
        "merge" => {
            st.set_in_merge(true);
            st.set_case_merge_no_when(true);
            *level_next += 1;
            *statement_found = true;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_cases_saturates() {
        let mut st = FoldState::new();
        st.set_nested_cases(600);
        assert_eq!(st.nested_cases(), 511);
    }

    #[test]
    fn flags_roundtrip() {
        let mut st = FoldState::new();
        st.set_in_merge(true);
        st.set_case_merge_no_when(true);
        assert!(st.in_merge());
        assert!(st.case_merge_no_when());
        st.set_in_merge(false);
        assert!(!st.in_merge());
        assert!(st.case_merge_no_when());
    }

    #[test]
    fn ensure_len_always_grows() {
        let mut v = Vec::new();
        ensure_len(&mut v, 3);
        assert_eq!(v.len(), 3);
        ensure_len(&mut v, 2);
        assert_eq!(v.len(), 3);
    }
}
