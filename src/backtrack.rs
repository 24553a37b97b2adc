// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// This is the backtracking matching engine. Unlike a Thompson NFA
// simulation it keeps no thread list: each opcode either consumes input
// and recurses into the next one, or (for CLO/LCLO/CLQ) tries a small set
// of candidate positions and recurses into the tail at each. Capture
// slots are written optimistically and rolled back on backtrack, so a
// failed branch never leaks a capture bound into a later one.
//
// This engine is not bounded the way a job-stack backtracker is: the
// program it runs over is small and was produced by `compile`, which
// gives every closure exactly one atom to repeat, so pathological
// exponential blowup only shows up on adversarial patterns with nested
// closures, same as any backtracking regex implementation (`spec.md` §5
// calls this out explicitly as a known, accepted behavior).

use crate::inst::{self, Program, MAXTAG, NOTFOUND};
use crate::input::{CharacterIndexer, Direction};

/// Capture bounds for one match: `bopat[0]/eopat[0]` is the whole match,
/// `bopat[n]/eopat[n]` for n in 1..MAXTAG are the parenthesized groups.
/// Unset slots hold `NOTFOUND`.
#[derive(Clone, Debug)]
pub struct Captures {
    pub bopat: [usize; MAXTAG],
    pub eopat: [usize; MAXTAG],
}

struct SearchState {
    bol: usize,
    bopat: [usize; MAXTAG],
    eopat: [usize; MAXTAG],
    failure: bool,
    skip_hint: Option<usize>,
}

impl SearchState {
    fn new(bol: usize) -> SearchState {
        SearchState {
            bol,
            bopat: [NOTFOUND; MAXTAG],
            eopat: [NOTFOUND; MAXTAG],
            failure: false,
            skip_hint: None,
        }
    }
}

/// Result of a top-level search: `Some(captures)` on match, `None` with
/// `failure` set iff the program was structurally invalid (should not
/// happen for a program this crate's own compiler produced; see
/// `spec.md` §7 kind 2).
pub struct SearchResult {
    pub captures: Option<Captures>,
    pub failure: bool,
}

/// Run the matcher over `idx[lp..endp)`. This is `RegexEngine.Execute`'s
/// body; the public wrapper (fingerprint cache, "no program compiled"
/// short-circuit) lives in `regex_engine`.
pub fn search(prog: &Program, idx: &dyn CharacterIndexer, lp: usize, endp: usize) -> SearchResult {
    if prog.is_empty() {
        return SearchResult { captures: None, failure: true };
    }
    let op0 = prog.op_at(0);
    let bol = lp;

    if op0 == inst::END {
        return SearchResult { captures: None, failure: true };
    }

    if op0 == inst::BOL {
        let mut state = SearchState::new(bol);
        return match pmatch(prog, idx, 0, lp, endp, &mut state) {
            Some(end) => SearchResult { captures: Some(finish(&state, lp, end)), failure: false },
            None => SearchResult { captures: None, failure: state.failure },
        };
    }

    if op0 == inst::EOL && prog.len() >= 2 && prog.op_at(1) == inst::END {
        let mut bopat = [NOTFOUND; MAXTAG];
        let mut eopat = [NOTFOUND; MAXTAG];
        bopat[0] = endp;
        eopat[0] = endp;
        return SearchResult { captures: Some(Captures { bopat, eopat }), failure: false };
    }

    let mut cur = lp;
    loop {
        if op0 == inst::CHR {
            let c = prog.code[1];
            while cur < endp && idx.char_at(cur) != c {
                cur += 1;
            }
        }
        let mut state = SearchState::new(bol);
        match pmatch(prog, idx, 0, cur, endp, &mut state) {
            Some(end) => return SearchResult { captures: Some(finish(&state, cur, end)), failure: false },
            None => {
                if state.failure {
                    return SearchResult { captures: None, failure: true };
                }
            }
        }
        if cur >= endp {
            break;
        }
        cur = match state_hint(op0, prog, idx, cur, endp) {
            Some(h) if h > cur => h,
            _ => cur + 1,
        };
    }
    SearchResult { captures: None, failure: false }
}

/// Re-derive the skip hint for the outer scan. `pmatch` already consumed
/// its `&mut SearchState` by the time the loop above needs this, so the
/// hint is recomputed from a throwaway probe at `cur` rather than
/// threaded out of the dropped state; this only matters for the
/// `MATCH_WORD_START`/`MATCH_WORD_END` opcodes at the very front of the
/// program, which is the only place `spec.md` §4.2 calls for a hint.
fn state_hint(op0: u8, prog: &Program, idx: &dyn CharacterIndexer, cur: usize, endp: usize) -> Option<usize> {
    if op0 == inst::MATCH_WORD_START || op0 == inst::MATCH_WORD_END {
        if cur < endp {
            return Some(idx.next_position(cur, Direction::Forward));
        }
    }
    let _ = prog;
    None
}

fn finish(state: &SearchState, start: usize, end: usize) -> Captures {
    let mut bopat = state.bopat;
    let mut eopat = state.eopat;
    bopat[0] = start;
    eopat[0] = end;
    Captures { bopat, eopat }
}

/// Match a single non-closure atom (`CHR`/`ANY`/`CCL`) at `lp`. Returns
/// the position after the consumed character.
fn match_atom(op: u8, prog: &Program, operand_pc: usize, idx: &dyn CharacterIndexer, lp: usize, endp: usize) -> Option<usize> {
    if lp >= endp {
        return None;
    }
    let c = idx.char_at(lp);
    let ok = match op {
        inst::CHR => c == prog.code[operand_pc],
        inst::ANY => true,
        inst::CCL => prog.read_class(operand_pc).contains(c),
        _ => false,
    };
    if ok {
        Some(idx.next_position(lp, Direction::Forward))
    } else {
        None
    }
}

/// The recursive backtracking interpreter. Returns the end position of
/// the match starting at `lp`, or `None` on failure.
fn pmatch(prog: &Program, idx: &dyn CharacterIndexer, pc: usize, lp: usize, endp: usize, state: &mut SearchState) -> Option<usize> {
    let op = prog.op_at(pc);
    match op {
        inst::END => Some(lp),

        inst::CHR => match match_atom(op, prog, pc + 1, idx, lp, endp) {
            Some(nlp) => pmatch(prog, idx, pc + 2, nlp, endp, state),
            None => None,
        },
        inst::ANY => match match_atom(op, prog, pc + 1, idx, lp, endp) {
            Some(nlp) => pmatch(prog, idx, pc + 1, nlp, endp, state),
            None => None,
        },
        inst::CCL => match match_atom(op, prog, pc + 1, idx, lp, endp) {
            Some(nlp) => pmatch(prog, idx, pc + 1 + inst::CCL_SIZE, nlp, endp, state),
            None => None,
        },

        inst::BOL => {
            if lp == state.bol {
                pmatch(prog, idx, pc + 1, lp, endp, state)
            } else {
                None
            }
        }
        inst::EOL => {
            if lp >= endp {
                pmatch(prog, idx, pc + 1, lp, endp, state)
            } else {
                None
            }
        }
        inst::BOW => {
            if idx.is_word_start_at(lp) {
                pmatch(prog, idx, pc + 1, lp, endp, state)
            } else {
                None
            }
        }
        inst::EOW => {
            if idx.is_word_end_at(lp) {
                pmatch(prog, idx, pc + 1, lp, endp, state)
            } else {
                None
            }
        }

        inst::BOT => {
            let n = prog.code[pc + 1] as usize;
            let snapped = idx.move_position_outside_char(lp, Direction::Forward);
            let old = state.bopat[n];
            state.bopat[n] = snapped;
            let r = pmatch(prog, idx, pc + 2, lp, endp, state);
            if r.is_none() {
                state.bopat[n] = old;
            }
            r
        }
        inst::EOT => {
            let n = prog.code[pc + 1] as usize;
            let snapped = idx.move_position_outside_char(lp, Direction::Forward);
            let old = state.eopat[n];
            state.eopat[n] = snapped;
            let r = pmatch(prog, idx, pc + 2, lp, endp, state);
            if r.is_none() {
                state.eopat[n] = old;
            }
            r
        }

        inst::REF => {
            let n = prog.code[pc + 1] as usize;
            let (s, e) = (state.bopat[n], state.eopat[n]);
            if s == NOTFOUND || e == NOTFOUND {
                return None;
            }
            let len = e - s;
            if lp + len > endp {
                return None;
            }
            for k in 0..len {
                if idx.char_at(lp + k) != idx.char_at(s + k) {
                    return None;
                }
            }
            pmatch(prog, idx, pc + 2, lp + len, endp, state)
        }

        inst::CLO | inst::LCLO | inst::CLQ => closure(prog, idx, pc, lp, endp, state),

        inst::MATCH_WORD_START => {
            if idx.is_word_start_at(lp) {
                pmatch(prog, idx, pc + 1, lp, endp, state)
            } else {
                if lp < endp {
                    state.skip_hint = Some(idx.next_position(lp, Direction::Forward));
                }
                None
            }
        }
        inst::MATCH_WORD_END => {
            if idx.is_word_end_at(lp) {
                pmatch(prog, idx, pc + 1, lp, endp, state)
            } else {
                if lp < endp {
                    state.skip_hint = Some(idx.next_position(lp, Direction::Forward));
                }
                None
            }
        }
        inst::MATCH_TO_WORD_END => {
            let nlp = idx.extend_word_select(lp, Direction::Forward);
            if nlp > lp {
                pmatch(prog, idx, pc + 1, nlp, endp, state)
            } else {
                None
            }
        }
        inst::MATCH_TO_WORD_END_OPT => {
            let nlp = idx.extend_word_select(lp, Direction::Forward);
            pmatch(prog, idx, pc + 1, nlp, endp, state)
        }

        _ => {
            state.failure = true;
            None
        }
    }
}

/// Run a `CLO`/`LCLO`/`CLQ` opcode: the single atom inlined at `pc+1`
/// repeats, then the tail (everything after the closure's `END`) is
/// tried at each reachable position. `CLO`/`CLQ` try longest-first
/// (greedy); `LCLO` tries shortest-first (lazy). `CLQ` never repeats the
/// atom more than once.
fn closure(prog: &Program, idx: &dyn CharacterIndexer, pc: usize, lp: usize, endp: usize, state: &mut SearchState) -> Option<usize> {
    let op = prog.op_at(pc);
    let atom_pc = pc + 1;
    let atom_op = prog.op_at(atom_pc);
    let atom_operand_len = inst::operand_len(atom_op);
    let end_pc = atom_pc + 1 + atom_operand_len;
    debug_assert_eq!(prog.op_at(end_pc), inst::END);
    let tail_pc = end_pc + 1;

    let mut positions = vec![lp];
    let mut cur = lp;
    loop {
        if op == inst::CLQ && positions.len() >= 2 {
            break;
        }
        match match_atom(atom_op, prog, atom_pc + 1, idx, cur, endp) {
            Some(n) => {
                cur = n;
                positions.push(cur);
            }
            None => break,
        }
    }

    if op == inst::LCLO {
        for &p in positions.iter() {
            if let Some(end) = pmatch(prog, idx, tail_pc, p, endp, state) {
                return Some(end);
            }
        }
    } else {
        for &p in positions.iter().rev() {
            if let Some(end) = pmatch(prog, idx, tail_pc, p, endp, state) {
                return Some(end);
            }
        }
    }
    None
}
