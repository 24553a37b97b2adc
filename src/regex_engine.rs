// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The public face of the regex engine: compile once, search many times,
//! skip recompilation when the same pattern is compiled again with the
//! same flags (a host search dialog re-running `Compile` on every
//! keystroke is the expected caller, so the cache is a single-entry
//! fingerprint, not an LRU).

use crate::backtrack::{self, Captures};
use crate::compile::{self, CompileOptions};
use crate::error::Error;
use crate::input::CharacterIndexer;
use crate::inst::Program;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Fingerprint {
    pattern: Vec<u8>,
    opts_bits: u8,
}

impl Fingerprint {
    fn of(pattern: &[u8], opts: CompileOptions) -> Fingerprint {
        let mut bits = 0u8;
        if opts.case_sensitive {
            bits |= 1;
        }
        if opts.posix {
            bits |= 2;
        }
        Fingerprint { pattern: pattern.to_vec(), opts_bits: bits }
    }
}

/// A compiled pattern, ready to search over any number of
/// `CharacterIndexer`-backed texts.
#[derive(Clone, Debug, Default)]
pub struct RegexEngine {
    prog: Program,
    fingerprint: Option<Fingerprint>,
}

/// Whether a structurally broken program was found mid-match. Per
/// `spec.md` §7, this should never happen for a program this engine's
/// own `compile` produced; it exists as a diagnostic escape hatch, not
/// a recoverable error a caller is expected to branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchDiagnostics {
    pub program_invalid: bool,
}

impl RegexEngine {
    pub fn new() -> RegexEngine {
        RegexEngine { prog: Program::new(), fingerprint: None }
    }

    /// Compile `pattern`. If an identical pattern (bytes and options) was
    /// the last one successfully compiled on this engine, this is a
    /// no-op and the previous program is reused.
    pub fn compile(&mut self, pattern: &[u8], opts: CompileOptions) -> Result<(), Error> {
        let fp = Fingerprint::of(pattern, opts);
        if self.fingerprint.as_ref() == Some(&fp) {
            log::trace!("compile cache hit for a {}-byte pattern", pattern.len());
            return Ok(());
        }
        let prog = compile::compile(pattern, opts)?;
        log::trace!("compiled pattern into a {}-byte program", prog.len());
        self.prog = prog;
        self.fingerprint = Some(fp);
        Ok(())
    }

    /// True iff a pattern has been successfully compiled and is ready to
    /// search with.
    pub fn is_compiled(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// Search `idx[lp..endp)` for the compiled pattern. Returns `None`
    /// if nothing has been compiled yet or the pattern did not match.
    pub fn execute(&self, idx: &dyn CharacterIndexer, lp: usize, endp: usize) -> Option<Captures> {
        if self.fingerprint.is_none() {
            return None;
        }
        let result = backtrack::search(&self.prog, idx, lp, endp);
        if result.failure {
            log::trace!("regex execute hit a structurally invalid program");
        }
        result.captures
    }

    /// As `execute`, but also surfaces whether the search ended in a
    /// diagnostic "program invalid" state rather than an ordinary
    /// no-match.
    pub fn execute_with_diagnostics(
        &self,
        idx: &dyn CharacterIndexer,
        lp: usize,
        endp: usize,
    ) -> (Option<Captures>, MatchDiagnostics) {
        if self.fingerprint.is_none() {
            return (None, MatchDiagnostics { program_invalid: false });
        }
        let result = backtrack::search(&self.prog, idx, lp, endp);
        (result.captures, MatchDiagnostics { program_invalid: result.failure })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ByteIndexer;

    fn co() -> CompileOptions {
        CompileOptions { case_sensitive: true, posix: false }
    }

    #[test]
    fn compiles_and_executes() {
        let mut eng = RegexEngine::new();
        eng.compile(br"fo+", co()).unwrap();
        let idx = ByteIndexer::new(b"  foo  ");
        let caps = eng.execute(&idx, 0, 7).unwrap();
        assert_eq!((caps.bopat[0], caps.eopat[0]), (2, 5));
    }

    #[test]
    fn recompiling_identical_pattern_is_a_cache_hit() {
        let mut eng = RegexEngine::new();
        eng.compile(b"abc", co()).unwrap();
        let fp_before = eng.fingerprint.clone();
        eng.compile(b"abc", co()).unwrap();
        assert_eq!(eng.fingerprint, fp_before);
    }

    #[test]
    fn recompiling_different_pattern_replaces_program() {
        let mut eng = RegexEngine::new();
        eng.compile(b"abc", co()).unwrap();
        eng.compile(b"xyz", co()).unwrap();
        let idx = ByteIndexer::new(b"xyz");
        assert!(eng.execute(&idx, 0, 3).is_some());
    }

    #[test]
    fn execute_before_compile_returns_none() {
        let eng = RegexEngine::new();
        let idx = ByteIndexer::new(b"abc");
        assert!(eng.execute(&idx, 0, 3).is_none());
    }

    #[test]
    fn invalid_pattern_leaves_previous_program_in_place() {
        let mut eng = RegexEngine::new();
        eng.compile(b"abc", co()).unwrap();
        assert!(eng.compile(b"[abc", co()).is_err());
        let idx = ByteIndexer::new(b"abc");
        assert!(eng.execute(&idx, 0, 3).is_some());
    }
}
