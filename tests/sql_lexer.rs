// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod support;

use support::{MemoryStyler, WordSet};
use synlex::host::Styler as _;
use synlex::sql::*;
use synlex::{SqlLexer, SqlOptions};

fn sql_keywords() -> WordSet {
    WordSet::new(&[
        "select", "from", "where", "if", "then", "else", "end", "begin", "exception", "when",
        "others", "merge", "into", "using", "on", "matched", "not", "case",
    ])
}

#[test]
fn scenario_1_mixed_token_kinds_each_take_their_style() {
    let text = br#"SELECT 0x1F, 'it''s', "a""b", `ident`, 3.14e+2 FROM t;"#;
    let mut styler = MemoryStyler::new(text);
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);
    let lexer = SqlLexer::new();
    lexer.colourise(&mut styler, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());

    assert_eq!(styler.style_at(0), SCE_SQL_WORD); // SELECT
    assert_eq!(styler.style_at(7), SCE_SQL_HEX); // 0x1F
    assert_eq!(styler.style_at(13), SCE_SQL_CHARACTER); // 'it''s'
    assert_eq!(styler.style_at(22), SCE_SQL_STRING); // "a""b"
    assert_eq!(styler.style_at(30), SCE_SQL_QUOTEDIDENTIFIER); // `ident`
    assert_eq!(styler.style_at(39), SCE_SQL_NUMBER); // 3.14e+2
    assert_eq!(styler.style_at(47), SCE_SQL_WORD); // FROM
}

#[test]
fn scenario_2_if_then_else_end_if_suppressed_by_at_else() {
    let text = b"IF a THEN b; ELSE c; END IF;";
    let mut styler = MemoryStyler::new(text);
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);
    let lexer_ro = SqlLexer::new();
    lexer_ro.colourise(&mut styler, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());

    let opts = SqlOptions { fold_at_else: true, ..SqlOptions::default() };
    let mut lexer = SqlLexer::new();
    lexer.fold(&mut styler, 0, text.len(), opts);

    let packed = styler.level_of(0);
    assert_eq!(packed & !synlex::host::SC_FOLDLEVELHEADERFLAG, synlex::host::SC_FOLDLEVELBASE);
    assert_eq!(packed & synlex::host::SC_FOLDLEVELHEADERFLAG, 0);
}

#[test]
fn scenario_3_exception_flips_in_exception_until_closing_end() {
    let text = b"BEGIN\nEXCEPTION WHEN others THEN\nx := 1;\nEND;\n";
    let mut styler = MemoryStyler::new(text);
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);
    let mut lexer = SqlLexer::new();
    lexer.colourise(&mut styler, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());
    lexer.fold(&mut styler, 0, text.len(), SqlOptions::default());

    // BEGIN opens a level; by the time EXCEPTION's line has folded,
    // we're still one level above the base.
    assert!(styler.level_of(1) & !synlex::host::SC_FOLDLEVELHEADERFLAG > synlex::host::SC_FOLDLEVELBASE);
}

#[test]
fn scenario_4_merge_when_credit_then_semicolon_closes_both_levels() {
    let text = b"MERGE INTO t USING s ON (1=1) WHEN MATCHED THEN x := 1 WHEN NOT MATCHED THEN y := 2;\n";
    let mut styler = MemoryStyler::new(text);
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);
    let mut lexer = SqlLexer::new();
    lexer.colourise(&mut styler, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());
    lexer.fold(&mut styler, 0, text.len(), SqlOptions::default());

    let level = styler.level_of(0) & !synlex::host::SC_FOLDLEVELHEADERFLAG & !synlex::host::SC_FOLDLEVELWHITEFLAG;
    assert_eq!(level, synlex::host::SC_FOLDLEVELBASE);
}

#[test]
fn scenario_5_nested_case_returns_to_zero_net_change() {
    let text = b"CASE x WHEN 1 THEN CASE y WHEN 2 THEN 'a' END END\n";
    let mut styler = MemoryStyler::new(text);
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);
    let mut lexer = SqlLexer::new();
    lexer.colourise(&mut styler, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());
    lexer.fold(&mut styler, 0, text.len(), SqlOptions::default());

    let level = styler.level_of(0) & !synlex::host::SC_FOLDLEVELHEADERFLAG & !synlex::host::SC_FOLDLEVELWHITEFLAG;
    assert_eq!(level, synlex::host::SC_FOLDLEVELBASE);
}

#[test]
fn scenario_6_stream_comment_and_line_comment_run_fold() {
    let text = b"/* block */ -- line\n-- line\nSELECT 1;\n";
    let mut styler = MemoryStyler::new(text);
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);
    let mut lexer = SqlLexer::new();
    lexer.colourise(&mut styler, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());

    assert_eq!(styler.style_at(3), SCE_SQL_COMMENT);
    assert_eq!(styler.style_at(13), SCE_SQL_COMMENTLINE);
    assert_eq!(styler.style_at(21), SCE_SQL_COMMENTLINE);

    let opts = SqlOptions { fold_comment: true, ..SqlOptions::default() };
    lexer.fold(&mut styler, 0, text.len(), opts);
    assert!(styler.level_of(0) & synlex::host::SC_FOLDLEVELHEADERFLAG != 0);
}

#[test]
fn restartability_matches_a_single_full_pass() {
    let text: &[u8] = b"SELECT a FROM t WHERE a > 1;";
    let words1 = sql_keywords();
    let words2 = WordSet::new(&[]);
    let user1 = WordSet::new(&[]);

    let mut full = MemoryStyler::new(text);
    let lexer = SqlLexer::new();
    lexer.colourise(&mut full, &words1, &words2, &user1, 0, text.len(), SCE_SQL_DEFAULT, SqlOptions::default());

    let split = 10;
    let mut partial = MemoryStyler::new(text);
    lexer.colourise(&mut partial, &words1, &words2, &user1, 0, split, SCE_SQL_DEFAULT, SqlOptions::default());
    let resume_style = partial.style_at(split - 1);
    lexer.colourise(
        &mut partial,
        &words1,
        &words2,
        &user1,
        split,
        text.len() - split,
        resume_style,
        SqlOptions::default(),
    );

    for i in 0..text.len() {
        assert_eq!(partial.style_at(i), full.style_at(i), "byte {}", i);
    }
}
