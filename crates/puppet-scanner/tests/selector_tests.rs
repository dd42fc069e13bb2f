//! Selector disambiguation: QMARK and the SELBRACE that may follow it.

mod common;

use common::{expect, pass_through, scan};
use puppet_scanner::{Scanner, StrCursor, TokenType};

const SELECTOR: &[TokenType] = &[TokenType::Qmark, TokenType::Selbrace];

#[test]
fn qmark_then_selbrace() {
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("? {");

    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Qmark, "?");
    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Selbrace, "{");
}

#[test]
fn whitespace_and_newlines_are_skipped() {
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("  \n\t? \n {");

    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Qmark, "?");
    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Selbrace, "{");
}

#[test]
fn brace_without_pending_qmark_is_not_selbrace() {
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("{");
    assert_eq!(scan(&mut scanner, &mut cur, SELECTOR), None);
}

#[test]
fn other_token_clears_the_pending_flag() {
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("? x {");

    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Qmark, "?");
    // The parser lexes something else between the '?' and the '{'.
    assert_eq!(scan(&mut scanner, &mut cur, SELECTOR), None);
    pass_through(&mut cur, " x");
    // The flag is gone, so the '{' is no selector brace anymore.
    assert_eq!(scan(&mut scanner, &mut cur, SELECTOR), None);
}

#[test]
fn selbrace_wins_over_string_when_pending() {
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("? {");

    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Qmark, "?");
    // Even with DQ_STRING admissible the pending flag decides.
    expect(
        &mut scanner,
        &mut cur,
        &[TokenType::Qmark, TokenType::Selbrace, TokenType::DqString],
        TokenType::Selbrace,
        "{",
    );
}

#[test]
fn end_of_input_yields_nothing() {
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("   ");
    assert_eq!(scan(&mut scanner, &mut cur, SELECTOR), None);
}

#[test]
fn selector_inside_expression() {
    // $x ? { 'a' => 1 }
    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new("$x ? { 'a' => 1 }");

    pass_through(&mut cur, "$x");
    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Qmark, "?");
    expect(&mut scanner, &mut cur, SELECTOR, TokenType::Selbrace, "{");

    pass_through(&mut cur, " '");
    expect(
        &mut scanner,
        &mut cur,
        &[TokenType::SqString, TokenType::SqEscapeSequence],
        TokenType::SqString,
        "a",
    );
    pass_through(&mut cur, "' => 1 }");
}
