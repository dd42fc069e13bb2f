//! Shared driver that stands in for the host parser.
//!
//! The real parser decides per position which external tokens are
//! admissible, rolls the lexer back when a scan fails, resumes at the
//! committed token end when it succeeds, and lexes all internal tokens
//! itself. These helpers reproduce exactly that calling convention over a
//! [`StrCursor`].

use puppet_scanner::{Cursor, Scanner, StrCursor, TokenType, ValidSymbols};

/// One scan call: fresh token extents, rollback on failure, resume at the
/// token end on success. Returns the token and its text.
pub fn scan(
    scanner: &mut Scanner,
    cur: &mut StrCursor,
    admissible: &[TokenType],
) -> Option<(TokenType, String)> {
    cur.begin_token();
    let saved = cur.checkpoint();
    match scanner.scan(cur, ValidSymbols::of(admissible)) {
        Some(token) => {
            let text = cur.token_text();
            cur.resume_at_token_end();
            Some((token, text))
        }
        None => {
            cur.restore(saved);
            None
        }
    }
}

/// A scan the test expects to succeed; panics with context otherwise.
pub fn expect(
    scanner: &mut Scanner,
    cur: &mut StrCursor,
    admissible: &[TokenType],
    token: TokenType,
    text: &str,
) {
    let got = scan(scanner, cur, admissible);
    assert_eq!(
        got,
        Some((token, text.to_string())),
        "at position {} the scanner should emit {token:?} {text:?}",
        cur.position(),
    );
}

/// The parser lexing one of its own tokens: consume `text` verbatim.
pub fn pass_through(cur: &mut StrCursor, text: &str) {
    for expected in text.chars() {
        assert_eq!(
            cur.lookahead(),
            Some(expected),
            "parser-side token mismatch at position {}",
            cur.position(),
        );
        cur.advance(false);
    }
}
