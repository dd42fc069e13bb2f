//! Scan the interior of a double-quoted Puppet string and print the
//! external tokens the host parser would receive.

use puppet_scanner::{Cursor, Scanner, StrCursor, TokenType, ValidSymbols};

fn main() {
    let interior = "server=$host on port $port!";
    println!("scanning: \"{interior}\"");

    let mask = ValidSymbols::of(&[
        TokenType::DqString,
        TokenType::DqEscapeSequence,
        TokenType::InterpolationNobraceVariable,
        TokenType::InterpolationBraceVariable,
        TokenType::InterpolationExpression,
        TokenType::InterpolationNosigilVariable,
    ]);

    let mut scanner = Scanner::new();
    let mut cur = StrCursor::new(interior);

    loop {
        cur.begin_token();
        let Some(token) = scanner.scan(&mut cur, mask) else {
            break;
        };
        println!("{:>30}: {:?}", format!("{token:?}"), cur.token_text());
        cur.resume_at_token_end();

        // The grammar lexes the bare variable name itself; stand in for it
        // here so the scan loop can continue.
        if token == TokenType::InterpolationNosigilVariable {
            while cur.lookahead().is_some_and(|c| c.is_ascii_lowercase()) {
                cur.advance(false);
            }
        }
    }
}
