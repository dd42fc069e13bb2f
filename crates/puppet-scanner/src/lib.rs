//! Stateful external scanner for the Puppet language.
//!
//! This crate implements the hand-written companion to a table-driven
//! incremental parser: the lexical constructs that need stateful,
//! context-sensitive decisions. It recognizes selector punctuation, quoted
//! string bodies with embedded interpolation, and heredoc bodies whose
//! terminator word is chosen at runtime.
//!
//! # Architecture
//!
//! - **Dispatch by mask**: every [`Scanner::scan`] call receives a
//!   [`ValidSymbols`] mask naming the external tokens the host parser is
//!   currently willing to accept. The dispatcher tries recognizers in a
//!   fixed priority so more specific tokens win over more general ones.
//! - **Cross-call state**: everything the scanner remembers between calls —
//!   the selector flag, the interpolation continuation flag and the stack of
//!   open [`Heredoc`]s — lives in the [`Scanner`] and round-trips through
//!   [`Scanner::serialize`] / [`Scanner::deserialize`] so the host can
//!   snapshot and resume at any point.
//! - **Lazy token ends**: recognizers advance through a [`Cursor`] and
//!   commit the token end with `mark_end`; a failed recognizer never commits,
//!   so the host discards its speculative advances.
//!
//! # Usage
//!
//! The host parser owns the real lexer handle; [`StrCursor`] is the
//! equivalent for embedding and tests:
//!
//! ```rust
//! use puppet_scanner::{Scanner, StrCursor};
//! use puppet_token::{TokenType, ValidSymbols};
//!
//! // The parser has consumed the opening quote of 'hello'.
//! let mut scanner = Scanner::new();
//! let mut cursor = StrCursor::new("hello' ...");
//! let token = scanner.scan(&mut cursor, ValidSymbols::of(&[TokenType::SqString]));
//! assert_eq!(token, Some(TokenType::SqString));
//! assert_eq!(cursor.token_text(), "hello");
//! ```

pub mod chars;
pub mod cursor;
pub mod heredoc;
pub mod snapshot;

pub use cursor::{Cursor, CursorCheckpoint, StrCursor};
pub use heredoc::Heredoc;
pub use puppet_token::{TokenType, ValidSymbols};
pub use snapshot::{SNAPSHOT_BUFFER_SIZE, SnapshotError};

use chars::{is_inline_space, is_variable_name};

/// The scanner state that persists between scan calls.
///
/// One scanner belongs to exactly one parse session and is only ever driven
/// from one thread; nothing here blocks or yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scanner {
    /// Set after a no-brace or brace variable interpolation; enables the
    /// zero-width no-sigil continuation on the next call.
    pub(crate) inside_interpolation_variable: bool,
    /// Set between QMARK and the `{` that makes it a selector.
    pub(crate) check_selbrace: bool,
    /// Open heredocs in declaration order; element 0 is the one whose body
    /// is consumed next.
    pub(crate) open_heredocs: Vec<Heredoc>,
}

/// Consume a line terminator (`\n` or `\r\n`) if one is next.
///
/// A lone `\r` is consumed but does not count; callers inherit the cursor
/// position either way.
pub(crate) fn scan_newline<C: Cursor>(cur: &mut C, skip: bool) -> bool {
    match cur.lookahead() {
        Some('\r') => {
            cur.advance(skip);
            if cur.lookahead() == Some('\n') {
                cur.advance(skip);
                true
            } else {
                false
            }
        }
        Some('\n') => {
            cur.advance(skip);
            true
        }
        _ => false,
    }
}

/// Escape sequence in a single-quoted string: only `\\` and `\'`.
///
/// Anything else fails so the string recognizer picks the backslash up as
/// ordinary content, exactly as the Puppet documentation specifies.
fn scan_sq_escape_sequence<C: Cursor>(cur: &mut C) -> Option<TokenType> {
    if cur.lookahead() != Some('\\') {
        return None;
    }
    cur.advance(false);

    let c = cur.lookahead()?;
    if c != '\\' && c != '\'' {
        return None;
    }
    cur.advance(false);
    Some(TokenType::SqEscapeSequence)
}

/// Escape sequence in a double-quoted string: `\` followed by any single
/// code point. The payload is not validated here.
fn scan_dq_escape_sequence<C: Cursor>(cur: &mut C) -> Option<TokenType> {
    if cur.lookahead() != Some('\\') {
        return None;
    }
    cur.advance(false);

    cur.lookahead()?;
    cur.advance(false);
    Some(TokenType::DqEscapeSequence)
}

/// Peek whether the `$` under the cursor opens an interpolation. Consumes
/// the `$` either way; the token end was committed before it.
fn scan_interpolation_start<C: Cursor>(cur: &mut C) -> bool {
    if cur.lookahead() != Some('$') {
        return false;
    }
    cur.mark_end();
    cur.advance(false);

    match cur.lookahead() {
        Some(c) => c == '{' || is_variable_name(c),
        None => false,
    }
}

/// Body of a single-quoted string: everything up to the closing quote or a
/// backslash. Requires at least one code point of content.
fn scan_sq_string<C: Cursor>(cur: &mut C) -> Option<TokenType> {
    let mut has_content = false;
    loop {
        let c = cur.lookahead()?;
        if c == '\'' || c == '\\' {
            return has_content.then_some(TokenType::SqString);
        }
        cur.advance(false);
        has_content = true;
    }
}

/// Body of a double-quoted string: everything up to the closing quote, a
/// backslash, or a `$` that actually opens an interpolation. A `$` followed
/// by anything else stays ordinary content.
fn scan_dq_string<C: Cursor>(cur: &mut C) -> Option<TokenType> {
    let mut has_content = false;
    loop {
        let c = cur.lookahead()?;
        match c {
            '"' => {
                cur.mark_end();
                return has_content.then_some(TokenType::DqString);
            }
            '$' => {
                if scan_interpolation_start(cur) {
                    return has_content.then_some(TokenType::DqString);
                }
                has_content = true;
            }
            '\\' => {
                cur.mark_end();
                return has_content.then_some(TokenType::DqString);
            }
            _ => {
                cur.advance(false);
                has_content = true;
            }
        }
    }
}

impl Scanner {
    /// A scanner with no open heredocs and all flags cleared.
    pub fn new() -> Scanner {
        Scanner::default()
    }

    /// Drop every open heredoc and clear all flags.
    pub fn reset(&mut self) {
        self.inside_interpolation_variable = false;
        self.check_selbrace = false;
        self.open_heredocs.clear();
    }

    /// Heredocs declared but not yet closed by their end tag.
    pub fn open_heredocs(&self) -> &[Heredoc] {
        &self.open_heredocs
    }

    /// Try to produce one external token at the cursor position.
    ///
    /// Recognizers are tried in a fixed priority over the valid-symbol mask;
    /// `None` means no admissible token matches and the parser should try
    /// its next alternative.
    pub fn scan<C: Cursor>(&mut self, cur: &mut C, valid: ValidSymbols) -> Option<TokenType> {
        if valid.contains(TokenType::HeredocBodyStart)
            && self.open_heredocs.first().is_some_and(|h| !h.started)
        {
            if let Some(token) = self.scan_heredoc_body_start(cur) {
                return Some(token);
            }
        }

        // At the start of a body line the learned indent prefix is consumed
        // silently; the skipped code points never reach a content token.
        if let Some(heredoc) = self.open_heredocs.first() {
            if heredoc.started && heredoc.end_valid {
                for &c in &heredoc.indent {
                    if cur.lookahead() == Some(c) {
                        cur.advance(true);
                    } else {
                        break;
                    }
                }
            }
        }

        if valid.contains(TokenType::Qmark) || valid.contains(TokenType::Selbrace) {
            return self.scan_selector(cur);
        }

        // Escape sequences and interpolations are cheaper to spot than
        // string bodies, so they go first; only if the lookahead holds
        // something else does the body recognizer run.

        if valid.contains(TokenType::SqEscapeSequence) {
            if let Some(token) = scan_sq_escape_sequence(cur) {
                return Some(token);
            }
        }

        if valid.contains(TokenType::DqEscapeSequence) {
            if let Some(token) = scan_dq_escape_sequence(cur) {
                return Some(token);
            }
        }

        if valid.contains(TokenType::HeredocEscapeSequence) {
            if let Some(token) = self.scan_heredoc_escape_sequence(cur) {
                return Some(token);
            }
        }

        if valid.contains(TokenType::InterpolationNosigilVariable)
            && self.inside_interpolation_variable
        {
            return self.scan_interpolation_nosigil_variable(cur);
        }

        if valid.contains(TokenType::InterpolationNobraceVariable)
            || valid.contains(TokenType::InterpolationBraceVariable)
            || valid.contains(TokenType::InterpolationExpression)
        {
            let permitted = match self.open_heredocs.first() {
                None => true,
                Some(heredoc) => heredoc.started && heredoc.allows_interpolation,
            };
            if permitted {
                if let Some(token) = self.scan_interpolation(cur) {
                    return Some(token);
                }
            }
        }

        if valid.contains(TokenType::DqString) {
            return scan_dq_string(cur);
        }

        if valid.contains(TokenType::SqString) {
            return scan_sq_string(cur);
        }

        if valid.contains(TokenType::HeredocStart) {
            return self.scan_heredoc_start(cur);
        }

        if (valid.contains(TokenType::HeredocContent)
            || valid.contains(TokenType::HeredocBodyEnd))
            && !self.open_heredocs.is_empty()
        {
            return self.scan_heredoc_content(cur);
        }

        None
    }

    /// QMARK on `?`, SELBRACE on the `{` that follows one. The parser calls
    /// this with both admissible; the pending flag picks the right one.
    fn scan_selector<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        loop {
            let c = cur.lookahead()?;
            if c.is_whitespace() {
                cur.advance(true);
            } else if c == '?' {
                self.check_selbrace = true;
                cur.advance(false);
                return Some(TokenType::Qmark);
            } else if c == '{' {
                if self.check_selbrace {
                    self.check_selbrace = false;
                    cur.advance(false);
                    return Some(TokenType::Selbrace);
                }
                return None;
            } else {
                self.check_selbrace = false;
                return None;
            }
        }
    }

    /// The three sigil-led interpolation tokens.
    ///
    /// `${` with a non-name follower is an expression; `${name` is a brace
    /// variable (the name run is only lookahead, the token stays `${`);
    /// `$name` is a no-brace variable whose token is just the sigil. A `$`
    /// followed by nothing interpolation-like is emitted as string or
    /// heredoc content so a trailing sigil still lexes.
    fn scan_interpolation<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        if cur.lookahead() != Some('$') {
            return None;
        }
        cur.mark_end();
        cur.advance(false);

        // A possible interpolation makes the current line ineligible as an
        // end tag.
        if let Some(heredoc) = self.open_heredocs.first_mut() {
            if heredoc.started && heredoc.allows_interpolation {
                heredoc.end_valid = false;
            }
        }

        let c = cur.lookahead()?;
        if c == '{' {
            cur.advance(false);
            cur.mark_end();
            if !cur.lookahead().is_some_and(is_variable_name) {
                return Some(TokenType::InterpolationExpression);
            }
        } else if is_variable_name(c) {
            self.inside_interpolation_variable = true;
            cur.mark_end();
            return Some(TokenType::InterpolationNobraceVariable);
        } else {
            // The '$' is already consumed and may be the last character of
            // the string or heredoc, so return the matching content symbol.
            cur.mark_end();
            if self.open_heredocs.first().is_some_and(|h| h.started) {
                return Some(TokenType::HeredocContent);
            }
            return Some(TokenType::DqString);
        }

        loop {
            let c = cur.lookahead()?;
            if c == '}' || c == '[' || c == '.' {
                self.inside_interpolation_variable = true;
                return Some(TokenType::InterpolationBraceVariable);
            }
            if !is_variable_name(c) {
                return Some(TokenType::InterpolationExpression);
            }
            cur.advance(false);
        }
    }

    /// Zero-width continuation after a variable interpolation, so the
    /// grammar can lex the name with its ordinary variable production.
    fn scan_interpolation_nosigil_variable<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        // Zero-width: commit the end before looking at anything.
        cur.mark_end();
        self.inside_interpolation_variable = false;

        let mut name_found = false;
        loop {
            let c = cur.lookahead()?;
            if !is_variable_name(c) {
                return name_found.then_some(TokenType::InterpolationNosigilVariable);
            }
            cur.advance(false);
            name_found = true;
        }
    }

    /// Escape sequence inside a heredoc body.
    ///
    /// `\` plus newline is always honored as a line continuation. Otherwise
    /// the follower decides: in-set followers (including `\uXXXX` and
    /// `\u{...}` forms) yield HEREDOC_ESCAPE_SEQUENCE, out-of-set followers
    /// yield HEREDOC_CONTENT so the parser accepts them literally.
    fn scan_heredoc_escape_sequence<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        let heredoc = self.open_heredocs.first_mut()?;

        if cur.lookahead() != Some('\\') {
            return None;
        }
        // The end is not known yet; commit before the first advance.
        cur.mark_end();
        cur.advance(false);

        if cur.at_eof() {
            return None;
        }

        if scan_newline(cur, false) {
            heredoc.end_valid = true;
            cur.mark_end();
            if heredoc.allows_escape('L') {
                return Some(TokenType::HeredocEscapeSequence);
            }
            return Some(TokenType::HeredocContent);
        }

        let token = if cur.lookahead().is_some_and(|c| heredoc.allows_escape(c)) {
            if cur.lookahead() == Some('u') {
                // Unicode escapes: \uXXXX or \u{XXXXXX}
                cur.advance(false);
                if cur.lookahead().is_some_and(|c| c.is_ascii_hexdigit()) {
                    let mut digits = 0;
                    while digits < 4 && cur.lookahead().is_some_and(|c| c.is_ascii_hexdigit()) {
                        cur.advance(false);
                        digits += 1;
                    }
                } else if cur.lookahead() == Some('{') {
                    cur.advance(false);
                    let mut digits = 0;
                    while digits < 6 && cur.lookahead().is_some_and(|c| c.is_ascii_hexdigit()) {
                        cur.advance(false);
                        digits += 1;
                    }
                    if cur.lookahead() == Some('}') {
                        cur.advance(false);
                    }
                }
            } else {
                cur.advance(false);
            }
            TokenType::HeredocEscapeSequence
        } else {
            cur.advance(false);
            TokenType::HeredocContent
        };
        cur.mark_end();

        // An escape makes the current line ineligible as an end tag.
        heredoc.end_valid = false;
        Some(token)
    }

    /// Heredoc header interior `word [:syntax] [/escapes]`. The `@(` and
    /// `)` around it are grammar tokens.
    ///
    /// On success the terminator line is located ahead of the cursor to
    /// learn the indent prefix, and the heredoc joins the open stack.
    fn scan_heredoc_start<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        let mut heredoc = Heredoc::scan_header(cur)?;
        if cur.lookahead() != Some(')') {
            return None;
        }
        cur.mark_end();
        if !heredoc.learn_indent(cur) {
            return None;
        }
        self.open_heredocs.push(heredoc);
        Some(TokenType::HeredocStart)
    }

    /// Zero-width start of the heredoc body: the whitespace-then-newline
    /// that must follow the header line.
    fn scan_heredoc_body_start<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        let heredoc = self.open_heredocs.first_mut()?;
        while cur.lookahead().is_some_and(is_inline_space) {
            cur.advance(true);
        }
        if scan_newline(cur, true) {
            heredoc.started = true;
            heredoc.end_valid = true;
            return Some(TokenType::HeredocBodyStart);
        }
        None
    }

    /// Content of the current heredoc body, or its end tag.
    ///
    /// Content stops before an interpolation (when permitted), before a
    /// backslash, or just after a newline; the end tag is only tried at
    /// positions where `end_valid` still holds.
    fn scan_heredoc_content<C: Cursor>(&mut self, cur: &mut C) -> Option<TokenType> {
        let mut has_content = false;

        cur.mark_end();
        loop {
            if cur.at_eof() {
                return None;
            }

            let heredoc = self.open_heredocs.first_mut()?;
            if heredoc.end_valid {
                if heredoc.scan_end_tag(cur, true) {
                    self.open_heredocs.remove(0);
                    return Some(TokenType::HeredocBodyEnd);
                }
                // The failed tag attempt may have consumed part of the line.
                if cur.column() > 0 {
                    has_content = true;
                }
                heredoc.end_valid = false;
            }

            if cur.lookahead() == Some('\\') {
                cur.mark_end();
                return has_content.then_some(TokenType::HeredocContent);
            }
            if cur.lookahead() == Some('$') && heredoc.allows_interpolation {
                cur.mark_end();
                return has_content.then_some(TokenType::HeredocContent);
            }
            if scan_newline(cur, false) {
                heredoc.end_valid = true;
                cur.mark_end();
                return Some(TokenType::HeredocContent);
            }
            cur.advance(false);
            cur.mark_end();
            has_content = true;
        }
    }
}
