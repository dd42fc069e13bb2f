//! Pending-heredoc model.
//!
//! Each `@( word )` header that the scanner accepts pushes one [`Heredoc`]
//! onto the scanner state. The entry carries everything needed to consume
//! the body later: the terminator word, whether the body interpolates, the
//! enabled escape flags and the indent prefix to strip from body lines.

use crate::chars::{HEREDOC_ESCAPES, is_heredoc_escape, is_heredoc_word, is_inline_space};
use crate::cursor::Cursor;
use crate::scan_newline;

/// One open heredoc, from HEREDOC_START until its end tag matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heredoc {
    pub(crate) word: Vec<char>,
    pub(crate) indent: Vec<char>,
    pub(crate) escapes: Vec<char>,
    pub(crate) allows_interpolation: bool,
    pub(crate) started: bool,
    pub(crate) end_valid: bool,
}

impl Heredoc {
    /// Terminator word, without surrounding quotes.
    pub fn word(&self) -> &[char] {
        &self.word
    }

    /// Whitespace prefix stripped from every body line.
    pub fn indent(&self) -> &[char] {
        &self.indent
    }

    /// Effective escape-flag set; contains `\\` whenever any flag is enabled.
    pub fn escapes(&self) -> &[char] {
        &self.escapes
    }

    /// True iff the terminator word was written in double quotes.
    pub fn allows_interpolation(&self) -> bool {
        self.allows_interpolation
    }

    /// True once HEREDOC_BODY_START has been emitted.
    pub fn started(&self) -> bool {
        self.started
    }

    /// True only where the terminator tag is currently eligible.
    pub fn end_valid(&self) -> bool {
        self.end_valid
    }

    /// Whether `c` is enabled as an escape for this heredoc.
    pub fn allows_escape(&self, c: char) -> bool {
        self.escapes.contains(&c)
    }

    /// Parse the header interior `word [":" syntax] ["/" escapes]`.
    ///
    /// Consumes up to, but not including, what should be the closing `)`;
    /// the caller verifies that lookahead. Returns `None` when the word is
    /// empty after trimming.
    pub(crate) fn scan_header<C: Cursor>(cur: &mut C) -> Option<Heredoc> {
        let mut heredoc = Heredoc::default();

        if cur.at_eof() {
            return None;
        }

        while cur.lookahead().is_some_and(is_inline_space) {
            cur.advance(true);
        }
        while let Some(c) = cur.lookahead() {
            if !is_heredoc_word(c) {
                break;
            }
            heredoc.word.push(c);
            cur.advance(false);
        }
        // The Puppet parser performs a word.rstrip!
        while heredoc.word.last().is_some_and(|&c| is_inline_space(c)) {
            heredoc.word.pop();
        }
        if heredoc.word.len() > 1
            && heredoc.word.first() == Some(&'"')
            && heredoc.word.last() == Some(&'"')
        {
            // The quote characters indicate that interpolation can be used
            heredoc.allows_interpolation = true;
            heredoc.word.remove(0);
            heredoc.word.pop();
        }
        if heredoc.word.is_empty() {
            return None;
        }

        while cur.lookahead().is_some_and(is_inline_space) {
            cur.advance(true);
        }
        if cur.lookahead() == Some(':') {
            cur.advance(false);
            // The syntax name is kept for lexical purposes only
            while cur.lookahead().is_some_and(|c| c.is_ascii_alphanumeric()) {
                cur.advance(false);
            }
        }

        while cur.lookahead().is_some_and(is_inline_space) {
            cur.advance(true);
        }
        if cur.lookahead() == Some('/') {
            cur.advance(false);
            while let Some(c) = cur.lookahead() {
                if !is_heredoc_escape(c) {
                    break;
                }
                heredoc.escapes.push(c);
                cur.advance(false);
            }
            // A bare '/' enables every escape sequence
            if heredoc.escapes.is_empty() {
                heredoc.escapes.extend(HEREDOC_ESCAPES);
            }
            // The backslash escape is valid whenever any escape is enabled
            heredoc.escapes.push('\\');
        }

        while cur.lookahead().is_some_and(is_inline_space) {
            cur.advance(true);
        }
        Some(heredoc)
    }

    /// Match the terminator tag from the start of a line:
    /// `[ws] ["|"] [ws] ["-"] [ws] word [ws] (newline | end-of-input)`.
    ///
    /// With `mark` the token end is committed directly after the word, so
    /// trailing whitespace and the line terminator stay outside the token.
    /// Before the body has started, a successful `|` line records the
    /// leading whitespace as the indent prefix.
    pub(crate) fn scan_end_tag<C: Cursor>(&mut self, cur: &mut C, mark: bool) -> bool {
        if !self.started {
            self.indent.clear();
        }
        while cur.lookahead().is_some_and(is_inline_space) {
            if !self.started {
                if let Some(c) = cur.lookahead() {
                    self.indent.push(c);
                }
            }
            cur.advance(false);
        }
        if cur.lookahead() == Some('|') {
            cur.advance(false);
            while cur.lookahead().is_some_and(is_inline_space) {
                cur.advance(false);
            }
        } else if !self.started {
            // No indent marker, so the captured prefix is not an indent
            self.indent.clear();
        }
        if cur.lookahead() == Some('-') {
            cur.advance(false);
        }
        while cur.lookahead().is_some_and(is_inline_space) {
            cur.advance(false);
        }

        let mut matched = 0;
        for &expected in &self.word {
            if cur.lookahead() == Some(expected) {
                cur.advance(false);
                matched += 1;
            } else {
                break;
            }
        }
        if matched == self.word.len() {
            if mark {
                cur.mark_end();
            }
            while cur.lookahead().is_some_and(is_inline_space) {
                cur.advance(false);
            }
            if cur.at_eof() || scan_newline(cur, true) {
                return true;
            }
        }
        false
    }

    /// Look ahead line by line for the terminator tag so the indent prefix
    /// can be learned while the header is being scanned. The caller has
    /// already committed the token end, so everything consumed here is
    /// speculative.
    pub(crate) fn learn_indent<C: Cursor>(&mut self, cur: &mut C) -> bool {
        loop {
            if cur.at_eof() {
                return false;
            }
            // The end tag must occur after a newline
            if scan_newline(cur, true) {
                if self.scan_end_tag(cur, false) {
                    return true;
                }
            } else {
                cur.advance(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::StrCursor;

    fn header(input: &str) -> Option<Heredoc> {
        let mut cur = StrCursor::new(input);
        let heredoc = Heredoc::scan_header(&mut cur)?;
        assert_eq!(cur.lookahead(), Some(')'), "header must stop at the closing paren");
        Some(heredoc)
    }

    #[test]
    fn bare_word() {
        let hd = header("END)");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        assert_eq!(hd.word(), ['E', 'N', 'D']);
        assert!(!hd.allows_interpolation());
        assert!(hd.escapes().is_empty());
    }

    #[test]
    fn quoted_word_enables_interpolation() {
        let hd = header("\"EOT\")");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        assert_eq!(hd.word(), ['E', 'O', 'T']);
        assert!(hd.allows_interpolation());
    }

    #[test]
    fn trailing_space_is_trimmed_outside_quotes() {
        let hd = header("END  )");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        assert_eq!(hd.word(), ['E', 'N', 'D']);
    }

    #[test]
    fn space_inside_quotes_survives() {
        let hd = header("\"END \")");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        assert_eq!(hd.word(), ['E', 'N', 'D', ' ']);
    }

    #[test]
    fn syntax_suffix_is_consumed() {
        let hd = header("END:json)");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        assert_eq!(hd.word(), ['E', 'N', 'D']);
    }

    #[test]
    fn named_escape_flags() {
        let hd = header("END/nt)");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        assert_eq!(hd.escapes(), ['n', 't', '\\']);
        assert!(hd.allows_escape('\\'));
        assert!(!hd.allows_escape('r'));
    }

    #[test]
    fn bare_slash_enables_all_escapes() {
        let hd = header("END/)");
        assert!(hd.is_some());
        let Some(hd) = hd else { return };
        for c in HEREDOC_ESCAPES {
            assert!(hd.allows_escape(c));
        }
        assert!(hd.allows_escape('\\'));
    }

    #[test]
    fn empty_word_is_rejected() {
        let mut cur = StrCursor::new(")");
        assert!(Heredoc::scan_header(&mut cur).is_none());
        let mut cur = StrCursor::new("  )");
        assert!(Heredoc::scan_header(&mut cur).is_none());
    }

    fn open(word: &str) -> Heredoc {
        Heredoc { word: word.chars().collect(), started: true, ..Heredoc::default() }
    }

    #[test]
    fn end_tag_plain() {
        let mut hd = open("END");
        let mut cur = StrCursor::new("END\nrest");
        assert!(hd.scan_end_tag(&mut cur, true));
        assert_eq!(cur.token_text(), "END");
    }

    #[test]
    fn end_tag_at_end_of_input() {
        let mut hd = open("END");
        let mut cur = StrCursor::new("END");
        assert!(hd.scan_end_tag(&mut cur, false));
    }

    #[test]
    fn end_tag_with_pipe_and_dash() {
        let mut hd = open("END");
        let mut cur = StrCursor::new("  | - END  \n");
        assert!(hd.scan_end_tag(&mut cur, true));
        assert_eq!(cur.token_text(), "  | - END");
    }

    #[test]
    fn end_tag_rejects_partial_word() {
        let mut hd = open("END");
        let mut cur = StrCursor::new("ENDING\n");
        assert!(!hd.scan_end_tag(&mut cur, false));
    }

    #[test]
    fn end_tag_rejects_lone_carriage_return() {
        let mut hd = open("END");
        let mut cur = StrCursor::new("END\rmore");
        assert!(!hd.scan_end_tag(&mut cur, false));
    }

    #[test]
    fn learn_indent_records_pipe_prefix() {
        let mut hd = Heredoc { word: "END".chars().collect(), ..Heredoc::default() };
        let mut cur = StrCursor::new("\n  content\n  | END\n");
        cur.mark_end();
        assert!(hd.learn_indent(&mut cur));
        assert_eq!(hd.indent(), [' ', ' ']);
    }

    #[test]
    fn learn_indent_without_pipe_is_empty() {
        let mut hd = Heredoc { word: "END".chars().collect(), ..Heredoc::default() };
        let mut cur = StrCursor::new("\ncontent\n  END\n");
        cur.mark_end();
        assert!(hd.learn_indent(&mut cur));
        assert!(hd.indent().is_empty());
    }

    #[test]
    fn learn_indent_fails_without_terminator() {
        let mut hd = Heredoc { word: "END".chars().collect(), ..Heredoc::default() };
        let mut cur = StrCursor::new("\nno terminator here");
        cur.mark_end();
        assert!(!hd.learn_indent(&mut cur));
    }
}
