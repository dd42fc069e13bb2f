//! The lexer handle the host parser hands to every scan call.
//!
//! The scanner never owns the input. It pulls single code points through a
//! [`Cursor`], advancing either as token content or as hidden whitespace,
//! and commits the token end lazily with [`Cursor::mark_end`]. Anything
//! consumed past the last committed end is speculative lookahead that the
//! host discards together with a failed scan.

/// Pull-based lookahead over an already-buffered input.
pub trait Cursor {
    /// The code point at the current position, or `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Consume the current code point. With `skip` the code point is treated
    /// as preceding whitespace rather than token content.
    fn advance(&mut self, skip: bool);

    /// Commit the token end at the current position. May be called multiple
    /// times; the last call wins. If a recognizer succeeds without ever
    /// calling this, the token extends to the final position.
    fn mark_end(&mut self);

    /// Code points consumed on the current line.
    fn column(&self) -> usize;

    /// Whether the input is exhausted.
    fn at_eof(&self) -> bool {
        self.lookahead().is_none()
    }
}

/// Saved [`StrCursor`] position, used to roll back a failed scan the way the
/// host parser's speculative lexing does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCheckpoint {
    pos: usize,
    token_start: usize,
    marked_end: Option<usize>,
    line_start: usize,
}

/// An owned code-point cursor over a source fragment.
///
/// This is the pure-Rust stand-in for the host parser's lexer handle:
/// embedders and tests drive the scanner over it, observe the emitted token
/// through [`StrCursor::token_text`], and roll back failed scans through
/// [`StrCursor::checkpoint`] / [`StrCursor::restore`].
#[derive(Debug, Clone)]
pub struct StrCursor {
    chars: Vec<char>,
    pos: usize,
    token_start: usize,
    marked_end: Option<usize>,
    line_start: usize,
}

impl StrCursor {
    pub fn new(input: &str) -> StrCursor {
        StrCursor {
            chars: input.chars().collect(),
            pos: 0,
            token_start: 0,
            marked_end: None,
            line_start: 0,
        }
    }

    /// Current position in code points from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Start a fresh token at the current position. The host parser does
    /// this implicitly before every scan call.
    pub fn begin_token(&mut self) {
        self.token_start = self.pos;
        self.marked_end = None;
    }

    /// The text of the token emitted by the last scan: everything between
    /// the token start and the committed end (or the current position when
    /// no end was committed).
    pub fn token_text(&self) -> String {
        let end = self.marked_end.unwrap_or(self.pos);
        self.chars[self.token_start..end].iter().collect()
    }

    /// Reposition at the committed token end, discarding everything
    /// consumed past it. The host parser resumes lexing here after every
    /// successful scan; lookahead beyond the committed end was speculative.
    pub fn resume_at_token_end(&mut self) {
        if let Some(end) = self.marked_end {
            self.pos = end;
            self.line_start =
                self.chars[..end].iter().rposition(|&c| c == '\n').map_or(0, |i| i + 1);
        }
    }

    /// Save the cursor for a later [`StrCursor::restore`].
    pub fn checkpoint(&self) -> CursorCheckpoint {
        CursorCheckpoint {
            pos: self.pos,
            token_start: self.token_start,
            marked_end: self.marked_end,
            line_start: self.line_start,
        }
    }

    /// Roll back to a saved position, discarding speculative advances.
    pub fn restore(&mut self, checkpoint: CursorCheckpoint) {
        self.pos = checkpoint.pos;
        self.token_start = checkpoint.token_start;
        self.marked_end = checkpoint.marked_end;
        self.line_start = checkpoint.line_start;
    }
}

impl Cursor for StrCursor {
    fn lookahead(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self, skip: bool) {
        let Some(&c) = self.chars.get(self.pos) else {
            return;
        };
        self.pos += 1;
        if c == '\n' {
            self.line_start = self.pos;
        }
        // Leading skips move the token start; once content has been consumed
        // or an end committed, a skip no longer shrinks the token.
        if skip && self.marked_end.is_none() && self.token_start == self.pos - 1 {
            self.token_start = self.pos;
        }
    }

    fn mark_end(&mut self) {
        self.marked_end = Some(self.pos);
    }

    fn column(&self) -> usize {
        self.pos - self.line_start
    }
}
