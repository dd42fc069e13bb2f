//! External token definitions for the Puppet scanner.
//!
//! The host parser and the scanner agree on a fixed set of external tokens.
//! [`TokenType`] lists them in the exact order of the grammar's `externals`
//! declaration; the discriminants are the symbol ids the parser expects back
//! in `result_symbol`. [`ValidSymbols`] is the boolean mask the parser passes
//! on every scan call to say which of those tokens it is currently willing
//! to accept.

/// External tokens recognized by the scanner.
///
/// The order must be the same as defined in the `externals` field of the
/// grammar. Reordering variants is a protocol break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenType {
    /// `?` introducing a selector expression.
    Qmark = 0,
    /// The `{` that follows a selector's `?`.
    Selbrace = 1,
    /// Content run of a single-quoted string.
    SqString = 2,
    /// Content run of a double-quoted string.
    DqString = 3,
    /// `$name` interpolation; zero-width, the name is lexed by the grammar.
    InterpolationNobraceVariable = 4,
    /// `${name}` interpolation; covers the sigil, brace and name.
    InterpolationBraceVariable = 5,
    /// `${expr}` interpolation; covers `${`, the expression is lexed by the grammar.
    InterpolationExpression = 6,
    /// Zero-width continuation so the grammar can lex the variable name
    /// after a no-brace interpolation with its ordinary name production.
    InterpolationNosigilVariable = 7,
    /// Heredoc header interior `word [:syntax] [/escapes]`.
    HeredocStart = 8,
    /// Zero-width start of a heredoc body after the header line.
    HeredocBodyStart = 9,
    /// Content run of a heredoc body.
    HeredocContent = 10,
    /// The terminator tag line that closes a heredoc.
    HeredocBodyEnd = 11,
    /// Escape sequence inside a heredoc body.
    HeredocEscapeSequence = 12,
    /// Escape sequence inside a double-quoted string.
    DqEscapeSequence = 13,
    /// Escape sequence inside a single-quoted string.
    SqEscapeSequence = 14,
}

impl TokenType {
    /// Number of external tokens.
    pub const COUNT: usize = 15;

    /// All tokens in grammar order.
    pub const ALL: [TokenType; TokenType::COUNT] = [
        TokenType::Qmark,
        TokenType::Selbrace,
        TokenType::SqString,
        TokenType::DqString,
        TokenType::InterpolationNobraceVariable,
        TokenType::InterpolationBraceVariable,
        TokenType::InterpolationExpression,
        TokenType::InterpolationNosigilVariable,
        TokenType::HeredocStart,
        TokenType::HeredocBodyStart,
        TokenType::HeredocContent,
        TokenType::HeredocBodyEnd,
        TokenType::HeredocEscapeSequence,
        TokenType::DqEscapeSequence,
        TokenType::SqEscapeSequence,
    ];

    /// The symbol id the host parser expects in `result_symbol`.
    pub fn symbol(self) -> u16 {
        self as u16
    }

    /// Index into a valid-symbol mask.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`TokenType::index`].
    pub fn from_index(index: usize) -> Option<TokenType> {
        TokenType::ALL.get(index).copied()
    }
}

/// The valid-symbol mask the host parser passes to every scan call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidSymbols([bool; TokenType::COUNT]);

impl ValidSymbols {
    /// A mask admitting no token.
    pub fn none() -> ValidSymbols {
        ValidSymbols([false; TokenType::COUNT])
    }

    /// A mask admitting every token. The parser uses this during error
    /// recovery; tests use it to probe dispatch priority.
    pub fn all() -> ValidSymbols {
        ValidSymbols([true; TokenType::COUNT])
    }

    /// A mask admitting exactly the given tokens.
    pub fn of(tokens: &[TokenType]) -> ValidSymbols {
        let mut mask = ValidSymbols::none();
        for token in tokens {
            mask.0[token.index()] = true;
        }
        mask
    }

    /// Whether the parser currently accepts `token`.
    pub fn contains(&self, token: TokenType) -> bool {
        self.0[token.index()]
    }

    /// Read a mask from the host parser's `const bool *`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least [`TokenType::COUNT`] readable `bool`s,
    /// which the host parser guarantees for the mask it hands to `scan`.
    pub unsafe fn from_ptr(ptr: *const bool) -> ValidSymbols {
        let mut mask = ValidSymbols::none();
        for (i, slot) in mask.0.iter_mut().enumerate() {
            *slot = unsafe { *ptr.add(i) };
        }
        mask
    }
}
