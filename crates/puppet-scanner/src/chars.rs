//! Character classes used by the recognizers.
//!
//! All predicates operate on single code points without locale sensitivity.

/// Escape flags a heredoc header may enable, in the order they serialize.
pub const HEREDOC_ESCAPES: [char; 7] = ['n', 'r', 't', 's', '$', 'u', 'L'];

/// Valid for a Puppet variable name: `'a'..'z'`, `'0'..'9'`, `'_'` and the
/// `':'` of qualified names. Where the colon is admissible is the grammar's
/// decision, not ours.
pub fn is_variable_name(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == ':'
}

/// Valid inside a heredoc terminator word.
pub fn is_heredoc_word(c: char) -> bool {
    !matches!(c, ':' | '/' | '\r' | '\n' | ')')
}

/// One of the escape flags a heredoc header may name.
pub fn is_heredoc_escape(c: char) -> bool {
    HEREDOC_ESCAPES.contains(&c)
}

/// Space or tab; the whitespace class used inside heredoc tag lines.
pub fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}
