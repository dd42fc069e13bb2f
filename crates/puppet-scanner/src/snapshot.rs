//! Byte-exact scanner snapshots for incremental re-parse.
//!
//! The host parser snapshots the scanner after every external token and may
//! resume from any snapshot later. The format is a fixed sequence of
//! single-byte flags and lengths with native-endian 32-bit code points:
//!
//! ```text
//! inside_interpolation_variable  u8
//! check_selbrace                 u8
//! open-heredoc count             u8
//! per heredoc:
//!   allows_interpolation u8, started u8, end_valid u8,
//!   word len u8,    word code points    (u32 each)
//!   indent len u8,  indent code points  (u32 each)
//!   escapes len u8, escape code points  (u32 each)
//! ```
//!
//! Snapshots never cross hosts, so host endianness is acceptable. The
//! single-byte length fields cap each buffer at 255 code points; that cap is
//! a protocol constraint shared with the host's snapshot buffer.

use thiserror::Error;

use crate::Scanner;
use crate::heredoc::Heredoc;

/// Size of the snapshot buffer the host parser provides.
pub const SNAPSHOT_BUFFER_SIZE: usize = 1024;

/// Errors of the snapshot codec.
///
/// The scan path itself has no recoverable errors; this is the only fallible
/// surface of the crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The serialized state does not fit into the provided buffer.
    #[error("serialized scanner state exceeds the {limit}-byte buffer")]
    Overflow { limit: usize },

    /// A buffer or the heredoc stack outgrew its single-byte length field.
    #[error("length {len} does not fit into a single-byte length field")]
    LengthOverflow { len: usize },

    /// The snapshot ends in the middle of a record.
    #[error("snapshot ends in the middle of a record")]
    Truncated,

    /// The snapshot holds more bytes than its records account for.
    #[error("snapshot has {remaining} unread bytes after the last record")]
    TrailingBytes { remaining: usize },

    /// A serialized code point is not a Unicode scalar value.
    #[error("snapshot contains invalid code point {value:#x}")]
    InvalidCodePoint { value: u32 },
}

struct Writer<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Writer<'a> {
        Writer { buf, len: 0 }
    }

    fn put_u8(&mut self, byte: u8) -> Result<(), SnapshotError> {
        let limit = self.buf.len();
        let slot = self.buf.get_mut(self.len).ok_or(SnapshotError::Overflow { limit })?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }

    fn put_flag(&mut self, flag: bool) -> Result<(), SnapshotError> {
        self.put_u8(u8::from(flag))
    }

    fn put_chars(&mut self, chars: &[char]) -> Result<(), SnapshotError> {
        let len =
            u8::try_from(chars.len()).map_err(|_| SnapshotError::LengthOverflow { len: chars.len() })?;
        self.put_u8(len)?;
        for &c in chars {
            for byte in (c as u32).to_ne_bytes() {
                self.put_u8(byte)?;
            }
        }
        Ok(())
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Reader<'a> {
        Reader { buf, pos: 0 }
    }

    fn take_u8(&mut self) -> Result<u8, SnapshotError> {
        let byte = *self.buf.get(self.pos).ok_or(SnapshotError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    fn take_flag(&mut self) -> Result<bool, SnapshotError> {
        Ok(self.take_u8()? != 0)
    }

    fn take_chars(&mut self) -> Result<Vec<char>, SnapshotError> {
        let len = usize::from(self.take_u8()?);
        let mut chars = Vec::with_capacity(len);
        for _ in 0..len {
            let mut raw = [0u8; 4];
            for byte in &mut raw {
                *byte = self.take_u8()?;
            }
            let value = u32::from_ne_bytes(raw);
            chars.push(char::from_u32(value).ok_or(SnapshotError::InvalidCodePoint { value })?);
        }
        Ok(chars)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl Scanner {
    /// Serialize the complete scanner state into `buffer`.
    ///
    /// Returns the number of bytes written. The host treats an overflow as
    /// catastrophic, so nothing is written beyond `buffer` and the partial
    /// contents are unspecified on error.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<usize, SnapshotError> {
        let mut writer = Writer::new(buffer);
        writer.put_flag(self.inside_interpolation_variable)?;
        writer.put_flag(self.check_selbrace)?;

        let count = u8::try_from(self.open_heredocs.len())
            .map_err(|_| SnapshotError::LengthOverflow { len: self.open_heredocs.len() })?;
        writer.put_u8(count)?;

        for heredoc in &self.open_heredocs {
            writer.put_flag(heredoc.allows_interpolation)?;
            writer.put_flag(heredoc.started)?;
            writer.put_flag(heredoc.end_valid)?;
            writer.put_chars(&heredoc.word)?;
            writer.put_chars(&heredoc.indent)?;
            writer.put_chars(&heredoc.escapes)?;
        }
        Ok(writer.len)
    }

    /// Replace the scanner state with the one recorded in `buffer`.
    ///
    /// An empty buffer yields the empty state; this happens on every fresh
    /// parse. Anything else must be an exact serialize image: a snapshot
    /// that ends early or carries trailing bytes is refused and leaves the
    /// scanner empty rather than partially loaded.
    pub fn deserialize(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
        self.reset();
        if buffer.is_empty() {
            return Ok(());
        }
        let result = self.load(buffer);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn load(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
        let mut reader = Reader::new(buffer);
        self.inside_interpolation_variable = reader.take_flag()?;
        self.check_selbrace = reader.take_flag()?;

        let count = reader.take_u8()?;
        for _ in 0..count {
            let allows_interpolation = reader.take_flag()?;
            let started = reader.take_flag()?;
            let end_valid = reader.take_flag()?;
            let word = reader.take_chars()?;
            let indent = reader.take_chars()?;
            let escapes = reader.take_chars()?;
            self.open_heredocs.push(Heredoc {
                word,
                indent,
                escapes,
                allows_interpolation,
                started,
                end_valid,
            });
        }

        if reader.remaining() > 0 {
            return Err(SnapshotError::TrailingBytes { remaining: reader.remaining() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_is_three_bytes() -> Result<(), SnapshotError> {
        let scanner = Scanner::new();
        let mut buffer = [0u8; SNAPSHOT_BUFFER_SIZE];
        let len = scanner.serialize(&mut buffer)?;
        assert_eq!(len, 3);
        assert_eq!(&buffer[..len], &[0, 0, 0]);
        Ok(())
    }

    #[test]
    fn overflow_reports_instead_of_writing_past_the_buffer() {
        let scanner = Scanner::new();
        let mut buffer = [0u8; 2];
        assert_eq!(scanner.serialize(&mut buffer), Err(SnapshotError::Overflow { limit: 2 }));
    }

    #[test]
    fn word_longer_than_length_field_is_refused() {
        let mut scanner = Scanner::new();
        scanner.open_heredocs.push(Heredoc {
            word: vec!['w'; 256],
            ..Heredoc::default()
        });
        let mut buffer = [0u8; 4096];
        assert_eq!(
            scanner.serialize(&mut buffer),
            Err(SnapshotError::LengthOverflow { len: 256 })
        );
    }

    #[test]
    fn truncated_snapshot_leaves_the_state_empty() {
        let mut scanner = Scanner::new();
        // Flag bytes announce one heredoc, then the record is missing.
        assert_eq!(scanner.deserialize(&[1, 1, 1]), Err(SnapshotError::Truncated));
        assert!(!scanner.inside_interpolation_variable);
        assert!(!scanner.check_selbrace);
        assert!(scanner.open_heredocs.is_empty());
    }

    #[test]
    fn trailing_bytes_are_refused() {
        let mut scanner = Scanner::new();
        assert_eq!(
            scanner.deserialize(&[0, 0, 0, 9]),
            Err(SnapshotError::TrailingBytes { remaining: 1 })
        );
        assert!(scanner.open_heredocs.is_empty());
    }

    #[test]
    fn empty_buffer_clears_the_state() -> Result<(), SnapshotError> {
        let mut scanner = Scanner::new();
        scanner.check_selbrace = true;
        scanner.open_heredocs.push(Heredoc::default());
        scanner.deserialize(&[])?;
        assert!(!scanner.check_selbrace);
        assert!(scanner.open_heredocs.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_code_point_is_refused() {
        let mut scanner = Scanner::new();
        // One heredoc whose word holds a surrogate code point.
        let mut image = vec![0u8, 0, 1, 0, 0, 0, 1];
        image.extend(0xD800u32.to_ne_bytes());
        image.extend([0, 0]); // empty indent and escapes
        assert_eq!(
            scanner.deserialize(&image),
            Err(SnapshotError::InvalidCodePoint { value: 0xD800 })
        );
        assert!(scanner.open_heredocs.is_empty());
    }
}
