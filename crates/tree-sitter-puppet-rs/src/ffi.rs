//! The external-scanner ABI.
//!
//! The shapes here mirror `tree_sitter/parser.h`: [`TSLexer`] is the lexer
//! vtable the host passes to `scan`, and the five exported functions carry
//! the exact signatures the generated parser expects. No tree-sitter code
//! is linked from this side; the host provides the runtime.

use std::ffi::{c_char, c_void};
use std::slice;

use puppet_scanner::{Cursor, Scanner};
use puppet_token::ValidSymbols;

/// Snapshot buffer size guaranteed by the host
/// (`TREE_SITTER_SERIALIZATION_BUFFER_SIZE`).
pub const SERIALIZATION_BUFFER_SIZE: usize = puppet_scanner::SNAPSHOT_BUFFER_SIZE;

/// The lexer handle a tree-sitter host passes to an external scanner.
///
/// Field order and types mirror the C struct; the host owns the value and
/// the callbacks, we only read `lookahead`, write `result_symbol` and call
/// through the function pointers.
#[repr(C)]
pub struct TSLexer {
    /// Code point at the current position, `0` at end of input.
    pub lookahead: i32,
    /// Symbol id of the token produced by a successful scan.
    pub result_symbol: u16,
    /// Consume the current code point; with `skip` it is treated as
    /// preceding whitespace.
    pub advance: unsafe extern "C" fn(lexer: *mut TSLexer, skip: bool),
    /// Commit the token end at the current position.
    pub mark_end: unsafe extern "C" fn(lexer: *mut TSLexer),
    /// Code points consumed on the current line.
    pub get_column: unsafe extern "C" fn(lexer: *mut TSLexer) -> u32,
    /// Whether the position sits at the start of an included range.
    pub is_at_included_range_start: unsafe extern "C" fn(lexer: *const TSLexer) -> bool,
    /// Whether the input is exhausted.
    pub eof: unsafe extern "C" fn(lexer: *const TSLexer) -> bool,
    /// Debug logger; absent on older hosts and never called here.
    pub log: Option<unsafe extern "C" fn(lexer: *const TSLexer, fmt: *const c_char, ...)>,
}

/// [`Cursor`] over a host-owned [`TSLexer`].
pub struct LexerBridge {
    raw: *mut TSLexer,
}

impl LexerBridge {
    /// # Safety
    ///
    /// `raw` must point to a live `TSLexer` with valid callbacks for the
    /// whole lifetime of the bridge, which the host guarantees for the
    /// duration of a scan call.
    pub unsafe fn new(raw: *mut TSLexer) -> LexerBridge {
        LexerBridge { raw }
    }
}

impl Cursor for LexerBridge {
    fn lookahead(&self) -> Option<char> {
        unsafe {
            if ((*self.raw).eof)(self.raw) {
                return None;
            }
            char::from_u32((*self.raw).lookahead as u32)
        }
    }

    fn advance(&mut self, skip: bool) {
        unsafe { ((*self.raw).advance)(self.raw, skip) }
    }

    fn mark_end(&mut self) {
        unsafe { ((*self.raw).mark_end)(self.raw) }
    }

    fn column(&self) -> usize {
        unsafe { ((*self.raw).get_column)(self.raw) as usize }
    }

    fn at_eof(&self) -> bool {
        unsafe { ((*self.raw).eof)(self.raw) }
    }
}

/// Allocate a fresh scanner state.
#[unsafe(no_mangle)]
pub extern "C" fn tree_sitter_puppet_external_scanner_create() -> *mut c_void {
    Box::into_raw(Box::new(Scanner::new())).cast()
}

/// Free the scanner state and every buffer it owns.
///
/// # Safety
///
/// `payload` must come from [`tree_sitter_puppet_external_scanner_create`]
/// and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_puppet_external_scanner_destroy(payload: *mut c_void) {
    if !payload.is_null() {
        drop(unsafe { Box::from_raw(payload.cast::<Scanner>()) });
    }
}

/// Write the scanner state into the host's snapshot buffer.
///
/// Returns the number of bytes written, or `0` when the state does not fit;
/// the host treats that as a failed snapshot.
///
/// # Safety
///
/// `payload` must come from the create function; `buffer` must point to at
/// least [`SERIALIZATION_BUFFER_SIZE`] writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_puppet_external_scanner_serialize(
    payload: *mut c_void,
    buffer: *mut c_char,
) -> u32 {
    let scanner = unsafe { &*payload.cast::<Scanner>() };
    let buffer =
        unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), SERIALIZATION_BUFFER_SIZE) };
    match scanner.serialize(buffer) {
        Ok(len) => len as u32,
        Err(_) => 0,
    }
}

/// Reload the scanner state from a snapshot taken by the serialize function.
///
/// A zero length yields the empty state. Anything else must be an exact
/// serialize image; a malformed snapshot leaves the state empty.
///
/// # Safety
///
/// `payload` must come from the create function; `buffer` must point to
/// `length` readable bytes when `length` is non-zero.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_puppet_external_scanner_deserialize(
    payload: *mut c_void,
    buffer: *const c_char,
    length: u32,
) {
    let scanner = unsafe { &mut *payload.cast::<Scanner>() };
    if length == 0 || buffer.is_null() {
        scanner.reset();
        return;
    }
    let buffer = unsafe { slice::from_raw_parts(buffer.cast::<u8>(), length as usize) };
    let result = scanner.deserialize(buffer);
    debug_assert!(result.is_ok(), "scanner snapshot failed to reload: {result:?}");
}

/// Produce one external token if the mask admits one here.
///
/// # Safety
///
/// `payload` must come from the create function; `lexer` must be the host's
/// live lexer; `valid_symbols` must point to one `bool` per external token.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_puppet_external_scanner_scan(
    payload: *mut c_void,
    lexer: *mut TSLexer,
    valid_symbols: *const bool,
) -> bool {
    let scanner = unsafe { &mut *payload.cast::<Scanner>() };
    let valid = unsafe { ValidSymbols::from_ptr(valid_symbols) };
    let mut cursor = unsafe { LexerBridge::new(lexer) };
    match scanner.scan(&mut cursor, valid) {
        Some(token) => {
            unsafe { (*lexer).result_symbol = token.symbol() };
            true
        }
        None => false,
    }
}
