//! This crate exposes the Puppet external scanner to a tree-sitter host.
//!
//! A generated tree-sitter parser resolves its external scanner by symbol
//! name: `tree_sitter_puppet_external_scanner_create`, `_destroy`,
//! `_serialize`, `_deserialize` and `_scan`. Linking this crate as a static
//! or cdylib library next to the generated parser satisfies those symbols
//! with the pure-Rust scanner from [`puppet_scanner`].
//!
//! The binding is deliberately thin: the scanner state is a boxed
//! [`puppet_scanner::Scanner`] behind the opaque payload pointer, and the
//! host's `TSLexer` is adapted into the scanner's [`puppet_scanner::Cursor`]
//! without copying any input.

pub mod ffi;

pub use ffi::{SERIALIZATION_BUFFER_SIZE, TSLexer};
