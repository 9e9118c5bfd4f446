//! Shared leaf crate for the Wyn compiler.
//!
//! Everything here is consumed by every later phase: byte-offset spans with
//! on-demand line/column lookup, the token vocabulary produced by the lexer,
//! and lexer error types.

pub mod error;
pub mod span;
pub mod token;
