//! Length-prefixed binary framing
//!
//! Every variable-length field on the wire is a block: a big-endian `u32`
//! length followed by that many bytes. Counts are big-endian `i32`.
//! Readers validate each length against the bytes actually remaining before
//! consuming anything, so truncated input always ends in a
//! [`ParseError`](crate::ParseError) instead of an over-read.

mod block;

pub use block::{BlockReader, BlockWriter};
