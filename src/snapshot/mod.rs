//! Tree snapshots - the persisted state of a whole node tree
//!
//! A [`TreeSnapshot`] holds one node's optional state plus the snapshots of
//! its children, keyed by [`NodeIdentity`](crate::NodeIdentity).
//!
//! Wire format (integers big-endian):
//! ```text
//! [SELF STATE]
//!   - length: u32, then that many bytes (length 0 => no state)
//! [CHILDREN]
//!   - count: i32
//!   - count records of:
//!       - length: u32, identity bytes
//!       - length: u32, child bytes (recursively this same format)
//! ```
//!
//! Decoding is lazy: [`TreeSnapshot::parse`] reads only the self-state block.
//! The child section is parsed the first time [`TreeSnapshot::children`] is
//! called, one level at a time.
//!
//! Trees deeper than [`MAX_TREE_DEPTH`] are rejected on both sides, so every
//! recursive walk over a decoded tree has a bounded stack.

mod decode;
mod deferred;
mod encode;
mod tree;

pub use tree::{ChildMap, TreeSnapshot};

/// Deepest tree that encodes or parses; a lone root has depth 1
pub const MAX_TREE_DEPTH: usize = 1024;
