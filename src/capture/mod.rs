//! Capturing a live node tree into a snapshot and seeding one back from it
//!
//! The node-tree runtime implements [`SnapshotSource`] to be captured and
//! [`RestoreTarget`] to be restored. The walks here only move state between
//! nodes and [`TreeSnapshot`](crate::TreeSnapshot)s; they know nothing about
//! how nodes execute.

mod restore;
mod source;

pub use restore::{restore_tree, RestoreReport, RestoreTarget};
pub use source::{capture_tree, SnapshotSource};
