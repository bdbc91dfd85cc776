//! Capturing snapshots from live nodes

use crate::model::{NodeIdentity, OpaqueState};
use crate::snapshot::{ChildMap, TreeSnapshot};
use crate::{Error, Result};
use std::collections::btree_map::Entry;

/// A live node whose state can be captured
pub trait SnapshotSource {
    /// This node's identity within its parent
    fn identity(&self) -> NodeIdentity;

    /// Serialize this node's own state, or `None` if it has nothing to keep
    fn capture_state(&self) -> Option<OpaqueState>;

    /// This node's direct children
    fn children(&self) -> Vec<&dyn SnapshotSource>;
}

/// Capture `root` and all its descendants, children first
///
/// The root's own identity is not recorded. Fails if two siblings report the
/// same identity.
pub fn capture_tree(root: &dyn SnapshotSource) -> Result<TreeSnapshot> {
    let mut children = ChildMap::new();
    for child in root.children() {
        let snapshot = capture_tree(child)?;
        match children.entry(child.identity()) {
            Entry::Occupied(entry) => return Err(Error::DuplicateChild(entry.key().to_string())),
            Entry::Vacant(entry) => {
                entry.insert(snapshot);
            }
        }
    }
    Ok(TreeSnapshot::with_children(root.capture_state(), children))
}
