//! Seeding live nodes from a snapshot

use crate::model::{NodeIdentity, OpaqueState};
use crate::snapshot::TreeSnapshot;
use crate::Result;
use std::collections::HashSet;
use tracing::debug;

/// A live node that can be seeded from a snapshot before it starts running
pub trait RestoreTarget {
    /// Seed this node's own state; `None` means start fresh
    fn restore_state(&mut self, state: Option<&OpaqueState>);

    /// Identities of this node's direct children
    fn child_identities(&self) -> Vec<NodeIdentity>;

    /// The child with the given identity
    fn child_mut(&mut self, id: &NodeIdentity) -> Option<&mut dyn RestoreTarget>;
}

/// Outcome of [`restore_tree`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Live nodes seeded with a snapshot entry (possibly one without state)
    pub restored: usize,
    /// Live nodes that had no snapshot entry and started fresh
    pub fresh: usize,
    /// Paths of snapshot entries that matched no live node
    pub orphaned: Vec<Vec<NodeIdentity>>,
}

/// Seed `target` and its descendants from `snapshot`
///
/// Live children missing from the snapshot are seeded with no state, and so
/// are their descendants. Snapshot entries with no live counterpart are
/// reported as orphaned and otherwise ignored. A corrupt child section is
/// returned as an error; nodes visited before it have already been seeded.
pub fn restore_tree(
    target: &mut dyn RestoreTarget,
    snapshot: &TreeSnapshot,
) -> Result<RestoreReport> {
    let mut report = RestoreReport::default();
    let mut path = Vec::new();
    restore_node(target, Some(snapshot), &mut path, &mut report)?;
    Ok(report)
}

fn restore_node(
    target: &mut dyn RestoreTarget,
    snapshot: Option<&TreeSnapshot>,
    path: &mut Vec<NodeIdentity>,
    report: &mut RestoreReport,
) -> Result<()> {
    let Some(snapshot) = snapshot else {
        report.fresh += 1;
        target.restore_state(None);
        for id in target.child_identities() {
            if let Some(child) = target.child_mut(&id) {
                restore_node(child, None, path, report)?;
            }
        }
        return Ok(());
    };

    report.restored += 1;
    target.restore_state(snapshot.state());

    let children = snapshot.children()?;
    let live: HashSet<NodeIdentity> = target.child_identities().into_iter().collect();

    for (id, child_snapshot) in children {
        if !live.contains(id) {
            path.push(id.clone());
            debug!(path = ?path, "snapshot entry has no live node");
            report.orphaned.push(path.clone());
            path.pop();
        } else if let Some(child) = target.child_mut(id) {
            path.push(id.clone());
            let result = restore_node(child, Some(child_snapshot), path, report);
            path.pop();
            result?;
        }
    }

    for id in &live {
        if children.contains_key(id) {
            continue;
        }
        if let Some(child) = target.child_mut(id) {
            restore_node(child, None, path, report)?;
        }
    }

    Ok(())
}
