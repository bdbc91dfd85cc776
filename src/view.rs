//! JSON-friendly description of a snapshot tree
//!
//! Used to inspect snapshots and to build them by hand. States are hex.

use crate::model::{NodeIdentity, OpaqueState};
use crate::snapshot::{ChildMap, TreeSnapshot};
use crate::{Error, ParseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;

/// One snapshot level: its state and its children
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeView {
    /// Hex-encoded state; absent or empty means no state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildView>,
}

/// A child entry: where it sits and what it holds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildView {
    pub id: NodeIdentity,
    #[serde(default)]
    pub tree: TreeView,
}

impl TreeView {
    /// Describe a snapshot, forcing the whole tree
    pub fn from_snapshot(snapshot: &TreeSnapshot) -> std::result::Result<Self, ParseError> {
        let mut children = Vec::new();
        for (id, child) in snapshot.children()? {
            children.push(ChildView {
                id: id.clone(),
                tree: TreeView::from_snapshot(child)?,
            });
        }
        Ok(TreeView {
            state: snapshot.state().map(OpaqueState::to_hex),
            children,
        })
    }

    /// Build the snapshot this view describes
    pub fn to_snapshot(&self) -> Result<TreeSnapshot> {
        let state = match &self.state {
            Some(hex_state) => {
                let bytes = hex::decode(hex_state)
                    .map_err(|e| Error::InvalidView(format!("state {:?}: {}", hex_state, e)))?;
                OpaqueState::new(bytes)
            }
            None => None,
        };

        let mut children = ChildMap::new();
        for child in &self.children {
            match children.entry(child.id.clone()) {
                Entry::Occupied(entry) => {
                    return Err(Error::DuplicateChild(entry.key().to_string()))
                }
                Entry::Vacant(entry) => {
                    entry.insert(child.tree.to_snapshot()?);
                }
            }
        }

        Ok(TreeSnapshot::with_children(state, children))
    }
}
