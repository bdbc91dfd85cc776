//! The TreeSnapshot value type

use super::deferred::Deferred;
use crate::model::{NodeIdentity, OpaqueState};
use crate::ParseError;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Child snapshots keyed by the child's identity
pub type ChildMap = BTreeMap<NodeIdentity, TreeSnapshot>;

pub(super) type ChildResult = Result<ChildMap, ParseError>;

/// Aggregate of the persisted state of a node and all its descendants
///
/// Can be serialized with [`TreeSnapshot::to_bytes`] and deserialized with
/// [`TreeSnapshot::parse`]. Clones are cheap and share the lazily produced
/// child map.
#[derive(Clone)]
pub struct TreeSnapshot {
    state: Option<OpaqueState>,
    children: Arc<Deferred<ChildResult>>,
}

impl TreeSnapshot {
    /// The empty snapshot: no state and no children
    pub fn none() -> Self {
        Self::with_children(None, ChildMap::new())
    }

    /// A snapshot holding only the root node's state
    pub fn for_root_only(state: Option<OpaqueState>) -> Self {
        Self::with_children(state, ChildMap::new())
    }

    /// A snapshot holding only the root node's state, given as raw bytes
    ///
    /// An empty payload yields the same snapshot as `for_root_only(None)`.
    pub fn for_root_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::for_root_only(OpaqueState::new(bytes))
    }

    /// A snapshot with an already built child map
    pub fn with_children(state: Option<OpaqueState>, children: ChildMap) -> Self {
        TreeSnapshot {
            state,
            children: Arc::new(Deferred::ready(Ok(children))),
        }
    }

    /// A snapshot whose child map is built on first access
    ///
    /// `producer` runs at most once, even if several threads read the
    /// children concurrently.
    pub fn deferred(
        state: Option<OpaqueState>,
        producer: impl FnOnce() -> ChildMap + Send + 'static,
    ) -> Self {
        Self::from_parts(state, move || Ok(producer()))
    }

    pub(super) fn from_parts(
        state: Option<OpaqueState>,
        producer: impl FnOnce() -> ChildResult + Send + 'static,
    ) -> Self {
        TreeSnapshot {
            state,
            children: Arc::new(Deferred::new(producer)),
        }
    }

    /// The root node's state, or `None` if it had none (or an empty one)
    pub fn state(&self) -> Option<&OpaqueState> {
        self.state.as_ref()
    }

    /// The child snapshots, producing them on first access
    ///
    /// For a parsed snapshot this is where the child section is decoded, so
    /// this is where corrupt child bytes are reported.
    pub fn children(&self) -> Result<&ChildMap, ParseError> {
        self.children.get().as_ref().map_err(Clone::clone)
    }

    /// The snapshot of one direct child
    pub fn child(&self, id: &NodeIdentity) -> Result<Option<&TreeSnapshot>, ParseError> {
        Ok(self.children()?.get(id))
    }

    /// Follow a path of identities down the tree
    ///
    /// An empty path returns `self`.
    pub fn descend(&self, path: &[NodeIdentity]) -> Result<Option<&TreeSnapshot>, ParseError> {
        let mut current = self;
        for id in path {
            match current.child(id)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Whether the child map has been produced yet
    pub fn is_children_forced(&self) -> bool {
        self.children.is_forced()
    }

    /// Force the whole tree, returning the first decode error found
    pub fn validate(&self) -> Result<(), ParseError> {
        for child in self.children()?.values() {
            child.validate()?;
        }
        Ok(())
    }

    /// Number of snapshots in this tree, including the root
    pub fn node_count(&self) -> Result<usize, ParseError> {
        let mut count = 1;
        for child in self.children()?.values() {
            count += child.node_count()?;
        }
        Ok(count)
    }

    /// Length of the longest root-to-leaf path; a lone root has depth 1
    pub fn depth(&self) -> Result<usize, ParseError> {
        let mut deepest = 0;
        for child in self.children()?.values() {
            deepest = deepest.max(child.depth()?);
        }
        Ok(deepest + 1)
    }
}

impl Default for TreeSnapshot {
    fn default() -> Self {
        TreeSnapshot::none()
    }
}

/// Equality forces both child maps
impl PartialEq for TreeSnapshot {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.children, &other.children) {
            self.children.get();
            return self.state == other.state;
        }
        self.state == other.state && self.children.get() == other.children.get()
    }
}

impl Eq for TreeSnapshot {}

impl Hash for TreeSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state.hash(state);
        self.children.get().hash(state);
    }
}

impl std::fmt::Debug for TreeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSnapshot")
            .field("state", &self.state)
            .field("children", &*self.children)
            .finish()
    }
}
