//! # tree_snapshot
//!
//! Binary snapshots of a hierarchical tree of state machines.
//!
//! Each node in the tree may persist an opaque state payload. A
//! [`TreeSnapshot`] captures a node's state plus the snapshots of all its
//! children, encodes the whole tree into one byte blob, and restores it
//! lazily: parsing reads one level at a time, only when a level's children
//! are first looked at.
//!
//! ## Core Concepts
//!
//! - **OpaqueState**: a node's serialized state; never empty
//! - **NodeIdentity**: a child's kind plus optional key, unique among siblings
//! - **TreeSnapshot**: one node's state and its children's snapshots
//! - **Unsnapshottable**: identities that cannot be encoded; their subtrees
//!   are dropped on encode instead of failing it
//!
//! ## Example
//!
//! ```
//! use tree_snapshot::{ChildMap, NodeIdentity, NodeKind, TreeSnapshot};
//!
//! let mut children = ChildMap::new();
//! children.insert(
//!     NodeIdentity::new(NodeKind::named("Row"), "1"),
//!     TreeSnapshot::for_root_bytes("row state"),
//! );
//! let tree = TreeSnapshot::with_children(None, children);
//!
//! let bytes = tree.to_bytes()?;
//! let restored = TreeSnapshot::parse(bytes)?;
//! assert_eq!(restored, tree);
//! # Ok::<(), tree_snapshot::ParseError>(())
//! ```

pub mod capture;
pub mod codec;
pub mod config;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod view;

mod error;

pub use capture::{capture_tree, restore_tree, RestoreReport, RestoreTarget, SnapshotSource};
pub use config::{Compression, StoreConfig};
pub use error::{Error, ParseError, Result};
pub use model::{NodeIdentity, NodeKind, OpaqueState};
pub use snapshot::{ChildMap, TreeSnapshot, MAX_TREE_DEPTH};
pub use store::{SnapshotFile, SnapshotHeader};
pub use view::{ChildView, TreeView};

/// Snapshot file format version
pub const VERSION: u32 = 1;

/// Magic bytes for snapshot file identification
pub const MAGIC: &[u8; 8] = b"TREESNAP";
