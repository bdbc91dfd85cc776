//! Core data model types for tree_snapshot

mod identity;
mod state;

pub use identity::{KindTag, NodeIdentity, NodeKind};
pub use state::OpaqueState;
