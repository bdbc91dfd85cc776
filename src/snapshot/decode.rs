//! Snapshot decoding

use super::tree::ChildResult;
use super::{ChildMap, TreeSnapshot, MAX_TREE_DEPTH};
use crate::codec::BlockReader;
use crate::model::{NodeIdentity, OpaqueState};
use crate::ParseError;
use bytes::Bytes;
use std::collections::btree_map::Entry;
use tracing::trace;

/// Smallest possible child record: two empty length prefixes
const MIN_RECORD_SIZE: usize = 8;

impl TreeSnapshot {
    /// Parse bytes written by [`TreeSnapshot::to_bytes`]
    ///
    /// Only the root's state is read here. The child section is parsed when
    /// [`TreeSnapshot::children`] is first called, and each child parsed then
    /// defers its own children in turn. Never returns an empty root state:
    /// an empty state block parses as `None`. Zero-length input parses as
    /// [`TreeSnapshot::none`].
    ///
    /// A child section that would put a node below [`MAX_TREE_DEPTH`] fails
    /// with [`ParseError::TooDeep`] when it is forced.
    pub fn parse(bytes: impl Into<Bytes>) -> Result<TreeSnapshot, ParseError> {
        parse_at(bytes.into(), 1)
    }

    /// Parse and force the whole tree, surfacing any corruption up front
    pub fn parse_validated(bytes: impl Into<Bytes>) -> Result<TreeSnapshot, ParseError> {
        let snapshot = Self::parse(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Parse a snapshot whose root sits at `level` (the top root is level 1)
fn parse_at(bytes: Bytes, level: usize) -> Result<TreeSnapshot, ParseError> {
    if bytes.is_empty() {
        return Ok(TreeSnapshot::none());
    }

    let mut r = BlockReader::new(bytes);
    let state = OpaqueState::new(r.read_block()?);
    let rest = r.into_remaining();
    Ok(TreeSnapshot::from_parts(state, move || parse_children(rest, level)))
}

fn parse_children(bytes: Bytes, level: usize) -> ChildResult {
    let mut r = BlockReader::new(bytes);
    let count = r.read_i32()?;
    let count = usize::try_from(count).map_err(|_| ParseError::NegativeCount(count))?;
    if count > 0 && level >= MAX_TREE_DEPTH {
        return Err(ParseError::TooDeep(MAX_TREE_DEPTH));
    }
    r.ensure(count.saturating_mul(MIN_RECORD_SIZE))?;
    trace!(count, level, "parsing child snapshots");

    let mut children = ChildMap::new();
    for _ in 0..count {
        let id = NodeIdentity::from_bytes(r.read_block()?)?;
        let child = parse_at(r.read_block()?, level + 1)?;
        match children.entry(id) {
            Entry::Occupied(entry) => {
                return Err(ParseError::DuplicateIdentity(entry.key().to_string()));
            }
            Entry::Vacant(entry) => {
                entry.insert(child);
            }
        }
    }
    r.finish()?;

    Ok(children)
}
