//! Snapshot encoding

use super::{TreeSnapshot, MAX_TREE_DEPTH};
use crate::codec::BlockWriter;
use crate::ParseError;
use bytes::Bytes;
use tracing::debug;

impl TreeSnapshot {
    /// Write this snapshot and all its children into bytes
    ///
    /// The result can be restored with [`TreeSnapshot::parse`]. Children whose
    /// identity is unsnapshottable are left out, along with their whole
    /// subtree. Fails on a child section of a parsed snapshot that turns out
    /// to be corrupt when it is forced here, and with [`ParseError::TooDeep`]
    /// on a tree that [`TreeSnapshot::parse`] would refuse.
    pub fn to_bytes(&self) -> Result<Bytes, ParseError> {
        self.encode_at(1)
    }

    fn encode_at(&self, level: usize) -> Result<Bytes, ParseError> {
        let mut w = BlockWriter::new();
        w.write_block(self.state().map(|s| &s.bytes()[..]).unwrap_or_default());

        let mut records: Vec<(Bytes, Bytes)> = Vec::new();
        for (id, child) in self.children()? {
            let Some(id_bytes) = id.to_bytes() else {
                debug!(child = %id, "skipping unsnapshottable child");
                continue;
            };
            if level >= MAX_TREE_DEPTH {
                return Err(ParseError::TooDeep(MAX_TREE_DEPTH));
            }
            records.push((id_bytes, child.encode_at(level + 1)?));
        }

        let count = i32::try_from(records.len()).expect("child count exceeds i32");
        w.write_i32(count);
        for (id_bytes, child_bytes) in &records {
            w.write_block(id_bytes);
            w.write_block(child_bytes);
        }

        Ok(w.freeze())
    }
}
