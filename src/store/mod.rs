//! Snapshot file container
//!
//! Persists an encoded [`TreeSnapshot`](crate::TreeSnapshot) to a single
//! file with a versioned header, an optional zstd-compressed payload, and a
//! BLAKE3 digest of the stored payload.

mod file;

pub use file::{SnapshotFile, SnapshotHeader, HEADER_SIZE};
