//! Single-file snapshot container
//!
//! File format:
//! ```text
//! [HEADER: 56 bytes]
//!   - magic: 8 bytes ("TREESNAP")
//!   - version: 4 bytes (u32 LE)
//!   - flags: 4 bytes (u32 LE, bit 0 = zstd payload)
//!   - payload_len: 8 bytes (u64 LE)
//!   - checksum: 32 bytes (BLAKE3 of the stored payload)
//!
//! [PAYLOAD: payload_len bytes]
//!   - encoded tree snapshot, compressed if flagged
//! ```

use crate::config::{Compression, StoreConfig};
use crate::snapshot::TreeSnapshot;
use crate::{Error, Result, MAGIC, VERSION};
use bytes::Bytes;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

pub const HEADER_SIZE: usize = 56;

const FLAG_ZSTD: u32 = 1;

/// Parsed file header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: u32,
    pub compressed: bool,
    pub payload_len: u64,
    pub checksum: [u8; 32],
}

impl SnapshotHeader {
    /// The payload digest as hex
    pub fn checksum_hex(&self) -> String {
        hex::encode(self.checksum)
    }

    fn encode(&self) -> [u8; HEADER_SIZE] {
        let flags = if self.compressed { FLAG_ZSTD } else { 0 };
        let mut header = [0u8; HEADER_SIZE];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&self.version.to_le_bytes());
        header[12..16].copy_from_slice(&flags.to_le_bytes());
        header[16..24].copy_from_slice(&self.payload_len.to_le_bytes());
        header[24..56].copy_from_slice(&self.checksum);
        header
    }

    fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::InvalidFile(format!(
                "header needs {} bytes, found {}",
                HEADER_SIZE,
                data.len()
            )));
        }
        if &data[0..8] != MAGIC {
            return Err(Error::InvalidFile("Invalid magic bytes".into()));
        }

        let version = u32::from_le_bytes(le_array(&data[8..12]));
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let flags = u32::from_le_bytes(le_array(&data[12..16]));
        if flags & !FLAG_ZSTD != 0 {
            return Err(Error::InvalidFile(format!("Unknown flags: {:#x}", flags)));
        }

        Ok(SnapshotHeader {
            version,
            compressed: flags & FLAG_ZSTD != 0,
            payload_len: u64::from_le_bytes(le_array(&data[16..24])),
            checksum: le_array(&data[24..56]),
        })
    }
}

fn le_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

/// Decompress a zstd payload, refusing to grow past `limit` bytes
fn decompress(payload: &[u8], limit: u64) -> Result<Vec<u8>> {
    let decoder = zstd::Decoder::new(payload)?;
    let mut encoded = Vec::new();
    decoder
        .take(limit.saturating_add(1))
        .read_to_end(&mut encoded)?;
    if encoded.len() as u64 > limit {
        return Err(Error::InvalidFile(format!(
            "payload decompresses past {} bytes",
            limit
        )));
    }
    Ok(encoded)
}

/// Reads and writes snapshot files
pub struct SnapshotFile;

impl SnapshotFile {
    /// Frame an encoded snapshot as file contents
    pub fn encode(snapshot: &TreeSnapshot, config: &StoreConfig) -> Result<Vec<u8>> {
        let encoded = snapshot.to_bytes()?;
        let (payload, compressed) = match config.compression {
            Compression::None => (encoded.to_vec(), false),
            Compression::Zstd { level } => (zstd::encode_all(&encoded[..], level)?, true),
        };

        let header = SnapshotHeader {
            version: VERSION,
            compressed,
            payload_len: payload.len() as u64,
            checksum: *blake3::hash(&payload).as_bytes(),
        };

        let mut output = Vec::with_capacity(HEADER_SIZE + payload.len());
        output.extend_from_slice(&header.encode());
        output.extend_from_slice(&payload);
        Ok(output)
    }

    /// Unframe file contents and parse the snapshot inside
    ///
    /// The snapshot is parsed lazily; see [`TreeSnapshot::parse`].
    pub fn decode(data: &[u8], config: &StoreConfig) -> Result<TreeSnapshot> {
        let header = SnapshotHeader::decode(data)?;
        let payload = &data[HEADER_SIZE..];

        let expected_len = usize::try_from(header.payload_len)
            .map_err(|_| Error::InvalidFile("payload length overflows usize".into()))?;
        if payload.len() != expected_len {
            return Err(Error::InvalidFile(format!(
                "payload is {} bytes, header says {}",
                payload.len(),
                expected_len
            )));
        }

        if config.verify_checksum {
            let found = blake3::hash(payload);
            if found.as_bytes() != &header.checksum {
                return Err(Error::ChecksumMismatch {
                    expected: header.checksum_hex(),
                    found: hex::encode(found.as_bytes()),
                });
            }
        }

        let encoded = if header.compressed {
            decompress(payload, config.max_decoded_len)?
        } else {
            payload.to_vec()
        };
        Ok(TreeSnapshot::parse(Bytes::from(encoded))?)
    }

    /// Write a snapshot file, returning its header
    pub fn save(
        path: impl AsRef<Path>,
        snapshot: &TreeSnapshot,
        config: &StoreConfig,
    ) -> Result<SnapshotHeader> {
        let path = path.as_ref();
        let data = Self::encode(snapshot, config)?;

        let mut file = File::create(path)?;
        file.write_all(&data)?;
        file.sync_all()?;

        let header = SnapshotHeader::decode(&data)?;
        debug!(
            path = %path.display(),
            bytes = data.len(),
            compressed = header.compressed,
            "saved snapshot"
        );
        Ok(header)
    }

    /// Read a snapshot file
    pub fn load(path: impl AsRef<Path>, config: &StoreConfig) -> Result<TreeSnapshot> {
        let data = std::fs::read(path)?;
        Self::decode(&data, config)
    }

    /// Read only the header of a snapshot file
    pub fn read_header(path: impl AsRef<Path>) -> Result<SnapshotHeader> {
        let mut file = File::open(path)?;
        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header)?;
        SnapshotHeader::decode(&header)
    }
}
