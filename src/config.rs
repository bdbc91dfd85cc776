//! Store configuration

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default zstd level, matching the zstd CLI default
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Default cap on a decompressed payload: 256 MiB
pub const DEFAULT_MAX_DECODED_LEN: u64 = 256 * 1024 * 1024;

/// How snapshot payloads are compressed on disk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Store the encoded snapshot as-is
    None,
    /// Compress with zstd at the given level
    Zstd { level: i32 },
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Zstd {
            level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

/// Settings for [`SnapshotFile`](crate::SnapshotFile)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Compression applied when saving
    #[serde(default)]
    pub compression: Compression,
    /// Check the payload digest when loading
    #[serde(default = "default_verify_checksum")]
    pub verify_checksum: bool,
    /// Largest payload accepted after decompression
    #[serde(default = "default_max_decoded_len")]
    pub max_decoded_len: u64,
}

fn default_verify_checksum() -> bool {
    true
}

fn default_max_decoded_len() -> u64 {
    DEFAULT_MAX_DECODED_LEN
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            compression: Compression::default(),
            verify_checksum: default_verify_checksum(),
            max_decoded_len: default_max_decoded_len(),
        }
    }
}

impl StoreConfig {
    /// Load config from a JSON file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
