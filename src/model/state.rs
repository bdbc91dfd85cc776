//! Opaque per-node state payload

use bytes::Bytes;
use std::fmt;

/// An uninterpreted, non-empty byte payload holding one node's state
///
/// There is no empty `OpaqueState`: a zero-length payload means "no state"
/// and is normalized to `None` by [`OpaqueState::new`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OpaqueState(Bytes);

impl OpaqueState {
    /// Wrap a payload, returning `None` if it is empty
    pub fn new(bytes: impl Into<Bytes>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            None
        } else {
            Some(OpaqueState(bytes))
        }
    }

    /// Wrap a static payload, returning `None` if it is empty
    pub fn from_static(bytes: &'static [u8]) -> Option<Self> {
        Self::new(Bytes::from_static(bytes))
    }

    /// Get the payload
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    /// Take ownership of the payload
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Size of the payload in bytes (always non-zero)
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for OpaqueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 8;
        let shown = &self.0[..self.0.len().min(PREVIEW)];
        let ellipsis = if self.0.len() > PREVIEW { ".." } else { "" };
        write!(
            f,
            "OpaqueState({} bytes, {}{})",
            self.0.len(),
            hex::encode(shown),
            ellipsis
        )
    }
}

impl AsRef<[u8]> for OpaqueState {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
