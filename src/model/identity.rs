//! Node identity - which child slot a subtree belongs to

use crate::codec::{BlockReader, BlockWriter};
use crate::ParseError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit on nested proxy kinds accepted when decoding
const MAX_PROXY_DEPTH: usize = 32;

/// Wire tag for a snapshottable node kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindTag {
    /// A kind identified by a stable type name
    Named,
    /// A kind standing in for another kind
    Proxy,
}

impl KindTag {
    pub fn as_byte(&self) -> u8 {
        match self {
            KindTag::Named => 0,
            KindTag::Proxy => 1,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(KindTag::Named),
            1 => Some(KindTag::Proxy),
            _ => None,
        }
    }
}

/// Which kind of node occupies a child slot
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Identified by a stable type name
    Named(String),
    /// Wraps another kind, e.g. a test double or adapter standing in for it
    ///
    /// Snapshottable only if the wrapped kind is.
    Proxy { name: String, inner: Box<NodeKind> },
    /// Only meaningful inside the running process; never persisted
    Ephemeral(String),
}

impl NodeKind {
    pub fn named(name: impl Into<String>) -> Self {
        NodeKind::Named(name.into())
    }

    pub fn proxy(name: impl Into<String>, inner: NodeKind) -> Self {
        NodeKind::Proxy {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    pub fn ephemeral(name: impl Into<String>) -> Self {
        NodeKind::Ephemeral(name.into())
    }

    /// The kind's own name, ignoring any wrapped kind
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Named(name) | NodeKind::Ephemeral(name) => name,
            NodeKind::Proxy { name, .. } => name,
        }
    }

    /// Whether this kind can be written to bytes
    pub fn is_snapshottable(&self) -> bool {
        match self {
            NodeKind::Named(_) => true,
            NodeKind::Proxy { inner, .. } => inner.is_snapshottable(),
            NodeKind::Ephemeral(_) => false,
        }
    }

    /// Write the kind; ephemeral kinds write nothing, so callers check
    /// [`NodeKind::is_snapshottable`] first
    fn write(&self, w: &mut BlockWriter) {
        match self {
            NodeKind::Named(name) => {
                w.write_u8(KindTag::Named.as_byte());
                w.write_str(name);
            }
            NodeKind::Proxy { name, inner } => {
                w.write_u8(KindTag::Proxy.as_byte());
                w.write_str(name);
                inner.write(w);
            }
            NodeKind::Ephemeral(_) => {}
        }
    }

    fn read(r: &mut BlockReader, depth: usize) -> Result<Self, ParseError> {
        if depth > MAX_PROXY_DEPTH {
            return Err(ParseError::InvalidIdentity(format!(
                "proxy kinds nested deeper than {}",
                MAX_PROXY_DEPTH
            )));
        }
        let byte = r.read_u8()?;
        let tag = KindTag::from_byte(byte).ok_or(ParseError::UnknownKindTag(byte))?;
        match tag {
            KindTag::Named => Ok(NodeKind::Named(r.read_str()?)),
            KindTag::Proxy => {
                let name = r.read_str()?;
                let inner = NodeKind::read(r, depth + 1)?;
                Ok(NodeKind::Proxy {
                    name,
                    inner: Box::new(inner),
                })
            }
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Named(name) => write!(f, "{}", name),
            NodeKind::Proxy { name, inner } => write!(f, "{}<{}>", name, inner),
            NodeKind::Ephemeral(name) => write!(f, "~{}", name),
        }
    }
}

/// Identifies a child node among its siblings: its kind plus an optional key
///
/// An empty key means the parent has at most one child of this kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
}

impl NodeIdentity {
    pub fn new(kind: NodeKind, key: impl Into<String>) -> Self {
        NodeIdentity {
            kind,
            key: key.into(),
        }
    }

    /// Identity for the only child of this kind
    pub fn unkeyed(kind: NodeKind) -> Self {
        Self::new(kind, "")
    }

    /// Encode this identity, or `None` if its kind is unsnapshottable
    ///
    /// `None` is not an error: the subtree under this identity is simply left
    /// out of the encoded parent.
    pub fn to_bytes(&self) -> Option<Bytes> {
        if !self.kind.is_snapshottable() {
            return None;
        }
        let mut w = BlockWriter::new();
        self.kind.write(&mut w);
        w.write_str(&self.key);
        Some(w.freeze())
    }

    /// Decode an identity written by [`NodeIdentity::to_bytes`]
    pub fn from_bytes(bytes: Bytes) -> Result<Self, ParseError> {
        let mut r = BlockReader::new(bytes);
        let kind = NodeKind::read(&mut r, 0)?;
        let key = r.read_str()?;
        r.finish()?;
        Ok(NodeIdentity { kind, key })
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.key)
        }
    }
}
