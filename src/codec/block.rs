//! Block reader and writer over `bytes` buffers

use crate::ParseError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Reads integers and length-prefixed blocks from a shared buffer
///
/// Blocks are returned as zero-copy slices of the input.
#[derive(Clone, Debug)]
pub struct BlockReader {
    buf: Bytes,
}

impl BlockReader {
    /// Create a reader positioned at the start of `buf`
    pub fn new(buf: Bytes) -> Self {
        BlockReader { buf }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Check that at least `needed` bytes remain
    pub fn ensure(&self, needed: usize) -> Result<(), ParseError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ParseError::Truncated { needed, remaining });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i32(&mut self) -> Result<i32, ParseError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    /// Read a `u32` length prefix and the block it describes
    pub fn read_block(&mut self) -> Result<Bytes, ParseError> {
        let len = self.read_u32()? as usize;
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Read a block and decode it as UTF-8
    pub fn read_str(&mut self) -> Result<String, ParseError> {
        let block = self.read_block()?;
        String::from_utf8(block.to_vec())
            .map_err(|e| ParseError::InvalidIdentity(format!("non-UTF-8 text: {}", e)))
    }

    /// Hand back everything not yet consumed
    pub fn into_remaining(self) -> Bytes {
        self.buf
    }

    /// Fail if any input is left over
    pub fn finish(self) -> Result<(), ParseError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ParseError::TrailingBytes(n)),
        }
    }
}

/// Appends integers and length-prefixed blocks to a growable buffer
#[derive(Debug, Default)]
pub struct BlockWriter {
    buf: BytesMut,
}

impl BlockWriter {
    pub fn new() -> Self {
        BlockWriter {
            buf: BytesMut::new(),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Write `data` prefixed by its length as a `u32`
    ///
    /// Panics if `data` is longer than `u32::MAX` bytes, which the wire format
    /// cannot express.
    pub fn write_block(&mut self, data: &[u8]) {
        let len = u32::try_from(data.len()).expect("block length exceeds u32 prefix");
        self.buf.reserve(4 + data.len());
        self.buf.put_u32(len);
        self.buf.put_slice(data);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_block(s.as_bytes());
    }

    /// Finish writing and return the encoded bytes
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
