//! Block encoder

use super::{CompressedBlock, FORMAT_VERSION, HEADER_SIZE, MAGIC};
use crate::{PlaError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Writes one framed [`CompressedBlock`]
pub struct BlockEncoder {
    buf: BytesMut,
}

impl BlockEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(HEADER_SIZE + 256),
        }
    }

    /// Encode the block and return the frame
    pub fn encode(mut self, block: &CompressedBlock) -> Result<Bytes> {
        let payload = bincode::serialize(&block.series)
            .map_err(|e| PlaError::InvalidFormat(e.to_string()))?;
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            PlaError::InvalidFormat(format!("payload too large: {} bytes", payload.len()))
        })?;

        // Header
        self.buf.put_slice(&MAGIC);
        self.buf.put_u8(FORMAT_VERSION);
        self.buf.put_u8(block.algorithm as u8);
        self.buf.put_f64_le(block.epsilon);
        self.buf.put_u32_le(block.sample_count);
        self.buf.put_i64_le(block.first_timestamp);
        self.buf.put_i64_le(block.last_timestamp);

        // Payload
        self.buf.put_u32_le(payload_len);
        self.buf.put_slice(&payload);

        let checksum = crc32fast::hash(&self.buf);
        self.buf.put_u32_le(checksum);

        Ok(self.buf.freeze())
    }
}

impl Default for BlockEncoder {
    fn default() -> Self {
        Self::new()
    }
}
