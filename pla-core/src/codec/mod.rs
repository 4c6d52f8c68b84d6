//! Framed binary encoding of compressed windows
//!
//! A [`CompressedBlock`] carries the three output categories together with
//! what a receiver needs to decompress them. Blocks are framed with a magic
//! number, a format version and a trailing CRC32, so several can be
//! concatenated in one file.
//!
//! Layout (little-endian):
//!
//! ```text
//! 4 bytes  magic "PLA1"
//! 1 byte   format version
//! 1 byte   algorithm tag
//! 8 bytes  epsilon
//! 4 bytes  sample count
//! 8 bytes  first timestamp
//! 8 bytes  last timestamp
//! 4 bytes  payload length
//! N bytes  payload (bincode)
//! 4 bytes  CRC32 of everything above
//! ```

mod decoder;
mod encoder;

pub use decoder::BlockDecoder;
pub use encoder::BlockEncoder;

use crate::algorithms::Algorithm;
use crate::reconstruct::decompress;
use crate::size::SizeModel;
use crate::{CompressedSeries, Result, Sample, Timestamp};
use bytes::Bytes;

/// Block magic number
pub const MAGIC: [u8; 4] = *b"PLA1";

/// Current format version
pub const FORMAT_VERSION: u8 = 1;

/// Bytes before the payload
pub const HEADER_SIZE: usize = 4 + 1 + 1 + 8 + 4 + 8 + 8 + 4;

/// Trailing checksum size
pub const CHECKSUM_SIZE: usize = 4;

/// One compressed window
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedBlock {
    /// Variant that produced the block
    pub algorithm: Algorithm,
    /// Absolute error bound
    pub epsilon: f64,
    /// Number of samples in the window
    pub sample_count: u32,
    /// Timestamp of the first sample
    pub first_timestamp: Timestamp,
    /// Timestamp of the last sample
    pub last_timestamp: Timestamp,
    /// Grouped output
    pub series: CompressedSeries,
}

impl CompressedBlock {
    /// Serialize the block with header and checksum
    pub fn encode(&self) -> Result<Bytes> {
        BlockEncoder::new().encode(self)
    }

    /// Decode a buffer holding exactly one block
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (block, consumed) = BlockDecoder::new(data).decode()?;
        if consumed != data.len() {
            return Err(crate::PlaError::InvalidFormat(format!(
                "{} trailing bytes after block",
                data.len() - consumed
            )));
        }
        Ok(block)
    }

    /// Decode every block of a concatenated buffer
    pub fn decode_all(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut blocks = Vec::new();
        while !data.is_empty() {
            let (block, consumed) = BlockDecoder::new(data).decode()?;
            blocks.push(block);
            data = &data[consumed..];
        }
        Ok(blocks)
    }

    /// Reconstruct the window at every integer timestamp
    pub fn decompress(&self) -> Result<Vec<Sample>> {
        decompress(&self.series, self.last_timestamp)
    }

    /// Size of the raw window under `model`
    pub fn raw_size(&self, model: &SizeModel) -> usize {
        self.sample_count as usize * (model.timestamp_width + model.value_width)
    }

    /// Compression ratio under `model`; 0.0 for an empty representation
    pub fn compression_ratio(&self, model: &SizeModel) -> f64 {
        let compressed = model.compressed_size(&self.series);
        if compressed == 0 {
            return 0.0;
        }
        self.raw_size(model) as f64 / compressed as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{CompressionConfig, Compressor};
    use crate::reconstruct::within_bound;
    use crate::PlaError;

    fn samples() -> Vec<Sample> {
        (0..64)
            .map(|t| Sample::new(t, ((t as f64) * 0.3).sin() * 5.0 + 20.0))
            .collect()
    }

    fn block() -> CompressedBlock {
        Compressor::new(CompressionConfig::new(Algorithm::MixPiece, 2.0))
            .compress(&samples())
            .unwrap()
    }

    #[test]
    fn test_block_encoding() {
        let block = block();
        let encoded = block.encode().unwrap();

        assert_eq!(&encoded[..4], &MAGIC);
        assert_eq!(encoded[4], FORMAT_VERSION);
        assert_eq!(encoded[5], Algorithm::MixPiece as u8);

        let decoded = CompressedBlock::decode(&encoded).unwrap();
        assert_eq!(decoded, block);

        let restored = decoded.decompress().unwrap();
        assert!(within_bound(&samples(), &restored, block.epsilon));
    }

    #[test]
    fn test_checksum_validation() {
        let mut encoded = block().encode().unwrap().to_vec();
        encoded[HEADER_SIZE + 2] ^= 0xFF;

        let result = CompressedBlock::decode(&encoded);
        assert!(matches!(result, Err(PlaError::ChecksumMismatch { .. })));
        assert!(result.unwrap_err().is_corruption());
    }

    #[test]
    fn test_rejects_malformed_frames() {
        let encoded = block().encode().unwrap().to_vec();

        assert!(matches!(
            CompressedBlock::decode(&encoded[..HEADER_SIZE]),
            Err(PlaError::InvalidFormat(_))
        ));
        assert!(matches!(
            CompressedBlock::decode(&encoded[..encoded.len() - 1]),
            Err(PlaError::InvalidFormat(_))
        ));

        let mut bad_magic = encoded.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            CompressedBlock::decode(&bad_magic),
            Err(PlaError::InvalidFormat(_))
        ));

        let mut trailing = encoded;
        trailing.push(0);
        assert!(CompressedBlock::decode(&trailing).is_err());
    }

    #[test]
    fn test_decode_all_concatenated() {
        let first = block();
        let second = Compressor::new(CompressionConfig::new(Algorithm::SimPiece, 5.0))
            .compress(&samples()[10..30])
            .unwrap();

        let mut buf = first.encode().unwrap().to_vec();
        buf.extend_from_slice(&second.encode().unwrap());

        let blocks = CompressedBlock::decode_all(&buf).unwrap();
        assert_eq!(blocks, vec![first, second]);
        assert!(CompressedBlock::decode_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_block_ratio_matches_size_model() {
        let block = block();
        let model = SizeModel::default();
        let expected = model.compression_ratio(&samples(), &block.series);
        assert_eq!(block.compression_ratio(&model), expected);
        assert!(expected > 0.0);
    }
}
