//! Block decoder

use super::{CompressedBlock, CHECKSUM_SIZE, FORMAT_VERSION, HEADER_SIZE, MAGIC};
use crate::algorithms::Algorithm;
use crate::{CompressedSeries, PlaError, Result};
use bytes::Buf;

/// Reads one framed [`CompressedBlock`] from the front of a buffer
pub struct BlockDecoder<'a> {
    data: &'a [u8],
}

impl<'a> BlockDecoder<'a> {
    /// Create a decoder over `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Decode the first block, returning it and the number of bytes consumed
    pub fn decode(self) -> Result<(CompressedBlock, usize)> {
        let data = self.data;
        if data.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(PlaError::InvalidFormat("Block too short".into()));
        }

        let mut header = &data[..HEADER_SIZE];

        let mut magic = [0u8; 4];
        header.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(PlaError::InvalidFormat(format!(
                "Invalid block magic: {:?}",
                magic
            )));
        }

        let version = header.get_u8();
        if version != FORMAT_VERSION {
            return Err(PlaError::InvalidFormat(format!(
                "Unsupported block version: {}",
                version
            )));
        }

        let tag = header.get_u8();
        let epsilon = header.get_f64_le();
        let sample_count = header.get_u32_le();
        let first_timestamp = header.get_i64_le();
        let last_timestamp = header.get_i64_le();
        let payload_len = header.get_u32_le() as usize;

        let total = HEADER_SIZE + payload_len + CHECKSUM_SIZE;
        if data.len() < total {
            return Err(PlaError::InvalidFormat("Incomplete block".into()));
        }

        // Validate checksum before trusting the payload
        let body = &data[..HEADER_SIZE + payload_len];
        let expected = (&data[HEADER_SIZE + payload_len..total]).get_u32_le();
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(PlaError::ChecksumMismatch { expected, actual });
        }

        let algorithm = Algorithm::try_from(tag)?;
        if last_timestamp < first_timestamp {
            return Err(PlaError::InvalidFormat(format!(
                "Invalid timestamp range: {}..{}",
                first_timestamp, last_timestamp
            )));
        }

        let series: CompressedSeries = bincode::deserialize(&body[HEADER_SIZE..])
            .map_err(|e| PlaError::InvalidFormat(e.to_string()))?;

        let block = CompressedBlock {
            algorithm,
            epsilon,
            sample_count,
            first_timestamp,
            last_timestamp,
            series,
        };

        Ok((block, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BlockEncoder;

    fn encoded() -> Vec<u8> {
        let block = CompressedBlock {
            algorithm: Algorithm::SimPiece,
            epsilon: 0.25,
            sample_count: 3,
            first_timestamp: 7,
            last_timestamp: 9,
            series: CompressedSeries::default(),
        };
        BlockEncoder::new().encode(&block).unwrap().to_vec()
    }

    fn reseal(buf: &mut [u8]) {
        let end = buf.len() - CHECKSUM_SIZE;
        let checksum = crc32fast::hash(&buf[..end]);
        buf[end..].copy_from_slice(&checksum.to_le_bytes());
    }

    #[test]
    fn test_reports_consumed_length() {
        let mut buf = encoded();
        let len = buf.len();
        buf.extend_from_slice(b"next");

        let (block, consumed) = BlockDecoder::new(&buf).decode().unwrap();
        assert_eq!(consumed, len);
        assert_eq!(block.first_timestamp, 7);
        assert_eq!(block.epsilon, 0.25);
    }

    #[test]
    fn test_unknown_version_and_tag() {
        let mut buf = encoded();
        buf[4] = 9;
        reseal(&mut buf);
        assert!(matches!(
            BlockDecoder::new(&buf).decode(),
            Err(PlaError::InvalidFormat(_))
        ));

        let mut buf = encoded();
        buf[5] = 42;
        reseal(&mut buf);
        assert!(matches!(
            BlockDecoder::new(&buf).decode(),
            Err(PlaError::InvalidFormat(_))
        ));
    }
}
