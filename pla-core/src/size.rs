//! Fixed-width byte-cost model
//!
//! Deterministic accounting used both for reporting and for scoring
//! candidate paths in the Custom-Piece search:
//!
//! | entity | cost |
//! |---|---|
//! | raw sample | `timestamp + value` |
//! | grouped segment | `2 * value + timestamp * |timestamps|` |
//! | half-grouped segment | `value + (value + timestamp) * |pairs|` |
//! | ungrouped segment | `2 * value + timestamp` |

use crate::{
    CompressedSeries, GroupedSegment, HalfGroupedSegment, Sample, UngroupedSegment,
};
use serde::{Deserialize, Serialize};

/// Byte widths of the encoded fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeModel {
    /// Bytes per timestamp (delta encoded)
    pub timestamp_width: usize,
    /// Bytes per value, origin or gradient
    pub value_width: usize,
}

impl Default for SizeModel {
    fn default() -> Self {
        Self {
            timestamp_width: crate::config::TIMESTAMP_WIDTH,
            value_width: crate::config::VALUE_WIDTH,
        }
    }
}

impl SizeModel {
    /// Size of the uncompressed series
    pub fn raw_size(&self, samples: &[Sample]) -> usize {
        samples.len() * (self.timestamp_width + self.value_width)
    }

    /// Size of one grouped segment
    pub fn grouped_size(&self, segment: &GroupedSegment) -> usize {
        2 * self.value_width + self.timestamp_width * segment.timestamps.len()
    }

    /// Size of one half-grouped segment
    pub fn half_grouped_size(&self, segment: &HalfGroupedSegment) -> usize {
        self.value_width + (self.value_width + self.timestamp_width) * segment.pairs.len()
    }

    /// Size of one ungrouped segment
    pub fn ungrouped_size(&self, _segment: &UngroupedSegment) -> usize {
        2 * self.value_width + self.timestamp_width
    }

    /// Size of the whole compressed representation
    pub fn compressed_size(&self, series: &CompressedSeries) -> usize {
        series.grouped.iter().map(|g| self.grouped_size(g)).sum::<usize>()
            + series
                .half_grouped
                .iter()
                .map(|h| self.half_grouped_size(h))
                .sum::<usize>()
            + series
                .ungrouped
                .iter()
                .map(|u| self.ungrouped_size(u))
                .sum::<usize>()
    }

    /// Raw size divided by compressed size; 0.0 for an empty representation
    pub fn compression_ratio(&self, samples: &[Sample], series: &CompressedSeries) -> f64 {
        let compressed = self.compressed_size(series);
        if compressed == 0 {
            return 0.0;
        }
        self.raw_size(samples) as f64 / compressed as f64
    }
}

/// Compression ratio under the default widths
pub fn compression_ratio(samples: &[Sample], compressed: &CompressedSeries) -> f64 {
    SizeModel::default().compression_ratio(samples, compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GradientInterval;

    fn interval() -> GradientInterval {
        GradientInterval::new(0.0, 1.0)
    }

    #[test]
    fn test_category_costs() {
        let model = SizeModel::default();

        let g = GroupedSegment {
            origin: 1.0,
            interval: interval(),
            timestamps: vec![0, 5, 9],
        };
        let h = HalfGroupedSegment {
            interval: interval(),
            pairs: vec![(1.0, 2), (2.0, 7)],
        };
        let u = UngroupedSegment {
            interval: interval(),
            origin: 3.0,
            timestamp: 11,
        };

        assert_eq!(model.grouped_size(&g), 19);
        assert_eq!(model.half_grouped_size(&h), 26);
        assert_eq!(model.ungrouped_size(&u), 17);

        let series = CompressedSeries {
            grouped: vec![g],
            half_grouped: vec![h],
            ungrouped: vec![u],
        };
        assert_eq!(model.compressed_size(&series), 62);
    }

    #[test]
    fn test_ratio() {
        let samples: Vec<Sample> = (0..34).map(|t| Sample::new(t, 1.0)).collect();
        let series = CompressedSeries::from(vec![GroupedSegment {
            origin: 1.0,
            interval: GradientInterval::new(0.0, 0.0),
            timestamps: vec![0],
        }]);

        // 34 * 9 raw bytes over 17 compressed bytes
        assert_eq!(compression_ratio(&samples, &series), 18.0);
        assert_eq!(compression_ratio(&samples, &CompressedSeries::default()), 0.0);
    }

    #[test]
    fn test_custom_widths() {
        let model = SizeModel {
            timestamp_width: 4,
            value_width: 4,
        };
        let samples = vec![Sample::new(0, 0.0), Sample::new(1, 1.0)];
        assert_eq!(model.raw_size(&samples), 16);
    }
}
