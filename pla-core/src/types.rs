//! Core types for pla-core

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp of a sample. Reconstruction steps through every integer
/// timestamp, so callers usually hand in sample indices or whole seconds.
pub type Timestamp = i64;

/// `to - from` in f64; widened so that no pair of timestamps overflows
#[inline]
pub(crate) fn elapsed(from: Timestamp, to: Timestamp) -> f64 {
    (i128::from(to) - i128::from(from)) as f64
}

/// A single observation of the series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample timestamp
    pub timestamp: Timestamp,
    /// Observed value
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(Timestamp, f64)> for Sample {
    fn from((timestamp, value): (Timestamp, f64)) -> Self {
        Self { timestamp, value }
    }
}

/// Range of slopes that keep every covered sample within epsilon of a line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientInterval {
    /// Lowest admissible slope
    pub lower: f64,
    /// Highest admissible slope
    pub upper: f64,
}

impl GradientInterval {
    /// Create an interval from explicit bounds
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// The `(-inf, +inf)` interval every segment starts from
    pub fn unbounded() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    /// Check the `lower <= upper` invariant
    pub fn is_valid(&self) -> bool {
        self.lower <= self.upper
    }

    /// Check if two intervals share at least one slope
    pub fn overlaps(&self, other: &GradientInterval) -> bool {
        other.lower <= self.upper && other.upper >= self.lower
    }

    /// Narrow this interval to the slopes shared with `other`
    pub fn intersect(&self, other: &GradientInterval) -> GradientInterval {
        GradientInterval {
            lower: self.lower.max(other.lower),
            upper: self.upper.min(other.upper),
        }
    }

    /// Midpoint of the interval, the slope used for reconstruction
    pub fn midpoint(&self) -> f64 {
        // Halve first so bounds near f64::MAX do not overflow
        self.lower / 2.0 + self.upper / 2.0
    }
}

impl Default for GradientInterval {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for GradientInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Which grid point a segment origin was snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OriginKind {
    Floor,
    Ceiling,
}

/// A phase-1 segment: quantized origin plus the slopes it admits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Quantized value at `start`
    pub origin: f64,
    /// Admissible slopes
    pub interval: GradientInterval,
    /// Timestamp of the anchor sample
    pub start: Timestamp,
    /// Timestamp of the last covered sample
    pub end: Timestamp,
    /// Grid alignment of the origin (Mix-, Custom-Piece only)
    pub kind: Option<OriginKind>,
}

/// Segments sharing an origin and an overlapping gradient band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedSegment {
    /// Shared quantized origin
    pub origin: f64,
    /// Intersection of the members' intervals
    pub interval: GradientInterval,
    /// Start timestamps of the members, ascending
    pub timestamps: Vec<Timestamp>,
}

impl GroupedSegment {
    /// Slope used when reconstructing every member
    pub fn gradient(&self) -> f64 {
        self.interval.midpoint()
    }
}

/// Segments sharing only a gradient band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfGroupedSegment {
    /// Intersection of the members' intervals
    pub interval: GradientInterval,
    /// `(origin, start timestamp)` of every member, ascending by timestamp
    pub pairs: Vec<(f64, Timestamp)>,
}

impl HalfGroupedSegment {
    /// Slope used when reconstructing every member
    pub fn gradient(&self) -> f64 {
        self.interval.midpoint()
    }
}

/// A segment that found no merge partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UngroupedSegment {
    /// Admissible slopes of the segment
    pub interval: GradientInterval,
    /// Quantized value at `timestamp`
    pub origin: f64,
    /// Start timestamp
    pub timestamp: Timestamp,
}

impl UngroupedSegment {
    /// Slope used when reconstructing the segment
    pub fn gradient(&self) -> f64 {
        self.interval.midpoint()
    }
}

/// The three output categories of phase 2
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressedSeries {
    /// Groups sharing origin and gradient
    pub grouped: Vec<GroupedSegment>,
    /// Groups sharing only a gradient
    pub half_grouped: Vec<HalfGroupedSegment>,
    /// Segments left on their own
    pub ungrouped: Vec<UngroupedSegment>,
}

impl CompressedSeries {
    /// Number of segment starts across all categories
    pub fn segment_count(&self) -> usize {
        self.grouped.iter().map(|g| g.timestamps.len()).sum::<usize>()
            + self.half_grouped.iter().map(|h| h.pairs.len()).sum::<usize>()
            + self.ungrouped.len()
    }

    /// Check if no segment is present
    pub fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }
}

impl From<Vec<GroupedSegment>> for CompressedSeries {
    fn from(grouped: Vec<GroupedSegment>) -> Self {
        Self {
            grouped,
            ..Default::default()
        }
    }
}
