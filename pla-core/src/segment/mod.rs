//! Phase 1: greedy construction of error-bounded segments
//!
//! - [`sim`]: floor-quantized origins, one candidate per anchor
//! - [`mix`]: floor and ceiling candidates raced from the same anchor
//!
//! Consecutive segments share their boundary sample: a segment is closed at
//! the last sample it admitted and the next one is anchored on that sample.

pub mod mix;
pub mod sim;

use crate::bounds::BoundTracker;
use crate::quantize::quantize;
use crate::{OriginKind, Sample, Segment};
use std::collections::HashMap;

/// Extend a candidate anchored at `samples[start]` until the tracker rejects.
///
/// Returns the segment and the index of its last covered sample.
pub(crate) fn extend_maximal(
    samples: &[Sample],
    start: usize,
    epsilon: f64,
    kind: OriginKind,
) -> (Segment, usize) {
    let anchor = &samples[start];
    let mut tracker = BoundTracker::new(anchor, quantize(anchor.value, epsilon, kind), epsilon);

    let mut end = start;
    for sample in &samples[start + 1..] {
        if !tracker.admit(sample) {
            break;
        }
        end += 1;
    }

    (tracker.segment(Some(kind)), end)
}

/// Phase-1 segments bucketed by quantized origin, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct OriginBuckets {
    index: HashMap<u64, usize>,
    buckets: Vec<(f64, Vec<Segment>)>,
}

impl OriginBuckets {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every segment of `segments`
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut buckets = Self::new();
        for segment in segments {
            buckets.push(segment);
        }
        buckets
    }

    /// Add a segment to the bucket of its origin
    pub fn push(&mut self, segment: Segment) {
        let key = origin_key(segment.origin);
        match self.index.get(&key) {
            Some(&i) => self.buckets[i].1.push(segment),
            None => {
                self.index.insert(key, self.buckets.len());
                self.buckets.push((segment.origin, vec![segment]));
            }
        }
    }

    /// Number of distinct origins
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of segments
    pub fn segment_count(&self) -> usize {
        self.buckets.iter().map(|(_, b)| b.len()).sum()
    }

    /// Iterate over `(origin, segments)` buckets
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[Segment])> {
        self.buckets.iter().map(|(o, b)| (*o, b.as_slice()))
    }

    /// Consume into `(origin, segments)` buckets
    pub fn into_buckets(self) -> Vec<(f64, Vec<Segment>)> {
        self.buckets
    }
}

/// Hash key of an origin; `-0.0` and `0.0` share a bucket
pub(crate) fn origin_key(origin: f64) -> u64 {
    (origin + 0.0).to_bits()
}
