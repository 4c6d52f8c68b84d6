//! Gradient bound tracking for a segment under construction
//!
//! Every segment builder drives a [`BoundTracker`]: it is anchored at a
//! sample with a quantized origin and admits following samples one by one,
//! narrowing the gradient interval so that every admitted sample stays
//! within epsilon of any line through the origin with a slope inside it.
//!
//! Both tightening tests are symmetric: the upper bound moves when a sample
//! lies more than epsilon below it, the lower bound when a sample lies more
//! than epsilon above it.

use crate::types::elapsed;
use crate::{GradientInterval, OriginKind, Sample, Segment, Timestamp};

/// Tracks the admissible gradients of one segment
#[derive(Debug, Clone)]
pub struct BoundTracker {
    anchor: Timestamp,
    origin: f64,
    epsilon: f64,
    interval: GradientInterval,
    last: Timestamp,
    admitted: usize,
}

impl BoundTracker {
    /// Start a segment at `anchor` with the given quantized origin
    pub fn new(anchor: &Sample, origin: f64, epsilon: f64) -> Self {
        Self {
            anchor: anchor.timestamp,
            origin,
            epsilon,
            interval: GradientInterval::unbounded(),
            last: anchor.timestamp,
            admitted: 0,
        }
    }

    /// Try to extend the segment with `sample`.
    ///
    /// Returns `false` and leaves the tracker untouched when the sample is
    /// out of band, or when tightening would leave `lower > upper`.
    pub fn admit(&mut self, sample: &Sample) -> bool {
        let dt = elapsed(self.anchor, sample.timestamp);
        if dt <= 0.0 {
            return false;
        }

        let v = sample.value;
        let current = self.interval;

        if v > current.upper * dt + self.origin + self.epsilon
            || v < current.lower * dt + self.origin - self.epsilon
        {
            return false;
        }

        let mut next = current;
        if v < current.upper * dt + self.origin - self.epsilon {
            next.upper = (v - self.origin + self.epsilon) / dt;
        }
        if v > current.lower * dt + self.origin + self.epsilon {
            next.lower = (v - self.origin - self.epsilon) / dt;
        }

        // Rounding on a boundary sample can invert the interval
        if !next.is_valid() {
            return false;
        }

        self.interval = next;
        self.last = sample.timestamp;
        self.admitted += 1;
        true
    }

    /// Number of samples admitted after the anchor
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// Current gradient interval
    pub fn interval(&self) -> GradientInterval {
        self.interval
    }

    /// Quantized origin
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Snapshot the segment covering the anchor through the last admitted sample
    pub fn segment(&self, kind: Option<OriginKind>) -> Segment {
        Segment {
            origin: self.origin,
            interval: self.interval,
            start: self.anchor,
            end: self.last,
            kind,
        }
    }
}
