//! Sim-Piece segment construction

use super::extend_maximal;
use crate::{OriginKind, Sample, Segment};
use tracing::debug;

/// Greedy single pass with floor-quantized origins.
///
/// `samples` must hold at least two strictly ordered samples.
pub fn build_segments(samples: &[Sample], epsilon: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = 0;

    while start + 1 < samples.len() {
        let (mut segment, end) = extend_maximal(samples, start, epsilon, OriginKind::Floor);
        segment.kind = None;
        segments.push(segment);
        start = end;
    }

    debug!(segments = segments.len(), epsilon, "sim-piece phase 1 complete");
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_splits_before_jump() {
        let samples = vec![
            Sample::new(0, 10.0),
            Sample::new(1, 10.4),
            Sample::new(2, 9.6),
            Sample::new(3, 15.0),
        ];
        let segments = build_segments(&samples, 0.54);

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start, segments[0].end), (0, 2));
        assert_eq!((segments[1].start, segments[1].end), (2, 3));
        assert!((segments[0].origin - 9.72).abs() < 1e-9);
        assert!((segments[1].origin - 9.18).abs() < 1e-9);
        assert!(segments[0].interval.is_valid());
    }

    #[test]
    fn test_segments_are_contiguous() {
        let samples: Vec<Sample> = (0..50)
            .map(|t| Sample::new(t, ((t as f64) * 0.7).sin() * 10.0))
            .collect();
        let segments = build_segments(&samples, 0.5);

        assert_eq!(segments.first().map(|s| s.start), Some(0));
        assert_eq!(segments.last().map(|s| s.end), Some(49));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].end > pair[0].start);
        }
    }

    #[test]
    fn test_two_samples_single_segment() {
        let samples = vec![Sample::new(0, 1.0), Sample::new(1, 3.0)];
        let segments = build_segments(&samples, 0.2);

        assert_eq!(segments.len(), 1);
        let s = segments[0];
        assert_eq!((s.start, s.end), (0, 1));
        assert!((s.interval.midpoint() - (3.0 - s.origin)).abs() < 1e-9);
    }
}
