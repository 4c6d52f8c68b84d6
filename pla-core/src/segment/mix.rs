//! Mix-Piece segment construction

use super::extend_maximal;
use crate::{OriginKind, Sample, Segment};
use tracing::debug;

/// Race a floor and a ceiling candidate from every anchor and keep the one
/// covering more samples (floor wins ties).
pub fn build_segments(samples: &[Sample], epsilon: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut ceilings = 0usize;

    while start + 1 < samples.len() {
        let (floor, floor_end) = extend_maximal(samples, start, epsilon, OriginKind::Floor);
        let (ceiling, ceiling_end) = extend_maximal(samples, start, epsilon, OriginKind::Ceiling);

        let (segment, end) = if floor_end >= ceiling_end {
            (floor, floor_end)
        } else {
            ceilings += 1;
            (ceiling, ceiling_end)
        };

        segments.push(segment);
        start = end;
    }

    debug!(
        segments = segments.len(),
        ceilings,
        epsilon,
        "mix-piece phase 1 complete"
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::sim;

    fn series(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(t, v)| Sample::new(t as i64, *v))
            .collect()
    }

    #[test]
    fn test_ceiling_wins_when_longer() {
        // Floor origin 1.0 loses the plateau at t=3, ceiling origin 2.0 keeps it
        let samples = series(&[1.9, 3.9, 3.9, 3.9]);
        let segments = build_segments(&samples, 1.0);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end, 3);
        assert_eq!(segments[0].kind, Some(OriginKind::Ceiling));
        assert_eq!(segments[0].origin, 2.0);
    }

    #[test]
    fn test_floor_wins_ties() {
        let samples = series(&[1.0, 2.0]);
        let segments = build_segments(&samples, 0.3);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, Some(OriginKind::Floor));
    }

    #[test]
    fn test_covers_series_contiguously() {
        let values: Vec<f64> = (0..200)
            .map(|t| ((t as f64) * 0.21).sin() * 4.0 + ((t as f64) * 0.05).cos())
            .collect();
        let samples = series(&values);

        for epsilon in [0.05, 0.2, 0.8] {
            let mix = build_segments(&samples, epsilon);
            assert_eq!(mix.first().map(|s| s.start), Some(0));
            assert_eq!(mix.last().map(|s| s.end), Some(199));

            // The first segment is never shorter than the floor-only one
            let sim = sim::build_segments(&samples, epsilon);
            assert!(mix[0].end >= sim[0].end);

            for pair in mix.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }
}
