//! Decompression of the three output categories

use crate::types::elapsed;
use crate::{CompressedSeries, PlaError, Result, Sample, Timestamp};

/// One reconstructed segment: origin and representative gradient at its start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStart {
    /// Start timestamp of the segment
    pub timestamp: Timestamp,
    /// Quantized value at `timestamp`
    pub origin: f64,
    /// Slope used for every timestamp the segment covers
    pub gradient: f64,
}

impl SegmentStart {
    #[inline]
    fn value_at(&self, timestamp: Timestamp) -> f64 {
        self.gradient * elapsed(self.timestamp, timestamp) + self.origin
    }
}

/// Flatten all categories into segment starts sorted by timestamp
pub fn segment_starts(series: &CompressedSeries) -> Vec<SegmentStart> {
    let mut starts = Vec::with_capacity(series.segment_count());

    for group in &series.grouped {
        let gradient = group.gradient();
        starts.extend(group.timestamps.iter().map(|&timestamp| SegmentStart {
            timestamp,
            origin: group.origin,
            gradient,
        }));
    }

    for group in &series.half_grouped {
        let gradient = group.gradient();
        starts.extend(group.pairs.iter().map(|&(origin, timestamp)| SegmentStart {
            timestamp,
            origin,
            gradient,
        }));
    }

    starts.extend(series.ungrouped.iter().map(|u| SegmentStart {
        timestamp: u.timestamp,
        origin: u.origin,
        gradient: u.gradient(),
    }));

    starts.sort_by_key(|s| s.timestamp);
    starts
}

/// Reconstruct one sample per integer timestamp from the first segment start
/// through `final_timestamp`.
///
/// A segment covers `(start, next start]`; the last one runs to
/// `final_timestamp`. The first timestamp takes the first origin.
pub fn decompress(series: &CompressedSeries, final_timestamp: Timestamp) -> Result<Vec<Sample>> {
    let starts = segment_starts(series);
    let (first, last) = match (starts.first(), starts.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(PlaError::invalid("compressed series holds no segments")),
    };

    if final_timestamp < last.timestamp {
        return Err(PlaError::invalid(format!(
            "final timestamp {} precedes last segment start {}",
            final_timestamp, last.timestamp
        )));
    }

    let span = i128::from(final_timestamp) - i128::from(first.timestamp) + 1;
    let mut samples = Vec::new();
    usize::try_from(span)
        .ok()
        .and_then(|span| samples.try_reserve_exact(span).ok())
        .ok_or_else(|| {
            PlaError::invalid(format!(
                "cannot reconstruct {} timestamps from {} through {}",
                span, first.timestamp, final_timestamp
            ))
        })?;
    samples.push(Sample::new(first.timestamp, first.origin));

    for (i, start) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map_or(final_timestamp, |next| next.timestamp);

        for t in (start.timestamp..=end).skip(1) {
            samples.push(Sample::new(t, start.value_at(t)));
        }
    }

    Ok(samples)
}

/// Evaluate the approximation at the given timestamps.
///
/// Matches [`decompress`] at every timestamp both can produce; timestamps
/// past the last segment start extrapolate the last segment.
pub fn reconstruct_at(series: &CompressedSeries, timestamps: &[Timestamp]) -> Result<Vec<Sample>> {
    let starts = segment_starts(series);
    let first = *starts
        .first()
        .ok_or_else(|| PlaError::invalid("compressed series holds no segments"))?;

    timestamps
        .iter()
        .map(|&t| {
            let owner = starts.partition_point(|s| s.timestamp < t);
            if owner == 0 {
                if t == first.timestamp {
                    return Ok(Sample::new(t, first.origin));
                }
                return Err(PlaError::invalid(format!(
                    "timestamp {} precedes first segment start {}",
                    t, first.timestamp
                )));
            }
            Ok(Sample::new(t, starts[owner - 1].value_at(t)))
        })
        .collect()
}

/// Largest absolute value difference between index-aligned samples
pub fn max_deviation(original: &[Sample], reconstructed: &[Sample]) -> f64 {
    original
        .iter()
        .zip(reconstructed)
        .map(|(o, r)| (o.value - r.value).abs())
        .fold(0.0, f64::max)
}

/// Check that `reconstructed` has the same timestamps as `original` and stays
/// within `epsilon` of it everywhere
pub fn within_bound(original: &[Sample], reconstructed: &[Sample], epsilon: f64) -> bool {
    original.len() == reconstructed.len()
        && original.iter().zip(reconstructed).all(|(o, r)| {
            o.timestamp == r.timestamp
                && (o.value - r.value).abs() <= epsilon + crate::config::BOUND_TOLERANCE
        })
}
