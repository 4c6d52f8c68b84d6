//! Origin quantization and epsilon derivation

use crate::{OriginKind, Sample};

/// Snap `value` down to the epsilon grid.
///
/// A zero epsilon only occurs for a constant series; the value is returned
/// unchanged so it stands in for its own grid point.
#[inline]
pub fn floor_quantize(value: f64, epsilon: f64) -> f64 {
    if epsilon == 0.0 {
        return value;
    }
    (value / epsilon).floor() * epsilon
}

/// Snap `value` up to the epsilon grid
#[inline]
pub fn ceil_quantize(value: f64, epsilon: f64) -> f64 {
    if epsilon == 0.0 {
        return value;
    }
    (value / epsilon).ceil() * epsilon
}

/// Quantize according to the origin kind
#[inline]
pub fn quantize(value: f64, epsilon: f64, kind: OriginKind) -> f64 {
    match kind {
        OriginKind::Floor => floor_quantize(value, epsilon),
        OriginKind::Ceiling => ceil_quantize(value, epsilon),
    }
}

/// Error bound for a series: `percentage` of the global value range
pub fn epsilon_for(samples: &[Sample], percentage: f64) -> f64 {
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
            (min.min(s.value), max.max(s.value))
        });

    if min > max {
        return 0.0;
    }

    let scale = percentage / 100.0;
    let range = max - min;
    if range.is_finite() {
        range * scale
    } else {
        // Range exceeds f64::MAX; scale both ends first
        max * scale - min * scale
    }
}
