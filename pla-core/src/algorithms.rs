//! Compression entry points
//!
//! Every variant validates its input, derives epsilon from the requested
//! percentage of the value range, runs phase 1 (greedy or searched
//! segments) and phase 2 (grouping).

use crate::codec::CompressedBlock;
use crate::grouping::{group_by_origin, group_segments};
use crate::quantize::epsilon_for;
use crate::search::{self, Objective, OriginPolicy, SearchConfig, SplitPolicy};
use crate::segment::{mix, sim, OriginBuckets};
use crate::size::SizeModel;
use crate::{CompressedSeries, GroupedSegment, PlaError, Result, Sample};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::info;

/// Compression variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Algorithm {
    /// Greedy, floor-quantized origins
    SimPiece = 1,
    /// Greedy, floor and ceiling origins raced per anchor
    MixPiece = 2,
    /// Searched, fewest segments
    CustomPieceLongest = 3,
    /// Searched, best compression ratio
    CustomPieceMostCompressible = 4,
    /// Searched over every prefix, fewest segments
    BufferedPiece = 5,
}

impl Algorithm {
    /// All variants, in tag order
    pub const ALL: [Algorithm; 5] = [
        Algorithm::SimPiece,
        Algorithm::MixPiece,
        Algorithm::CustomPieceLongest,
        Algorithm::CustomPieceMostCompressible,
        Algorithm::BufferedPiece,
    ];

    /// Stable name used on the command line and in result rows
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::SimPiece => "sim-piece",
            Algorithm::MixPiece => "mix-piece",
            Algorithm::CustomPieceLongest => "custom-piece-longest",
            Algorithm::CustomPieceMostCompressible => "custom-piece-most-compressible",
            Algorithm::BufferedPiece => "buffered-piece",
        }
    }

    /// Check if the variant runs the exhaustive path search
    pub fn is_search(&self) -> bool {
        matches!(
            self,
            Algorithm::CustomPieceLongest
                | Algorithm::CustomPieceMostCompressible
                | Algorithm::BufferedPiece
        )
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = PlaError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Algorithm::SimPiece),
            2 => Ok(Algorithm::MixPiece),
            3 => Ok(Algorithm::CustomPieceLongest),
            4 => Ok(Algorithm::CustomPieceMostCompressible),
            5 => Ok(Algorithm::BufferedPiece),
            _ => Err(PlaError::InvalidFormat(format!(
                "Invalid algorithm tag: {}",
                value
            ))),
        }
    }
}

impl FromStr for Algorithm {
    type Err = PlaError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PlaError::invalid(format!("unknown algorithm: {}", s)))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compression configuration
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Variant to run
    pub algorithm: Algorithm,
    /// Error bound as a percentage of the value range
    pub epsilon_percentage: f64,
    /// Path search settings (search variants only)
    pub search: SearchConfig,
    /// Cost model for ratio reporting and path scoring
    pub size_model: SizeModel,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::MixPiece,
            epsilon_percentage: 1.0,
            search: SearchConfig::default(),
            size_model: SizeModel::default(),
        }
    }
}

impl CompressionConfig {
    /// Create a config for a variant and error bound
    pub fn new(algorithm: Algorithm, epsilon_percentage: f64) -> Self {
        Self {
            algorithm,
            epsilon_percentage,
            ..Default::default()
        }
    }

    /// Set the path search settings
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Set the cost model
    pub fn with_size_model(mut self, size_model: SizeModel) -> Self {
        self.size_model = size_model;
        self
    }
}

/// Check the arguments shared by every entry point and derive epsilon
fn validate(samples: &[Sample], epsilon_percentage: f64) -> Result<f64> {
    if samples.len() < 2 {
        return Err(PlaError::invalid(format!(
            "at least 2 samples required, got {}",
            samples.len()
        )));
    }
    if !epsilon_percentage.is_finite() || epsilon_percentage <= 0.0 {
        return Err(PlaError::invalid(format!(
            "epsilon percentage must be positive, got {}",
            epsilon_percentage
        )));
    }
    if let Some(bad) = samples.iter().find(|s| !s.value.is_finite()) {
        return Err(PlaError::invalid(format!(
            "non-finite value {} at timestamp {}",
            bad.value, bad.timestamp
        )));
    }
    if let Some(pair) = samples
        .windows(2)
        .find(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        return Err(PlaError::invalid(format!(
            "timestamps must be strictly increasing: {} follows {}",
            pair[1].timestamp, pair[0].timestamp
        )));
    }

    let epsilon = epsilon_for(samples, epsilon_percentage);
    let magnitude = samples.iter().fold(0.0f64, |m, s| m.max(s.value.abs()));

    // Bound tracking computes `value - origin ± epsilon`; keep it finite
    if !epsilon.is_finite() || !(2.0 * (magnitude + epsilon)).is_finite() {
        return Err(PlaError::invalid(format!(
            "epsilon {} overflows for values up to {}",
            epsilon, magnitude
        )));
    }
    if epsilon > 0.0 && !(magnitude / epsilon).is_finite() {
        return Err(PlaError::invalid(format!(
            "epsilon {} is too small to quantize values up to {}",
            epsilon, magnitude
        )));
    }

    Ok(epsilon)
}

/// Sim-Piece: greedy floor-origin segments grouped by origin
pub fn compress_sim_piece(
    samples: &[Sample],
    epsilon_percentage: f64,
) -> Result<Vec<GroupedSegment>> {
    let epsilon = validate(samples, epsilon_percentage)?;
    Ok(sim_piece(samples, epsilon))
}

/// Mix-Piece: greedy floor/ceiling segments, three output categories
pub fn compress_mix_piece(samples: &[Sample], epsilon_percentage: f64) -> Result<CompressedSeries> {
    let epsilon = validate(samples, epsilon_percentage)?;
    Ok(mix_piece(samples, epsilon))
}

/// Custom-Piece choosing the path with the fewest segments
pub fn compress_custom_piece_longest(
    samples: &[Sample],
    epsilon_percentage: f64,
) -> Result<CompressedSeries> {
    compress(
        samples,
        &CompressionConfig::new(Algorithm::CustomPieceLongest, epsilon_percentage),
    )
}

/// Custom-Piece choosing the path with the best compression ratio
pub fn compress_custom_piece_most_compressible(
    samples: &[Sample],
    epsilon_percentage: f64,
) -> Result<CompressedSeries> {
    compress(
        samples,
        &CompressionConfig::new(Algorithm::CustomPieceMostCompressible, epsilon_percentage),
    )
}

/// Buffered-Piece: fewest segments over every accepted prefix, floor origins
pub fn compress_buffered_piece(
    samples: &[Sample],
    epsilon_percentage: f64,
) -> Result<CompressedSeries> {
    compress(
        samples,
        &CompressionConfig::new(Algorithm::BufferedPiece, epsilon_percentage),
    )
}

/// Run the configured variant
pub fn compress(samples: &[Sample], config: &CompressionConfig) -> Result<CompressedSeries> {
    let epsilon = validate(samples, config.epsilon_percentage)?;
    run(samples, epsilon, config)
}

fn run(samples: &[Sample], epsilon: f64, config: &CompressionConfig) -> Result<CompressedSeries> {
    let searched = |split, origins, objective| -> Result<CompressedSeries> {
        let segments = search::search(
            samples,
            epsilon,
            split,
            origins,
            objective,
            &config.search,
            &config.size_model,
        )?;
        Ok(group_segments(OriginBuckets::from_segments(segments)))
    };

    match config.algorithm {
        Algorithm::SimPiece => Ok(CompressedSeries::from(sim_piece(samples, epsilon))),
        Algorithm::MixPiece => Ok(mix_piece(samples, epsilon)),
        Algorithm::CustomPieceLongest => searched(
            config.search.split_policy,
            OriginPolicy::FloorAndCeiling,
            Objective::FewestSegments,
        ),
        Algorithm::CustomPieceMostCompressible => searched(
            config.search.split_policy,
            OriginPolicy::FloorAndCeiling,
            Objective::BestRatio,
        ),
        Algorithm::BufferedPiece => searched(
            SplitPolicy::EveryPrefix,
            OriginPolicy::Floor,
            Objective::FewestSegments,
        ),
    }
}

fn sim_piece(samples: &[Sample], epsilon: f64) -> Vec<GroupedSegment> {
    let segments = sim::build_segments(samples, epsilon);
    group_by_origin(OriginBuckets::from_segments(segments))
}

fn mix_piece(samples: &[Sample], epsilon: f64) -> CompressedSeries {
    let segments = mix::build_segments(samples, epsilon);
    group_segments(OriginBuckets::from_segments(segments))
}

/// Configured compressor producing self-describing blocks
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: CompressionConfig,
}

impl Compressor {
    /// Create a new compressor
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress one window of samples into a [`CompressedBlock`]
    pub fn compress(&self, samples: &[Sample]) -> Result<CompressedBlock> {
        let started = Instant::now();
        let epsilon = validate(samples, self.config.epsilon_percentage)?;
        let sample_count = u32::try_from(samples.len())
            .map_err(|_| PlaError::invalid(format!("too many samples: {}", samples.len())))?;

        let series = run(samples, epsilon, &self.config)?;
        let ratio = self.config.size_model.compression_ratio(samples, &series);

        let (first_timestamp, last_timestamp) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => return Err(PlaError::invalid("empty sample window")),
        };

        info!(
            algorithm = %self.config.algorithm,
            samples = samples.len(),
            segments = series.segment_count(),
            epsilon,
            ratio,
            elapsed_us = started.elapsed().as_micros() as u64,
            "window compressed"
        );

        Ok(CompressedBlock {
            algorithm: self.config.algorithm,
            epsilon,
            sample_count,
            first_timestamp,
            last_timestamp,
            series,
        })
    }
}
