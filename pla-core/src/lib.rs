//! PLA Core - Error-Bounded Piecewise Linear Approximation
//!
//! Lossy compression of numeric time series into a small set of line
//! segments such that every reconstructed sample stays within a fixed
//! error bound (epsilon) of the original.
//!
//! # Architecture
//!
//! All variants share two phases:
//!
//! - **Phase 1**: error-bounded segments with quantized origins, built
//!   greedily ([`segment`]) or chosen by an exhaustive path search ([`search`])
//! - **Phase 2**: segments merged into grouped, half-grouped and ungrouped
//!   outputs ([`grouping`])
//!
//! The [`size`] model scores representations, [`reconstruct`] turns them back
//! into samples and [`codec`] frames them for storage or transmission.
//!
//! # Example
//!
//! ```
//! use pla_core::{compress_mix_piece, decompress, Sample};
//!
//! let samples: Vec<Sample> = (0..100)
//!     .map(|t| Sample::new(t, (t as f64 * 0.1).sin()))
//!     .collect();
//!
//! let compressed = compress_mix_piece(&samples, 1.0).unwrap();
//! let restored = decompress(&compressed, 99).unwrap();
//! assert_eq!(restored.len(), samples.len());
//! ```

pub mod algorithms;
pub mod bounds;
pub mod codec;
pub mod grouping;
pub mod quantize;
pub mod reconstruct;
pub mod search;
pub mod segment;
pub mod size;
pub mod source;

mod error;
mod types;

pub use algorithms::{
    compress, compress_buffered_piece, compress_custom_piece_longest,
    compress_custom_piece_most_compressible, compress_mix_piece, compress_sim_piece, Algorithm,
    CompressionConfig, Compressor,
};
pub use codec::CompressedBlock;
pub use error::{PlaError, Result};
pub use reconstruct::{decompress, max_deviation, reconstruct_at, within_bound};
pub use search::{CancellationToken, SearchConfig, SplitPolicy};
pub use size::{compression_ratio, SizeModel};
pub use source::SampleSource;
pub use types::*;

/// PLA core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Encoded timestamp width in bytes (delta encoded)
    pub const TIMESTAMP_WIDTH: usize = 1;

    /// Encoded value width in bytes (f64)
    pub const VALUE_WIDTH: usize = 8;

    /// Maximum root-to-leaf paths a search may enumerate
    pub const MAX_SEARCH_PATHS: u128 = 1 << 20;

    /// Path prefix length fanned out to the rayon pool
    pub const PARALLEL_SEARCH_DEPTH: usize = 2;

    /// Absolute slack for rounding when checking the error bound
    pub const BOUND_TOLERANCE: f64 = 1e-9;
}
