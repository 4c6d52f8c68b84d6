//! Command-line argument parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use pla_core::{Algorithm, CompressionConfig, SearchConfig, SplitPolicy};
use std::path::PathBuf;

/// pla: error-bounded piecewise linear compression of time series
#[derive(Parser, Debug)]
#[command(name = "pla")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log at debug level (overridden by PLA_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a sample file into framed blocks
    Compress {
        /// Delimited `timestamp,value` input
        input: PathBuf,

        /// Output file for the encoded blocks
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: CompressionArgs,

        /// Variant to run
        #[arg(short, long, default_value_t = Algorithm::MixPiece)]
        algorithm: Algorithm,
    },

    /// Reconstruct samples from an encoded file
    Decompress {
        /// File written by `pla compress`
        input: PathBuf,

        /// Output CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compress, reconstruct and report one JSON row per variant and window
    Evaluate {
        /// Delimited `timestamp,value` input
        input: PathBuf,

        /// Output file for the rows (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: CompressionArgs,

        /// Variants to run (all when omitted)
        #[arg(short, long)]
        algorithm: Vec<Algorithm>,
    },
}

/// Options shared by the compressing commands
#[derive(Args, Debug, Clone)]
pub struct CompressionArgs {
    /// Error bound as a percentage of each window's value range
    #[arg(short, long, default_value_t = 1.0)]
    pub epsilon: f64,

    /// Samples per independently compressed window (whole file when omitted)
    #[arg(short, long)]
    pub window: Option<usize>,

    /// How the first column is interpreted
    #[arg(short, long, value_enum, default_value_t = TimestampMode::Index)]
    pub timestamps: TimestampMode,

    /// Path budget of the most-compressible search (0 disables it)
    #[arg(long, default_value_t = pla_core::config::MAX_SEARCH_PATHS)]
    pub max_paths: u128,

    /// Try every accepted prefix instead of maximal candidates in Custom-Piece
    #[arg(long)]
    pub every_prefix: bool,

    /// Run the most-compressible search on the rayon pool
    #[arg(long)]
    pub parallel: bool,
}

impl CompressionArgs {
    /// Core configuration for one variant
    pub fn config(&self, algorithm: Algorithm) -> CompressionConfig {
        let split_policy = if self.every_prefix {
            SplitPolicy::EveryPrefix
        } else {
            SplitPolicy::Maximal
        };
        let max_paths = (self.max_paths > 0).then_some(self.max_paths);

        CompressionConfig::new(algorithm, self.epsilon).with_search(
            SearchConfig::default()
                .with_split_policy(split_policy)
                .with_max_paths(max_paths)
                .with_parallel(self.parallel),
        )
    }
}

/// Interpretation of the timestamp column
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum TimestampMode {
    /// Ignore the column and number rows from 0
    #[default]
    Index,
    /// Integer Unix seconds
    Unix,
    /// RFC 3339 date-times, converted to Unix seconds
    Rfc3339,
}
