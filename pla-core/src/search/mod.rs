//! Exhaustive segment-path search (Custom-Piece, Buffered-Piece)
//!
//! Phase 1 is replaced by a search over every way of cutting the series
//! into error-bounded segments:
//!
//! - [`tree`]: builds the deduplicated tree of candidate segments
//! - [`select`]: picks one root-to-leaf path under an [`Objective`]
//!
//! The number of paths grows exponentially with the series length, so every
//! search is guarded by a path budget and can be cancelled from another
//! thread.

pub mod select;
pub mod tree;

pub use select::{fewest_segments_path, most_compressible_path};
pub use tree::{NodeId, SegmentTree, TreeNode};

use crate::size::SizeModel;
use crate::{PlaError, Result, Sample, Segment};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// How candidate segments are cut from an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    /// One candidate per origin, extended as far as the bound tracker allows
    #[default]
    Maximal,
    /// One candidate for every prefix the bound tracker accepts
    EveryPrefix,
}

/// Which quantized origins are tried at every anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginPolicy {
    Floor,
    FloorAndCeiling,
}

/// Path selection objective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Fewest segments
    FewestSegments,
    /// Highest compression ratio after grouping
    BestRatio,
}

/// Shared flag polled by a running search
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every search holding a clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Path search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How candidates are cut (Custom-Piece only; Buffered-Piece always
    /// uses [`SplitPolicy::EveryPrefix`])
    pub split_policy: SplitPolicy,
    /// Refuse ratio searches over more root-to-leaf paths than this
    pub max_paths: Option<u128>,
    /// Fan the ratio search out over the rayon pool
    pub parallel: bool,
    /// Cooperative cancellation
    pub cancellation: Option<CancellationToken>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            split_policy: SplitPolicy::Maximal,
            max_paths: Some(crate::config::MAX_SEARCH_PATHS),
            parallel: false,
            cancellation: None,
        }
    }
}

impl SearchConfig {
    /// Set the split policy
    pub fn with_split_policy(mut self, policy: SplitPolicy) -> Self {
        self.split_policy = policy;
        self
    }

    /// Set the path budget (`None` disables it)
    pub fn with_max_paths(mut self, max_paths: Option<u128>) -> Self {
        self.max_paths = max_paths;
        self
    }

    /// Enable or disable the parallel ratio search
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(PlaError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Build the candidate tree and return the segments of the selected path.
///
/// `samples` must hold at least two strictly ordered samples.
pub fn search(
    samples: &[Sample],
    epsilon: f64,
    split: SplitPolicy,
    origins: OriginPolicy,
    objective: Objective,
    config: &SearchConfig,
    size_model: &SizeModel,
) -> Result<Vec<Segment>> {
    let result = select_segments(samples, epsilon, split, origins, objective, config, size_model);
    if let Err(PlaError::Cancelled) = &result {
        warn!("path search cancelled");
    }
    result
}

fn select_segments(
    samples: &[Sample],
    epsilon: f64,
    split: SplitPolicy,
    origins: OriginPolicy,
    objective: Objective,
    config: &SearchConfig,
    size_model: &SizeModel,
) -> Result<Vec<Segment>> {
    let tree = SegmentTree::build(samples, epsilon, split, origins, config)?;
    let paths = tree.path_count();

    debug!(
        nodes = tree.node_count(),
        paths = paths as f64,
        ?split,
        ?origins,
        "segment tree built"
    );

    // Only the ratio objective enumerates paths
    if let (Objective::BestRatio, Some(limit)) = (objective, config.max_paths) {
        if paths > limit {
            warn!(paths = paths as f64, limit = limit as f64, "path search refused");
            return Err(PlaError::SearchTooLarge { paths, limit });
        }
    }

    let path = match objective {
        Objective::FewestSegments => fewest_segments_path(&tree),
        Objective::BestRatio => most_compressible_path(&tree, samples, size_model, config)?,
    };

    Ok(tree.segments(&path))
}
