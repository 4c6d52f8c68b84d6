//! Path selection over a [`SegmentTree`]
//!
//! Both objectives return the path a depth-first enumeration with a strict
//! comparison against the running best would return: children are visited
//! in candidate order, and a later path only replaces the best when it is
//! strictly better.

use super::tree::{NodeId, SegmentTree};
use super::SearchConfig;
use crate::grouping;
use crate::segment::OriginBuckets;
use crate::size::SizeModel;
use crate::{Result, Sample};
use rayon::prelude::*;
use tracing::debug;

/// Path with the fewest segments.
///
/// Computed by dynamic programming over suffixes; at every suffix the first
/// child reaching the minimum is kept, which is the path the enumeration
/// would find first.
pub fn fewest_segments_path(tree: &SegmentTree) -> Vec<NodeId> {
    let n = tree.sample_count();
    let mut best: Vec<Option<(usize, NodeId)>> = vec![None; n];

    for start in (0..n.saturating_sub(1)).rev() {
        let mut choice: Option<(usize, NodeId)> = None;
        for &child in tree.suffix(start) {
            let below = if tree.is_leaf(child) {
                Some(0)
            } else {
                best[tree.node(child).end_index].map(|(count, _)| count)
            };

            if let Some(below) = below {
                let total = below + 1;
                if choice.map_or(true, |(count, _)| total < count) {
                    choice = Some((total, child));
                }
            }
        }
        best[start] = choice;
    }

    let mut path = Vec::new();
    let mut start = 0;
    while let Some((_, child)) = best.get(start).copied().flatten() {
        path.push(child);
        if tree.is_leaf(child) {
            break;
        }
        start = tree.node(child).end_index;
    }

    debug!(segments = path.len(), "fewest-segments path selected");
    path
}

/// Path whose grouped representation has the highest compression ratio.
///
/// With `config.parallel` set, prefixes of the enumeration are searched on
/// the rayon pool and reduced in enumeration order, so the result is the
/// same as the sequential one.
pub fn most_compressible_path(
    tree: &SegmentTree,
    samples: &[Sample],
    size_model: &SizeModel,
    config: &SearchConfig,
) -> Result<Vec<NodeId>> {
    let scorer = Scorer {
        tree,
        samples,
        size_model,
        config,
    };

    let depth = if config.parallel {
        crate::config::PARALLEL_SEARCH_DEPTH
    } else {
        1
    };
    let prefixes = prefixes(tree, depth);

    let results: Vec<(usize, Option<Candidate>)> = if config.parallel {
        prefixes
            .into_par_iter()
            .map(|prefix| scorer.best_from(prefix))
            .collect::<Result<_>>()?
    } else {
        prefixes
            .into_iter()
            .map(|prefix| scorer.best_from(prefix))
            .collect::<Result<_>>()?
    };

    let mut evaluated = 0usize;
    let mut best: Option<Candidate> = None;
    for (count, candidate) in results {
        evaluated += count;
        if let Some(candidate) = candidate {
            if best.as_ref().map_or(true, |b| candidate.ratio > b.ratio) {
                best = Some(candidate);
            }
        }
    }

    let best = best.unwrap_or_default();
    debug!(
        evaluated,
        ratio = best.ratio,
        segments = best.path.len(),
        parallel = config.parallel,
        "most-compressible path selected"
    );
    Ok(best.path)
}

#[derive(Debug, Clone, Default)]
struct Candidate {
    ratio: f64,
    path: Vec<NodeId>,
}

struct Scorer<'a> {
    tree: &'a SegmentTree,
    samples: &'a [Sample],
    size_model: &'a SizeModel,
    config: &'a SearchConfig,
}

impl Scorer<'_> {
    fn ratio(&self, path: &[NodeId]) -> f64 {
        let buckets = OriginBuckets::from_segments(self.tree.segments(path));
        let series = grouping::merge(buckets);
        self.size_model.compression_ratio(self.samples, &series)
    }

    /// Best path among those starting with `prefix`, and how many were scored
    fn best_from(&self, prefix: Vec<NodeId>) -> Result<(usize, Option<Candidate>)> {
        let mut evaluated = 0usize;
        let mut best: Option<Candidate> = None;

        let mut path = prefix;
        let Some(last) = path.pop() else {
            return Ok((0, None));
        };
        let mut stack = vec![(last, path.len())];

        while let Some((id, depth)) = stack.pop() {
            path.truncate(depth);
            path.push(id);

            if self.tree.is_leaf(id) {
                self.config.check_cancelled()?;
                evaluated += 1;

                let ratio = self.ratio(&path);
                if best.as_ref().map_or(true, |b| ratio > b.ratio) {
                    best = Some(Candidate {
                        ratio,
                        path: path.clone(),
                    });
                }
                continue;
            }

            for &child in self.tree.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        Ok((evaluated, best))
    }
}

/// Enumeration prefixes of up to `depth` nodes, in depth-first order
fn prefixes(tree: &SegmentTree, depth: usize) -> Vec<Vec<NodeId>> {
    let mut frontier: Vec<Vec<NodeId>> = tree.roots().iter().map(|&id| vec![id]).collect();

    for _ in 1..depth {
        frontier = frontier
            .into_iter()
            .flat_map(|prefix| match prefix.last().copied() {
                Some(last) if !tree.is_leaf(last) => tree
                    .children(last)
                    .iter()
                    .map(|&child| {
                        let mut next = prefix.clone();
                        next.push(child);
                        next
                    })
                    .collect::<Vec<_>>(),
                _ => vec![prefix],
            })
            .collect();
    }

    frontier
}
