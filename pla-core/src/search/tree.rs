//! Deduplicated tree of candidate segments
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Every sample
//! index that some candidate ends on owns one shared list of candidates
//! anchored there; a node's children are the list of its end index. A memo
//! keyed by `(start index, end index, origin)` drops structurally identical
//! candidates, e.g. floor and ceiling origins that coincide on the grid.

use super::{OriginPolicy, SearchConfig, SplitPolicy};
use crate::bounds::BoundTracker;
use crate::quantize::quantize;
use crate::segment::origin_key;
use crate::{OriginKind, PlaError, Result, Sample, Segment};
use std::collections::HashMap;

/// Index of a node in the tree arena
pub type NodeId = usize;

/// A candidate segment together with the sample indices it spans
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode {
    /// Candidate segment
    pub segment: Segment,
    /// Index of the anchor sample
    pub start_index: usize,
    /// Index of the last covered sample
    pub end_index: usize,
}

/// Arena-backed candidate tree
#[derive(Debug, Clone)]
pub struct SegmentTree {
    nodes: Vec<TreeNode>,
    suffixes: Vec<Option<Vec<NodeId>>>,
    memo: HashMap<(usize, usize, u64), NodeId>,
    last_index: usize,
}

impl SegmentTree {
    /// Build the tree of every candidate reachable from the first sample.
    ///
    /// Construction uses an explicit work-list, so long series cannot
    /// overflow the stack.
    pub fn build(
        samples: &[Sample],
        epsilon: f64,
        split: SplitPolicy,
        origins: OriginPolicy,
        config: &SearchConfig,
    ) -> Result<Self> {
        if samples.len() < 2 {
            return Err(PlaError::invalid(format!(
                "path search needs at least 2 samples, got {}",
                samples.len()
            )));
        }

        let mut tree = Self {
            nodes: Vec::new(),
            suffixes: vec![None; samples.len()],
            memo: HashMap::new(),
            last_index: samples.len() - 1,
        };

        let mut pending = vec![0usize];
        while let Some(start) = pending.pop() {
            if tree.suffixes[start].is_some() {
                continue;
            }
            config.check_cancelled()?;

            let children = tree.expand(samples, start, epsilon, split, origins);
            for &child in &children {
                let end = tree.nodes[child].end_index;
                if end < tree.last_index && tree.suffixes[end].is_none() {
                    pending.push(end);
                }
            }
            tree.suffixes[start] = Some(children);
        }

        Ok(tree)
    }

    fn expand(
        &mut self,
        samples: &[Sample],
        start: usize,
        epsilon: f64,
        split: SplitPolicy,
        origins: OriginPolicy,
    ) -> Vec<NodeId> {
        let kinds: &[OriginKind] = match origins {
            OriginPolicy::Floor => &[OriginKind::Floor],
            OriginPolicy::FloorAndCeiling => &[OriginKind::Floor, OriginKind::Ceiling],
        };
        let tagged = origins == OriginPolicy::FloorAndCeiling;

        let anchor = &samples[start];
        let mut children = Vec::new();

        for &kind in kinds {
            let tag = tagged.then_some(kind);
            let mut tracker =
                BoundTracker::new(anchor, quantize(anchor.value, epsilon, kind), epsilon);
            let mut end = start;

            for sample in &samples[start + 1..] {
                if !tracker.admit(sample) {
                    break;
                }
                end += 1;
                if split == SplitPolicy::EveryPrefix {
                    self.add_child(&mut children, tracker.segment(tag), start, end);
                }
            }

            if split == SplitPolicy::Maximal {
                self.add_child(&mut children, tracker.segment(tag), start, end);
            }
        }

        children
    }

    fn add_child(&mut self, children: &mut Vec<NodeId>, segment: Segment, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let key = (start, end, origin_key(segment.origin));
        if self.memo.contains_key(&key) {
            return;
        }

        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            segment,
            start_index: start,
            end_index: end,
        });
        self.memo.insert(key, id);
        children.push(id);
    }

    /// Candidates anchored at the first sample
    pub fn roots(&self) -> &[NodeId] {
        self.suffix(0)
    }

    /// Candidates anchored at sample index `start`
    pub fn suffix(&self, start: usize) -> &[NodeId] {
        self.suffixes
            .get(start)
            .and_then(|s| s.as_deref())
            .unwrap_or(&[])
    }

    /// Children of a node; empty for leaves
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        if self.is_leaf(id) {
            return &[];
        }
        self.suffix(self.nodes[id].end_index)
    }

    /// Check if a node reaches the last sample
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].end_index == self.last_index
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of samples the tree was built over
    pub fn sample_count(&self) -> usize {
        self.last_index + 1
    }

    /// Number of distinct root-to-leaf paths, saturating at `u128::MAX`
    pub fn path_count(&self) -> u128 {
        let mut counts = vec![0u128; self.sample_count()];

        for start in (0..self.last_index).rev() {
            counts[start] = self.suffix(start).iter().fold(0u128, |acc, &child| {
                let end = self.nodes[child].end_index;
                let below = if end == self.last_index { 1 } else { counts[end] };
                acc.saturating_add(below)
            });
        }

        counts[0]
    }

    /// Segments of a path, in order
    pub fn segments(&self, path: &[NodeId]) -> Vec<Segment> {
        path.iter().map(|&id| self.nodes[id].segment).collect()
    }
}
