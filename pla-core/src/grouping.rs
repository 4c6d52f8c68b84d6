//! Phase 2: merging phase-1 segments into the output categories
//!
//! A single sweep primitive is applied twice. The first pass runs inside
//! every origin bucket and produces [`GroupedSegment`]s; the segments left
//! alone there are pooled, origin ignored, and swept again into
//! [`HalfGroupedSegment`]s and [`UngroupedSegment`]s.

use crate::segment::OriginBuckets;
use crate::{
    CompressedSeries, GradientInterval, GroupedSegment, HalfGroupedSegment, Timestamp,
    UngroupedSegment,
};
use tracing::debug;

/// Members whose gradient intervals all share at least one slope
#[derive(Debug, Clone)]
pub(crate) struct Run<T> {
    pub interval: GradientInterval,
    pub members: Vec<T>,
}

impl<T> Run<T> {
    fn start(member: T, interval: GradientInterval) -> Self {
        Self {
            interval,
            members: vec![member],
        }
    }
}

/// Group under construction during a sweep
enum SweepState<T> {
    Empty,
    Accumulating(Run<T>),
}

impl<T> SweepState<T> {
    fn feed(self, member: T, interval: GradientInterval, finalized: &mut Vec<Run<T>>) -> Self {
        match self {
            SweepState::Empty => SweepState::Accumulating(Run::start(member, interval)),
            SweepState::Accumulating(mut run) => {
                if run.interval.overlaps(&interval) {
                    run.interval = run.interval.intersect(&interval);
                    run.members.push(member);
                    SweepState::Accumulating(run)
                } else {
                    finalized.push(run);
                    SweepState::Accumulating(Run::start(member, interval))
                }
            }
        }
    }

    fn finish(self, finalized: &mut Vec<Run<T>>) {
        if let SweepState::Accumulating(run) = self {
            finalized.push(run);
        }
    }
}

/// Sort by lower gradient (stable) and merge overlapping neighbours
pub(crate) fn sweep<T>(
    mut members: Vec<T>,
    interval_of: impl Fn(&T) -> GradientInterval,
) -> Vec<Run<T>> {
    members.sort_by(|a, b| interval_of(a).lower.total_cmp(&interval_of(b).lower));

    let mut finalized = Vec::new();
    let mut state = SweepState::Empty;
    for member in members {
        let interval = interval_of(&member);
        state = state.feed(member, interval, &mut finalized);
    }
    state.finish(&mut finalized);

    finalized
}

/// A segment reduced to what phase 2 keeps
#[derive(Debug, Clone, Copy)]
struct Member {
    origin: f64,
    start: Timestamp,
    interval: GradientInterval,
}

fn members_of(buckets: OriginBuckets) -> Vec<(f64, Vec<Member>)> {
    buckets
        .into_buckets()
        .into_iter()
        .map(|(origin, segments)| {
            let members = segments
                .into_iter()
                .map(|s| Member {
                    origin,
                    start: s.start,
                    interval: s.interval,
                })
                .collect();
            (origin, members)
        })
        .collect()
}

fn grouped(origin: f64, run: Run<Member>) -> GroupedSegment {
    let mut timestamps: Vec<Timestamp> = run.members.iter().map(|m| m.start).collect();
    timestamps.sort_unstable();
    GroupedSegment {
        origin,
        interval: run.interval,
        timestamps,
    }
}

/// Sim-Piece grouping: every run becomes a [`GroupedSegment`], singletons included
pub fn group_by_origin(buckets: OriginBuckets) -> Vec<GroupedSegment> {
    let mut groups = Vec::new();
    for (origin, members) in members_of(buckets) {
        for run in sweep(members, |m| m.interval) {
            groups.push(grouped(origin, run));
        }
    }

    debug!(groups = groups.len(), "origin grouping complete");
    groups
}

/// Mix-Piece grouping into grouped, half-grouped and ungrouped segments
pub fn group_segments(buckets: OriginBuckets) -> CompressedSeries {
    let series = merge(buckets);
    debug!(
        grouped = series.grouped.len(),
        half_grouped = series.half_grouped.len(),
        ungrouped = series.ungrouped.len(),
        "segment grouping complete"
    );
    series
}

/// [`group_segments`] without logging, for scoring candidate paths
pub(crate) fn merge(buckets: OriginBuckets) -> CompressedSeries {
    let mut series = CompressedSeries::default();
    let mut leftovers = Vec::new();

    for (origin, members) in members_of(buckets) {
        for mut run in sweep(members, |m| m.interval) {
            if run.members.len() >= 2 {
                series.grouped.push(grouped(origin, run));
            } else if let Some(member) = run.members.pop() {
                // A lone member keeps its own interval
                leftovers.push(Member {
                    interval: run.interval,
                    ..member
                });
            }
        }
    }

    for mut run in sweep(leftovers, |m| m.interval) {
        if run.members.len() >= 2 {
            let mut pairs: Vec<(f64, Timestamp)> =
                run.members.iter().map(|m| (m.origin, m.start)).collect();
            pairs.sort_by_key(|&(_, t)| t);
            series.half_grouped.push(HalfGroupedSegment {
                interval: run.interval,
                pairs,
            });
        } else if let Some(member) = run.members.pop() {
            series.ungrouped.push(UngroupedSegment {
                interval: run.interval,
                origin: member.origin,
                timestamp: member.start,
            });
        }
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    fn seg(origin: f64, start: i64, lower: f64, upper: f64) -> Segment {
        Segment {
            origin,
            interval: GradientInterval::new(lower, upper),
            start,
            end: start + 1,
            kind: None,
        }
    }

    #[test]
    fn test_sweep_merges_overlaps() {
        let runs = sweep(
            vec![
                GradientInterval::new(2.0, 3.0),
                GradientInterval::new(0.0, 1.0),
                GradientInterval::new(0.5, 2.5),
                GradientInterval::new(2.6, 4.0),
            ],
            |i| *i,
        );

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].members.len(), 2);
        assert_eq!(runs[0].interval, GradientInterval::new(0.5, 1.0));
        assert_eq!(runs[1].members.len(), 2);
        assert_eq!(runs[1].interval, GradientInterval::new(2.6, 3.0));
    }

    #[test]
    fn test_sweep_is_stable_on_equal_lower_bounds() {
        let runs = sweep(vec![(1, 0.0), (2, 0.0), (3, 0.0)], |&(_, l)| {
            GradientInterval::new(l, l + 1.0)
        });
        let ids: Vec<_> = runs[0].members.iter().map(|m| m.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_group_by_origin_keeps_singletons() {
        let buckets = OriginBuckets::from_segments(vec![
            seg(1.0, 0, 0.0, 1.0),
            seg(1.0, 4, 0.5, 2.0),
            seg(1.0, 8, 5.0, 6.0),
            seg(2.0, 2, 0.0, 1.0),
        ]);
        let groups = group_by_origin(buckets);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].timestamps, vec![0, 4]);
        assert_eq!(groups[0].interval, GradientInterval::new(0.5, 1.0));
        assert_eq!(groups[1].timestamps, vec![8]);
        assert_eq!(groups[2].origin, 2.0);
    }

    #[test]
    fn test_three_categories() {
        let buckets = OriginBuckets::from_segments(vec![
            // shares origin and gradient
            seg(1.0, 6, 0.0, 1.0),
            seg(1.0, 0, 0.2, 0.8),
            // alone in its bucket, but gradient matches the origin-3 segment
            seg(2.0, 2, 3.0, 4.0),
            seg(3.0, 4, 3.5, 5.0),
            // nothing to merge with
            seg(4.0, 8, -9.0, -8.0),
        ]);
        let series = group_segments(buckets);

        assert_eq!(series.grouped.len(), 1);
        assert_eq!(series.grouped[0].timestamps, vec![0, 6]);
        assert_eq!(series.grouped[0].interval, GradientInterval::new(0.2, 0.8));

        assert_eq!(series.half_grouped.len(), 1);
        assert_eq!(series.half_grouped[0].pairs, vec![(2.0, 2), (3.0, 4)]);
        assert_eq!(series.half_grouped[0].interval, GradientInterval::new(3.5, 4.0));

        assert_eq!(series.ungrouped.len(), 1);
        assert_eq!(series.ungrouped[0].timestamp, 8);
        assert_eq!(series.ungrouped[0].gradient(), -8.5);
        assert_eq!(series.segment_count(), 5);
    }

    #[test]
    fn test_emitted_groups_do_not_overlap() {
        let mut segments = Vec::new();
        for i in 0..60i64 {
            let origin = (i % 4) as f64;
            let lower = ((i * 37) % 11) as f64 * 0.3;
            segments.push(seg(origin, i * 2, lower, lower + 0.4));
        }
        let series = group_segments(OriginBuckets::from_segments(segments));

        for (i, a) in series.grouped.iter().enumerate() {
            for b in series.grouped.iter().skip(i + 1) {
                if a.origin == b.origin {
                    assert!(!a.interval.overlaps(&b.interval));
                }
            }
        }

        let loose: Vec<GradientInterval> = series
            .half_grouped
            .iter()
            .map(|h| h.interval)
            .chain(series.ungrouped.iter().map(|u| u.interval))
            .collect();
        for (i, a) in loose.iter().enumerate() {
            for b in loose.iter().skip(i + 1) {
                assert!(!a.overlaps(b));
            }
        }
        assert_eq!(series.segment_count(), 60);
    }
}
