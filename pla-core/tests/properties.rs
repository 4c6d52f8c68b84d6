//! Cross-variant properties of the compressed output

use pla_core::{
    compress_buffered_piece, compress_custom_piece_longest,
    compress_custom_piece_most_compressible, compress_mix_piece, compress_sim_piece,
    compression_ratio, Algorithm, CompressedBlock, CompressedSeries, CompressionConfig,
    Compressor, GradientInterval, Sample,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noisy_sine(seed: u64, len: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|t| {
            let base = ((t as f64) * 0.15).sin() * 8.0 + ((t as f64) * 0.02).cos() * 3.0;
            Sample::new(t as i64, base + rng.gen_range(-0.5..0.5))
        })
        .collect()
}

fn scenario() -> Vec<Sample> {
    vec![
        Sample::new(0, 10.0),
        Sample::new(1, 10.4),
        Sample::new(2, 9.6),
        Sample::new(3, 15.0),
    ]
}

#[test]
fn test_scenario_sim_piece_splits_before_jump() {
    let groups = compress_sim_piece(&scenario(), 10.0).unwrap();

    let mut starts: Vec<i64> = groups.iter().flat_map(|g| g.timestamps.clone()).collect();
    starts.sort_unstable();
    assert_eq!(starts, vec![0, 2]);
}

#[test]
fn test_sim_piece_ratio_can_drop_when_epsilon_grows() {
    // Range 0.5: 100% puts 1.0 on the grid, 120% floors it to 0.6
    let mut samples = vec![Sample::new(0, 1.0), Sample::new(1, 1.5)];
    samples.extend((2..8).map(|t| Sample::new(t, 1.0)));

    let tight = CompressedSeries::from(compress_sim_piece(&samples, 100.0).unwrap());
    let loose = CompressedSeries::from(compress_sim_piece(&samples, 120.0).unwrap());

    assert_eq!(tight.segment_count(), 1);
    assert_eq!(loose.segment_count(), 2);
    assert_eq!(loose.grouped.len(), 2);
    assert_eq!(compression_ratio(&samples, &tight), 72.0 / 17.0);
    assert_eq!(compression_ratio(&samples, &loose), 72.0 / 34.0);

    // The looser bound still holds on both
    for (pct, series) in [(100.0, &tight), (120.0, &loose)] {
        let restored = pla_core::decompress(series, 7).unwrap();
        let epsilon = pla_core::quantize::epsilon_for(&samples, pct);
        assert!(pla_core::within_bound(&samples, &restored, epsilon));
    }
}

#[test]
fn test_custom_piece_dominates_mix_piece() {
    for seed in 0..6 {
        let samples = noisy_sine(seed, 28);
        for pct in [5.0, 10.0, 20.0] {
            let mix = compress_mix_piece(&samples, pct).unwrap();
            let best = compress_custom_piece_most_compressible(&samples, pct).unwrap();
            let longest = compress_custom_piece_longest(&samples, pct).unwrap();

            assert!(
                compression_ratio(&samples, &best) >= compression_ratio(&samples, &mix),
                "seed={} pct={}",
                seed,
                pct
            );
            assert!(longest.segment_count() <= mix.segment_count());
        }
    }
}

#[test]
fn test_buffered_piece_never_needs_more_segments_than_sim_piece() {
    for seed in 0..6 {
        let samples = noisy_sine(seed, 120);
        for pct in [2.0, 10.0] {
            let sim = CompressedSeries::from(compress_sim_piece(&samples, pct).unwrap());
            let buffered = compress_buffered_piece(&samples, pct).unwrap();
            assert!(buffered.segment_count() <= sim.segment_count());
        }
    }
}

#[test]
fn test_ratio_positive_for_every_variant() {
    let samples = noisy_sine(11, 24);
    for algorithm in Algorithm::ALL {
        let block = Compressor::new(CompressionConfig::new(algorithm, 5.0))
            .compress(&samples)
            .unwrap();
        assert!(
            compression_ratio(&samples, &block.series) > 0.0,
            "{}",
            algorithm
        );
    }
}

#[test]
fn test_emitted_groups_are_maximally_merged() {
    fn disjoint(intervals: &[GradientInterval]) -> bool {
        intervals
            .iter()
            .enumerate()
            .all(|(i, a)| intervals[i + 1..].iter().all(|b| !a.overlaps(b)))
    }

    for seed in 0..4 {
        let samples = noisy_sine(seed, 400);
        let series = compress_mix_piece(&samples, 3.0).unwrap();

        let mut by_origin: Vec<(f64, Vec<GradientInterval>)> = Vec::new();
        for group in &series.grouped {
            assert!(group.timestamps.len() >= 2);
            match by_origin.iter_mut().find(|(o, _)| *o == group.origin) {
                Some((_, intervals)) => intervals.push(group.interval),
                None => by_origin.push((group.origin, vec![group.interval])),
            }
        }
        for (_, intervals) in &by_origin {
            assert!(disjoint(intervals));
        }

        let loose: Vec<GradientInterval> = series
            .half_grouped
            .iter()
            .map(|h| {
                assert!(h.pairs.len() >= 2);
                h.interval
            })
            .chain(series.ungrouped.iter().map(|u| u.interval))
            .collect();
        assert!(disjoint(&loose));
    }
}

#[test]
fn test_block_survives_framing() {
    let samples = noisy_sine(5, 200);
    let compressor = Compressor::new(CompressionConfig::new(Algorithm::BufferedPiece, 4.0));
    let block = compressor.compress(&samples).unwrap();

    let decoded = CompressedBlock::decode(&block.encode().unwrap()).unwrap();
    assert_eq!(decoded, block);

    let restored = decoded.decompress().unwrap();
    assert_eq!(restored.len(), samples.len());
    assert!(pla_core::within_bound(&samples, &restored, block.epsilon));
}
