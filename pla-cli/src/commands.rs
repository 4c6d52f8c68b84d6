//! Subcommand implementations

use crate::cli::CompressionArgs;
use crate::reader::DelimitedReader;
use crate::report::{ResultRow, RowWriter};
use anyhow::{bail, Context, Result};
use pla_core::{
    max_deviation, reconstruct_at, Algorithm, CompressedBlock, Compressor, PlaError, Sample,
    SampleSource,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Totals of a `compress` run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressSummary {
    pub windows: usize,
    pub samples: usize,
    pub segments: usize,
    pub encoded_bytes: usize,
}

/// Read the input, split into windows of at least two samples
pub fn load_windows(input: &Path, options: &CompressionArgs) -> Result<Vec<Vec<Sample>>> {
    let mut reader = DelimitedReader::open(input, options.timestamps)
        .with_context(|| format!("failed to open {}", input.display()))?;

    let windows = match options.window {
        Some(size) => reader.read_windows(size)?,
        None => {
            let samples = reader.read_samples(None)?;
            if samples.len() >= 2 {
                vec![samples]
            } else {
                Vec::new()
            }
        }
    };

    if windows.is_empty() {
        bail!("{} holds fewer than 2 samples", input.display());
    }
    Ok(windows)
}

/// Compress every window and write the concatenated blocks to `output`
pub fn compress(
    input: &Path,
    output: &Path,
    algorithm: Algorithm,
    options: &CompressionArgs,
) -> Result<CompressSummary> {
    let windows = load_windows(input, options)?;
    let compressor = Compressor::new(options.config(algorithm));

    let mut summary = CompressSummary::default();
    let mut buf = Vec::new();

    for (index, window) in windows.iter().enumerate() {
        let block = compressor
            .compress(window)
            .with_context(|| format!("window {} failed", index))?;
        let encoded = block.encode()?;

        summary.windows += 1;
        summary.samples += window.len();
        summary.segments += block.series.segment_count();
        summary.encoded_bytes += encoded.len();
        buf.extend_from_slice(&encoded);
    }

    fs::write(output, &buf).with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        algorithm = %algorithm,
        windows = summary.windows,
        samples = summary.samples,
        segments = summary.segments,
        bytes = summary.encoded_bytes,
        "compressed {}",
        input.display()
    );
    Ok(summary)
}

/// Reconstruct every block of `input` as `timestamp,value` lines
pub fn decompress(input: &Path, out: &mut impl Write) -> Result<usize> {
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let blocks = CompressedBlock::decode_all(&data)
        .with_context(|| format!("{} is not a valid block file", input.display()))?;

    let mut written = 0;
    writeln!(out, "timestamp,value")?;
    for block in &blocks {
        for sample in block.decompress()? {
            writeln!(out, "{},{}", sample.timestamp, sample.value)?;
            written += 1;
        }
    }
    out.flush()?;

    info!(blocks = blocks.len(), samples = written, "decompressed {}", input.display());
    Ok(written)
}

/// Compress every window with every requested variant and report one row each
pub fn evaluate<W: Write>(
    input: &Path,
    algorithms: &[Algorithm],
    options: &CompressionArgs,
    rows: &mut RowWriter<W>,
) -> Result<()> {
    let windows = load_windows(input, options)?;
    let algorithms = if algorithms.is_empty() {
        Algorithm::ALL.to_vec()
    } else {
        algorithms.to_vec()
    };

    for algorithm in algorithms {
        let config = options.config(algorithm);
        let size_model = config.size_model;
        let compressor = Compressor::new(config);

        for (index, window) in windows.iter().enumerate() {
            let started = Instant::now();
            let block = match compressor.compress(window) {
                Ok(block) => block,
                Err(e @ PlaError::SearchTooLarge { .. }) => {
                    warn!(algorithm = %algorithm, window = index, "skipped: {}", e);
                    continue;
                }
                Err(e) => return Err(e).with_context(|| format!("window {} failed", index)),
            };
            let elapsed_micros = started.elapsed().as_micros() as u64;

            let encoded = block.encode()?;
            let decoded = CompressedBlock::decode(&encoded)?;
            let timestamps: Vec<_> = window.iter().map(|s| s.timestamp).collect();
            let restored = reconstruct_at(&decoded.series, &timestamps)?;

            rows.write(&ResultRow {
                algorithm: algorithm.name().to_string(),
                window: index,
                samples: window.len(),
                epsilon: block.epsilon,
                segments: block.series.segment_count(),
                ratio: block.compression_ratio(&size_model),
                encoded_bytes: encoded.len(),
                max_deviation: max_deviation(window, &restored),
                elapsed_micros,
            })?;
        }
    }

    info!(rows = rows.written(), "evaluated {}", input.display());
    Ok(())
}
