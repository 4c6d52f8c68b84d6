//! JSON-lines result rows

use serde::{Deserialize, Serialize};
use std::io::Write;

/// Outcome of compressing one window with one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub algorithm: String,
    pub window: usize,
    pub samples: usize,
    pub epsilon: f64,
    pub segments: usize,
    /// Ratio under the fixed-width size model
    pub ratio: f64,
    /// Length of the framed block
    pub encoded_bytes: usize,
    /// Largest reconstruction error at the original timestamps
    pub max_deviation: f64,
    pub elapsed_micros: u64,
}

/// Writes one JSON object per line
pub struct RowWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, row: &ResultRow) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, row)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of rows written
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> anyhow::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
