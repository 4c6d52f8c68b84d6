//! Delimited sample file reader

use crate::cli::TimestampMode;
use chrono::DateTime;
use pla_core::{PlaError, Result, Sample, SampleSource, Timestamp};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Reads `timestamp,value` records, one per line.
///
/// Blank lines and `#` comments are skipped, as is a header on the first
/// record when its value column is not numeric. In [`TimestampMode::Index`]
/// a line may hold the value alone.
pub struct DelimitedReader<R> {
    lines: Lines<R>,
    mode: TimestampMode,
    line_no: usize,
    records: usize,
    rows: i64,
}

impl DelimitedReader<BufReader<File>> {
    /// Open a file
    pub fn open(path: &Path, mode: TimestampMode) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), mode))
    }
}

impl<R: BufRead> DelimitedReader<R> {
    pub fn new(reader: R, mode: TimestampMode) -> Self {
        Self {
            lines: reader.lines(),
            mode,
            line_no: 0,
            records: 0,
            rows: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<Option<Sample>> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let raw_value = fields.last().copied().unwrap_or_default();

        let value = match raw_value.parse::<f64>() {
            Ok(value) => value,
            Err(_) if self.records == 1 => return Ok(None),
            Err(_) => {
                return Err(self.error(format!("invalid value '{}'", raw_value)));
            }
        };

        let timestamp = match self.mode {
            TimestampMode::Index => self.rows,
            TimestampMode::Unix => {
                let raw = self.timestamp_field(&fields)?;
                raw.parse::<Timestamp>()
                    .map_err(|_| self.error(format!("invalid unix timestamp '{}'", raw)))?
            }
            TimestampMode::Rfc3339 => {
                let raw = self.timestamp_field(&fields)?;
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| self.error(format!("invalid RFC 3339 timestamp '{}': {}", raw, e)))?
                    .timestamp()
            }
        };

        Ok(Some(Sample::new(timestamp, value)))
    }

    fn timestamp_field<'a>(&self, fields: &[&'a str]) -> Result<&'a str> {
        if fields.len() < 2 {
            return Err(self.error("missing timestamp column".to_string()));
        }
        Ok(fields[0])
    }

    fn error(&self, msg: String) -> PlaError {
        PlaError::InvalidInput(format!("line {}: {}", self.line_no, msg))
    }
}

impl<R: BufRead> SampleSource for DelimitedReader<R> {
    fn read_samples(&mut self, limit: Option<usize>) -> Result<Vec<Sample>> {
        let mut samples = Vec::new();

        while limit.map_or(true, |l| samples.len() < l) {
            let Some(line) = self.lines.next() else {
                break;
            };
            let line = line?;
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.records += 1;

            if let Some(sample) = self.parse_line(trimmed)? {
                samples.push(sample);
                self.rows += 1;
            }
        }

        Ok(samples)
    }
}
