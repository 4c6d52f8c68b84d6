//! Sample sources feeding the compressors

use crate::{Result, Sample};

/// Yields an ordered sequence of samples
pub trait SampleSource {
    /// Read up to `limit` samples, or everything left when `limit` is `None`.
    ///
    /// An empty result means the source is exhausted.
    fn read_samples(&mut self, limit: Option<usize>) -> Result<Vec<Sample>>;

    /// Read the whole source as consecutive windows of `size` samples.
    ///
    /// A trailing window shorter than two samples is dropped, since no
    /// variant can compress it.
    fn read_windows(&mut self, size: usize) -> Result<Vec<Vec<Sample>>> {
        let size = size.max(2);
        let mut windows = Vec::new();
        loop {
            let window = self.read_samples(Some(size))?;
            if window.len() < 2 {
                break;
            }
            let last = window.len() < size;
            windows.push(window);
            if last {
                break;
            }
        }
        Ok(windows)
    }
}

impl SampleSource for Vec<Sample> {
    fn read_samples(&mut self, limit: Option<usize>) -> Result<Vec<Sample>> {
        let take = limit.map_or(self.len(), |l| l.min(self.len()));
        Ok(self.drain(..take).collect())
    }
}
