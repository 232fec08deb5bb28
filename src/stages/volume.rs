//! Volume Stage
//!
//! Fixed linear gain applied to every sample on read.

use crate::engine::{AudioFormat, SampleSource, SeekableSource};
use crate::error::Result;

/// Scales every sample of the wrapped source by a fixed gain
///
/// The gain is not clamped. Keeping it in a sane range is the caller's job.
#[derive(Debug, Clone)]
pub struct VolumeStage<S> {
    source: S,
    gain: f32,
}

impl<S: SampleSource> VolumeStage<S> {
    /// Wrap `source` with a linear gain factor
    pub fn new(source: S, gain: f32) -> Self {
        Self { source, gain }
    }

    /// Current gain factor
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Unwrap the inner source
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: SampleSource> SampleSource for VolumeStage<S> {
    fn format(&self) -> AudioFormat {
        self.source.format()
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let n = self.source.read(buf)?;

        // Unity gain optimization
        if (self.gain - 1.0).abs() < f32::EPSILON {
            return Ok(n);
        }

        for sample in buf[..n].iter_mut() {
            *sample *= self.gain;
        }
        Ok(n)
    }
}

impl<S: SeekableSource> SeekableSource for VolumeStage<S> {
    fn total_samples(&self) -> u64 {
        self.source.total_samples()
    }

    fn position(&self) -> u64 {
        self.source.position()
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        self.source.seek(position)
    }
}
