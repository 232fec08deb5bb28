//! Pull-based sample sources
//!
//! Every stage in the mixing chain is a `SampleSource`: a stream of
//! interleaved f32 samples at a fixed `AudioFormat`. Stages wrap other
//! sources and transform samples as they are pulled through.

use std::time::Duration;

use crate::engine::format::AudioFormat;
use crate::error::Result;

/// A finite or infinite pull source of interleaved f32 samples
pub trait SampleSource {
    /// Format of the samples this source yields
    fn format(&self) -> AudioFormat;

    /// Fill up to `buf.len()` samples, returning how many were written
    ///
    /// Returning 0 for a non-empty buffer means the source is exhausted.
    fn read(&mut self, buf: &mut [f32]) -> Result<usize>;
}

/// A source that can be repositioned to an absolute sample offset
///
/// Positions are in the source's own sample coordinates. A loop can only
/// be built over a source with this capability.
pub trait SeekableSource: SampleSource {
    /// Total number of samples this source can yield from position 0
    fn total_samples(&self) -> u64;

    /// Current read position
    fn position(&self) -> u64;

    /// Move the read position, clamping to `total_samples()`
    fn seek(&mut self, position: u64) -> Result<()>;

    /// Total duration of the source
    fn total_duration(&self) -> Duration {
        self.format().duration_of(self.total_samples())
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn format(&self) -> AudioFormat {
        (**self).format()
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<S: SeekableSource + ?Sized> SeekableSource for Box<S> {
    fn total_samples(&self) -> u64 {
        (**self).total_samples()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        (**self).seek(position)
    }
}

// ============================================================================
// Decoded Source
// ============================================================================

/// Fully decoded audio held in memory
///
/// This is what the decoding collaborator hands to the pipeline: samples
/// already converted to the mixing format. Always seekable.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    samples: Vec<f32>,
    format: AudioFormat,
    position: usize,
}

impl DecodedSource {
    /// Wrap interleaved samples; trailing partial frames are dropped
    pub fn new(mut samples: Vec<f32>, format: AudioFormat) -> Self {
        let aligned = format.align(samples.len());
        samples.truncate(aligned);
        DecodedSource {
            samples,
            format,
            position: 0,
        }
    }

    /// A source of digital silence lasting `duration`
    pub fn silence(duration: Duration, format: AudioFormat) -> Self {
        let len = format.samples_for(duration) as usize;
        Self::new(vec![0.0; len], format)
    }

    /// Underlying samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples still to be read
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleSource for DecodedSource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.samples[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

impl SeekableSource for DecodedSource {
    fn total_samples(&self) -> u64 {
        self.samples.len() as u64
    }

    fn position(&self) -> u64 {
        self.position as u64
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        let position = position.min(self.samples.len() as u64) as usize;
        self.position = self.format.align(position);
        Ok(())
    }
}

/// Drain a source completely into a vector
///
/// Only meaningful for finite sources.
pub fn read_to_end<S: SampleSource + ?Sized>(source: &mut S) -> Result<Vec<f32>> {
    let mut out = Vec::new();
    let mut block = vec![0.0_f32; 4096];
    loop {
        let n = source.read(&mut block)?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&block[..n]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_decoded_source_reads_in_order() {
        let mut source = DecodedSource::new(ramp(10), AudioFormat::mono(8000));
        let mut buf = [0.0_f32; 4];

        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[8.0, 9.0]);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_decoded_source_drops_partial_frame() {
        let source = DecodedSource::new(ramp(5), AudioFormat::stereo(8000));
        assert_eq!(source.total_samples(), 4);
    }

    #[test]
    fn test_seek_clamps_and_aligns() {
        let mut source = DecodedSource::new(ramp(10), AudioFormat::stereo(8000));
        source.seek(100).unwrap();
        assert_eq!(source.position(), 10);

        source.seek(5).unwrap();
        assert_eq!(source.position(), 4);

        let mut buf = [0.0_f32; 2];
        source.read(&mut buf).unwrap();
        assert_eq!(buf, [4.0, 5.0]);
    }

    #[test]
    fn test_total_duration() {
        let source = DecodedSource::silence(Duration::from_secs(3), AudioFormat::mono(8000));
        assert_eq!(source.total_samples(), 24_000);
        assert_eq!(source.total_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut boxed: Box<dyn SampleSource> =
            Box::new(DecodedSource::new(ramp(6), AudioFormat::mono(8000)));
        assert_eq!(boxed.format(), AudioFormat::mono(8000));
        assert_eq!(read_to_end(&mut boxed).unwrap(), ramp(6));
    }
}
