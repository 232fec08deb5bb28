//! Offset Stage
//!
//! Skip/take view over a source. Both boundaries are held in source sample
//! units and compared against a single position counter.

use std::time::Duration;

use log::debug;

use crate::engine::{AudioFormat, SampleSource, SeekableSource};
use crate::error::Result;

/// Scratch block used to discard skipped samples from non-seekable sources
const SKIP_BLOCK: usize = 4096;

/// Discards a leading span of a source and/or truncates it
///
/// - **skip**: the first `skip` samples of the wrapped source are dropped
///   before anything is yielded
/// - **take**: once `take` samples have been yielded, reads return 0
///
/// A skip at or past the end of the source yields nothing. The pipeline
/// rejects that case with `validate_offset` before building the stage.
#[derive(Debug, Clone)]
pub struct OffsetStage<S> {
    source: S,
    skip_samples: u64,
    take_samples: Option<u64>,
    /// Samples yielded by this view
    position: u64,
    skipped: bool,
}

impl<S: SampleSource> OffsetStage<S> {
    /// Wrap `source` with no skip and no take limit
    pub fn new(source: S) -> Self {
        Self {
            source,
            skip_samples: 0,
            take_samples: None,
            position: 0,
            skipped: false,
        }
    }

    /// Discard the first `duration` of the source
    pub fn skip(mut self, duration: Duration) -> Self {
        self.skip_samples = self.source.format().samples_for(duration);
        self
    }

    /// Stop after `duration` worth of samples
    pub fn take(mut self, duration: Duration) -> Self {
        self.take_samples = Some(self.source.format().samples_for(duration));
        self
    }

    /// Stop after exactly `samples` samples
    pub fn take_samples(mut self, samples: u64) -> Self {
        self.take_samples = Some(samples);
        self
    }

    /// Leading samples discarded from the source
    pub fn skip_samples(&self) -> u64 {
        self.skip_samples
    }

    /// Take limit in samples, if any
    pub fn take_limit(&self) -> Option<u64> {
        self.take_samples
    }

    fn discard_leading(&mut self) -> Result<()> {
        let mut scratch = vec![0.0_f32; SKIP_BLOCK];
        let mut remaining = self.skip_samples;
        while remaining > 0 {
            let want = remaining.min(SKIP_BLOCK as u64) as usize;
            let n = self.source.read(&mut scratch[..want])?;
            if n == 0 {
                debug!(
                    "Offset skip ran past end of source with {} samples left to skip",
                    remaining
                );
                break;
            }
            remaining -= n as u64;
        }
        self.skipped = true;
        Ok(())
    }
}

impl<S: SampleSource> SampleSource for OffsetStage<S> {
    fn format(&self) -> AudioFormat {
        self.source.format()
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        if !self.skipped {
            self.discard_leading()?;
        }

        let want = match self.take_samples {
            Some(limit) => (limit.saturating_sub(self.position)).min(buf.len() as u64) as usize,
            None => buf.len(),
        };
        if want == 0 {
            return Ok(0);
        }

        let n = self.source.read(&mut buf[..want])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<S: SeekableSource> SeekableSource for OffsetStage<S> {
    fn total_samples(&self) -> u64 {
        let available = self.source.total_samples().saturating_sub(self.skip_samples);
        match self.take_samples {
            Some(limit) => available.min(limit),
            None => available,
        }
    }

    fn position(&self) -> u64 {
        self.position
    }

    /// Position within the view; 0 is the first sample after the skip
    fn seek(&mut self, position: u64) -> Result<()> {
        let position = position.min(self.total_samples());
        self.source.seek(self.skip_samples + position)?;
        self.position = position;
        self.skipped = true;
        Ok(())
    }
}
