//! Fade-Out Stage
//!
//! Linear gain ramp from 1.0 at `fade_start` to 0.0 at `fade_end`, measured
//! in output sample time since the stage began emitting.

use std::time::Duration;

use crate::engine::{AudioFormat, SampleSource};
use crate::error::Result;

/// Applies a trailing linear fade-out to the wrapped source
///
/// Gain is 1.0 before `fade_start`, 0.0 at or after `fade_end`, and strictly
/// decreasing in between. All channels of a frame share the same gain.
#[derive(Debug, Clone)]
pub struct FadeOutStage<S> {
    source: S,
    fade_start_frame: u64,
    fade_end_frame: u64,
    /// Frames emitted so far
    position: u64,
}

impl<S: SampleSource> FadeOutStage<S> {
    /// Fade `source` out over `[fade_start, fade_end]`
    pub fn new(source: S, fade_start: Duration, fade_end: Duration) -> Self {
        let format = source.format();
        let fade_start_frame = format.frames_for(fade_start);
        let fade_end_frame = format.frames_for(fade_end).max(fade_start_frame);
        Self {
            source,
            fade_start_frame,
            fade_end_frame,
            position: 0,
        }
    }

    /// Gain at a given frame position
    pub fn gain_at(&self, frame: u64) -> f32 {
        if frame < self.fade_start_frame {
            return 1.0;
        }
        if frame >= self.fade_end_frame {
            return 0.0;
        }
        let span = (self.fade_end_frame - self.fade_start_frame) as f64;
        let into_fade = (frame - self.fade_start_frame) as f64;
        (1.0 - into_fade / span) as f32
    }

    /// Frames emitted so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<S: SampleSource> SampleSource for FadeOutStage<S> {
    fn format(&self) -> AudioFormat {
        self.source.format()
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let n = self.source.read(buf)?;
        let channels = (self.source.format().channels as usize).max(1);

        if self.position + (n / channels) as u64 <= self.fade_start_frame {
            self.position += (n / channels) as u64;
            return Ok(n);
        }

        for frame in buf[..n].chunks_mut(channels) {
            let gain = self.gain_at(self.position);
            for sample in frame.iter_mut() {
                *sample *= gain;
            }
            self.position += 1;
        }
        Ok(n)
    }
}
