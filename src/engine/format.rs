//! Sample format description
//!
//! Stages track progress in samples, never wall-clock time. Conversion
//! between durations and sample counts happens here, once, at each stage
//! boundary.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sample rate and channel count of an interleaved f32 stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Frames per second
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
}

impl AudioFormat {
    /// Create a new format
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        AudioFormat {
            sample_rate,
            channels,
        }
    }

    /// Mono at the given rate
    pub fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }

    /// Stereo at the given rate
    pub fn stereo(sample_rate: u32) -> Self {
        Self::new(sample_rate, 2)
    }

    /// Number of interleaved samples covering `duration`
    ///
    /// Rounds to whole frames so a stereo stream is never split mid-frame.
    pub fn samples_for(&self, duration: Duration) -> u64 {
        self.frames_for(duration) * self.channels as u64
    }

    /// Number of frames covering `duration`, rounded to nearest
    pub fn frames_for(&self, duration: Duration) -> u64 {
        (duration.as_secs_f64() * self.sample_rate as f64).round() as u64
    }

    /// Duration spanned by `samples` interleaved samples
    pub fn duration_of(&self, samples: u64) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = samples / self.channels as u64;
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }

    /// Rounds a sample count down to a whole number of frames
    pub fn align(&self, samples: usize) -> usize {
        let channels = (self.channels as usize).max(1);
        samples - samples % channels
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match self.channels {
            1 => "mono".to_string(),
            2 => "stereo".to_string(),
            n => format!("{}ch", n),
        };
        write!(f, "{} Hz {}", self.sample_rate, layout)
    }
}
