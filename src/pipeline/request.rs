//! Mixing request
//!
//! Immutable description of one voice-over-music job.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MixError, Result};
use crate::profile::{validate_profile, Profile};

/// Default voice gain
pub const DEFAULT_VOICE_VOLUME: f32 = 1.0;

/// Default background music gain
pub const DEFAULT_MUSIC_VOLUME: f32 = 0.3;

/// One voice-over-music mixing job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixingRequest {
    /// Foreground voice recording
    pub voice_path: PathBuf,
    /// Background music recording
    pub music_path: PathBuf,
    /// Where the mixed prompt is written
    pub output_path: PathBuf,
    /// Linear gain applied to the voice, nominally 0.0-1.0
    pub voice_volume: f32,
    /// Linear gain applied to the music, nominally 0.0-1.0
    pub music_volume: f32,
    /// Seconds skipped at the start of the music (and its loop point)
    pub music_offset_secs: f64,
    /// Seconds of music kept after the voice ends, faded to silence
    pub buffer_secs: f64,
    /// Output format; the default profile when absent
    pub profile: Option<Profile>,
}

impl MixingRequest {
    /// Request with default volumes, no offset, no buffer and no profile
    pub fn new(
        voice_path: impl Into<PathBuf>,
        music_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            voice_path: voice_path.into(),
            music_path: music_path.into(),
            output_path: output_path.into(),
            voice_volume: DEFAULT_VOICE_VOLUME,
            music_volume: DEFAULT_MUSIC_VOLUME,
            music_offset_secs: 0.0,
            buffer_secs: 0.0,
            profile: None,
        }
    }

    /// Set the voice and music gains
    pub fn with_volumes(mut self, voice_volume: f32, music_volume: f32) -> Self {
        self.voice_volume = voice_volume;
        self.music_volume = music_volume;
        self
    }

    /// Start the music (and every loop) this many seconds in
    pub fn with_music_offset(mut self, secs: f64) -> Self {
        self.music_offset_secs = secs;
        self
    }

    /// Keep this many seconds of music after the voice ends
    pub fn with_buffer(mut self, secs: f64) -> Self {
        self.buffer_secs = secs;
        self
    }

    /// Encode with `profile` instead of the default
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// The profile this request will be encoded with
    pub fn resolved_profile(&self) -> Profile {
        self.profile.clone().unwrap_or_default()
    }

    /// Music offset as a duration
    ///
    /// # Errors
    /// * `InvalidRequest` - If the offset is negative, non-finite or too large
    pub fn music_offset(&self) -> Result<Duration> {
        to_duration("music offset", self.music_offset_secs)
    }

    /// Trailing buffer as a duration
    ///
    /// # Errors
    /// * `InvalidRequest` - If the buffer is negative, non-finite or too large
    pub fn buffer(&self) -> Result<Duration> {
        to_duration("buffer", self.buffer_secs)
    }

    /// Check the request and return the profile to use
    ///
    /// # Errors
    /// * `InputNotFound` - If either input file is missing
    /// * `InvalidRequest` - For an empty output path or bad offset/buffer
    /// * `InvalidProfile` - If a supplied profile fails validation
    pub fn validate(&self) -> Result<Profile> {
        for path in [&self.voice_path, &self.music_path] {
            if !path.is_file() {
                return Err(MixError::InputNotFound {
                    path: path.clone(),
                    reason: "no such file".to_string(),
                });
            }
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(MixError::InvalidRequest {
                reason: "output path must not be empty".to_string(),
            });
        }

        self.music_offset()?;
        self.buffer()?;

        for (label, gain) in [("voice", self.voice_volume), ("music", self.music_volume)] {
            if !gain.is_finite() {
                return Err(MixError::InvalidRequest {
                    reason: format!("{} volume must be a finite number", label),
                });
            }
        }

        let profile = self.resolved_profile();
        validate_profile(&profile)?;
        Ok(profile)
    }
}

fn to_duration(label: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| MixError::InvalidRequest {
        reason: format!(
            "{} must be a non-negative, representable number of seconds (got {})",
            label, secs
        ),
    })
}
