//! Output size estimation and pre-flight checks
//!
//! Pure functions; nothing here touches the filesystem.

use std::time::Duration;

use crate::engine::AudioFormat;
use crate::error::{MixError, Result};
use crate::profile::Profile;

/// Size of a canonical PCM WAV header
pub const HEADER_BYTES: u64 = 44;

/// Size of a WAVE_FORMAT_EXTENSIBLE header, written above 16 bits or 2 channels
pub const EXTENSIBLE_HEADER_BYTES: u64 = 68;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Expected size of an encoded file of `duration` under `profile`
///
/// `ceil(secs × rate × bit_depth/8 × channels) + header_bytes(profile)`
pub fn estimate_bytes(duration: Duration, profile: &Profile) -> u64 {
    let data = duration.as_secs_f64() * profile.byte_rate();
    (data.ceil() as u64).saturating_add(header_bytes(profile))
}

/// Header size of the WAV container written for `profile`
pub fn header_bytes(profile: &Profile) -> u64 {
    if profile.bit_depth > 16 || profile.channels > 2 {
        EXTENSIBLE_HEADER_BYTES
    } else {
        HEADER_BYTES
    }
}

/// Whole megabytes in `bytes`, rounded down
pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

/// True if an encoding of `duration` stays within the profile's limit
pub fn fits_profile(duration: Duration, profile: &Profile) -> bool {
    bytes_to_mb(estimate_bytes(duration, profile)) <= profile.max_file_size_mb as u64
}

/// Fail unless an encoding of `duration` fits the profile
///
/// # Errors
/// * `SizeLimitExceeded` - Carrying both the estimate and the limit in MB
pub fn check_size(duration: Duration, profile: &Profile) -> Result<u64> {
    let estimated = estimate_bytes(duration, profile);
    let estimated_mb = bytes_to_mb(estimated);
    if estimated_mb > profile.max_file_size_mb as u64 {
        return Err(MixError::SizeLimitExceeded {
            estimated_mb,
            limit_mb: profile.max_file_size_mb,
        });
    }
    Ok(estimated)
}

/// Ensure a music offset leaves at least some music to play
///
/// # Errors
/// * `InvalidOffset` - If `offset_secs >= music_duration`
pub fn validate_offset(music_duration: Duration, offset_secs: f64) -> Result<()> {
    let duration_secs = music_duration.as_secs_f64();
    if offset_secs >= duration_secs {
        return Err(MixError::InvalidOffset {
            offset_secs,
            duration_secs,
        });
    }
    Ok(())
}

/// Ensure skipping `offset` leaves at least one frame of music
///
/// The offset is rounded to whole frames, so an offset just below the
/// music duration can still consume every sample.
///
/// # Errors
/// * `InvalidOffset` - If the rounded skip reaches the end of the music
pub fn validate_skip(format: AudioFormat, music_samples: u64, offset: Duration) -> Result<()> {
    if format.samples_for(offset) >= music_samples {
        return Err(MixError::InvalidOffset {
            offset_secs: offset.as_secs_f64(),
            duration_secs: format.duration_of(music_samples).as_secs_f64(),
        });
    }
    Ok(())
}
