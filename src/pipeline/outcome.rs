//! Mixing outcome
//!
//! Value returned to callers of `mix_audio_files`. Built once per request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MixError;
use crate::profile::Profile;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct MixReport {
    /// Length of the decoded voice
    pub voice_duration: Duration,
    /// Voice plus trailing buffer
    pub total_duration: Duration,
    /// Pre-encoding size estimate
    pub estimated_bytes: u64,
    /// Actual size of the written file
    pub output_bytes: u64,
    /// Interleaved samples written
    pub samples_written: u64,
    /// Number of times the music was rewound to its offset
    pub music_loops: u32,
    /// Profile the file was encoded with
    pub profile: Profile,
    /// Post-encoding size overage, if any
    pub warning: Option<String>,
}

/// Result of a mixing request, success or failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixingOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub voice_duration_secs: f64,
    pub total_duration_secs: f64,
    pub output_bytes: u64,
    pub music_loops: u32,
    pub used_profile: Profile,
    pub message: String,
    pub warning: Option<String>,
}

impl MixingOutcome {
    /// Outcome for a completed mix
    pub fn succeeded(report: MixReport) -> Self {
        let mut message = format!(
            "Mixed {:.2}s of voice into {:.2}s of audio ({} bytes, {} Hz / {}-bit / {} ch)",
            report.voice_duration.as_secs_f64(),
            report.total_duration.as_secs_f64(),
            report.output_bytes,
            report.profile.sample_rate,
            report.profile.bit_depth,
            report.profile.channels,
        );
        if let Some(warning) = &report.warning {
            message.push_str(". Warning: ");
            message.push_str(warning);
        }

        Self {
            success: true,
            error: None,
            error_code: None,
            voice_duration_secs: report.voice_duration.as_secs_f64(),
            total_duration_secs: report.total_duration.as_secs_f64(),
            output_bytes: report.output_bytes,
            music_loops: report.music_loops,
            used_profile: report.profile,
            message,
            warning: report.warning,
        }
    }

    /// Outcome for a request that failed at any step
    pub fn failed(error: &MixError, profile: Profile) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_code: Some(error.error_code().to_string()),
            voice_duration_secs: 0.0,
            total_duration_secs: 0.0,
            output_bytes: 0,
            music_loops: 0,
            used_profile: profile,
            message: format!("Mixing failed: {}", error),
            warning: None,
        }
    }
}
