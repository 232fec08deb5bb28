//! Output Profiles
//!
//! A profile is a named output-format preset: sample rate, bit depth,
//! channel count and maximum output size. The pipeline only reads profiles;
//! persistence lives in [`ProfileStore`].

mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::AudioFormat;
use crate::error::{MixError, Result};

pub use store::ProfileStore;

// ============================================================================
// Constants
// ============================================================================

/// Longest allowed profile name, in characters
pub const MAX_NAME_CHARS: usize = 50;

/// Largest allowed size limit in megabytes
pub const MAX_FILE_SIZE_MB: u32 = 1000;

/// Largest allowed bit depth
pub const MAX_BIT_DEPTH: u16 = 32;

// ============================================================================
// Profile
// ============================================================================

/// Output format preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Generated unique identifier
    pub id: Uuid,
    /// Display name (1-50 characters)
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Output bits per sample
    pub bit_depth: u16,
    /// Output channel count (1 or 2)
    pub channels: u16,
    /// Maximum output size in megabytes
    pub max_file_size_mb: u32,
    /// Name of the template this profile was created from
    #[serde(default)]
    pub template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile with a fresh id
    pub fn new(
        name: impl Into<String>,
        sample_rate: u32,
        bit_depth: u16,
        channels: u16,
        max_file_size_mb: u32,
    ) -> Self {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            sample_rate,
            bit_depth,
            channels,
            max_file_size_mb,
            template: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The profile used when a request does not name one
    ///
    /// 8000 Hz, 16-bit, mono, 10 MB: the common PBX prompt format.
    pub fn default_profile() -> Self {
        Self::new("Default", 8000, 16, 1, 10)
            .with_description("Standard telephony prompt (8 kHz, 16-bit, mono)")
    }

    /// Built-in presets a store is seeded with
    pub fn templates() -> Vec<Profile> {
        vec![
            Self::default_profile(),
            Self::new("Wideband", 16000, 16, 1, 10)
                .with_description("HD voice prompt (16 kHz, 16-bit, mono)"),
            Self::new("Narrowband 8-bit", 8000, 8, 1, 5)
                .with_description("Legacy 8-bit prompt for older PBX systems"),
            Self::new("CD Quality", 44100, 16, 2, 50)
                .with_description("Music-on-hold preview (44.1 kHz, 16-bit, stereo)"),
            Self::new("Studio", 48000, 24, 2, 100)
                .with_description("Archival master (48 kHz, 24-bit, stereo)"),
        ]
    }

    /// Create a copy of a template with a new id and name
    pub fn from_template(template: &Profile, name: impl Into<String>) -> Self {
        let mut profile = Self::new(
            name,
            template.sample_rate,
            template.bit_depth,
            template.channels,
            template.max_file_size_mb,
        );
        profile.description = template.description.clone();
        profile.template = Some(template.name.clone());
        profile
    }

    /// Mixing format implied by this profile
    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.channels)
    }

    /// Bytes per second of encoded audio
    pub fn byte_rate(&self) -> f64 {
        self.sample_rate as f64 * (self.bit_depth as f64 / 8.0) * self.channels as f64
    }

    /// Validate this profile, reporting every violated constraint
    pub fn validate(&self) -> Result<()> {
        validate_profile(self)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::default_profile()
    }
}

/// Check every profile constraint, collecting all violations
///
/// # Errors
/// * `InvalidProfile` - With one message per violated constraint
pub fn validate_profile(profile: &Profile) -> Result<()> {
    let mut violations = Vec::new();

    if profile.sample_rate == 0 {
        violations.push("sample rate must be greater than 0".to_string());
    }
    if profile.bit_depth == 0 || profile.bit_depth > MAX_BIT_DEPTH {
        violations.push(format!(
            "bit depth must be between 1 and {} (got {})",
            MAX_BIT_DEPTH, profile.bit_depth
        ));
    }
    if profile.channels != 1 && profile.channels != 2 {
        violations.push(format!(
            "channels must be 1 or 2 (got {})",
            profile.channels
        ));
    }
    if profile.max_file_size_mb == 0 || profile.max_file_size_mb > MAX_FILE_SIZE_MB {
        violations.push(format!(
            "maximum file size must be between 1 and {} MB (got {})",
            MAX_FILE_SIZE_MB, profile.max_file_size_mb
        ));
    }

    let name_chars = profile.name.trim().chars().count();
    if name_chars == 0 {
        violations.push("name must not be empty".to_string());
    } else if profile.name.chars().count() > MAX_NAME_CHARS {
        violations.push(format!(
            "name must be at most {} characters",
            MAX_NAME_CHARS
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(MixError::InvalidProfile { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_profile() {
        let profile = Profile::default_profile();
        assert_eq!(profile.sample_rate, 8000);
        assert_eq!(profile.bit_depth, 16);
        assert_eq!(profile.channels, 1);
        assert_eq!(profile.max_file_size_mb, 10);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_templates_are_valid() {
        for template in Profile::templates() {
            assert!(template.validate().is_ok(), "{} is invalid", template.name);
        }
    }

    #[test_case(0, 16, 1, 10 ; "zero sample rate")]
    #[test_case(8000, 0, 1, 10 ; "zero bit depth")]
    #[test_case(8000, 33, 1, 10 ; "bit depth too high")]
    #[test_case(8000, 16, 0, 10 ; "no channels")]
    #[test_case(8000, 16, 3, 10 ; "three channels")]
    #[test_case(8000, 16, 1, 0 ; "zero size limit")]
    #[test_case(8000, 16, 1, 1001 ; "size limit too high")]
    fn test_single_violation(sample_rate: u32, bit_depth: u16, channels: u16, max_mb: u32) {
        let profile = Profile::new("Test", sample_rate, bit_depth, channels, max_mb);
        match profile.validate().unwrap_err() {
            MixError::InvalidProfile { violations } => assert_eq!(violations.len(), 1),
            other => panic!("Expected InvalidProfile, got: {:?}", other),
        }
    }

    #[test]
    fn test_reports_all_violations() {
        let profile = Profile::new("", 0, 40, 5, 0);
        match profile.validate().unwrap_err() {
            MixError::InvalidProfile { violations } => assert_eq!(violations.len(), 5),
            other => panic!("Expected InvalidProfile, got: {:?}", other),
        }
    }

    #[test]
    fn test_name_length_limit() {
        let ok = Profile::new("a".repeat(50), 8000, 16, 1, 10);
        assert!(ok.validate().is_ok());

        let too_long = Profile::new("a".repeat(51), 8000, 16, 1, 10);
        assert!(too_long.validate().is_err());

        let blank = Profile::new("   ", 8000, 16, 1, 10);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_from_template_records_origin() {
        let template = Profile::default_profile();
        let profile = Profile::from_template(&template, "Main Menu");
        assert_ne!(profile.id, template.id);
        assert_eq!(profile.template.as_deref(), Some("Default"));
        assert_eq!(profile.format(), template.format());
    }

    #[test]
    fn test_byte_rate() {
        assert_eq!(Profile::default_profile().byte_rate(), 16_000.0);
    }
}
