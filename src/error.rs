//! Error handling for Promptmix
//!
//! Every failure the mixing pipeline can hit maps onto one variant here.
//! The orchestration boundary converts these into a failed `MixingOutcome`
//! instead of propagating them.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Promptmix operations
pub type Result<T> = std::result::Result<T, MixError>;

/// Main error type for Promptmix operations
#[derive(Error, Debug)]
pub enum MixError {
    // Input Errors
    #[error("Input file not found or unreadable: {path} ({reason})")]
    InputNotFound { path: PathBuf, reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // Validation Errors
    #[error("Invalid profile: {}", violations.join("; "))]
    InvalidProfile { violations: Vec<String> },

    #[error("Invalid music offset: offset {offset_secs:.3}s exceeds music duration {duration_secs:.3}s")]
    InvalidOffset { offset_secs: f64, duration_secs: f64 },

    #[error("Estimated output size {estimated_mb} MB exceeds profile limit of {limit_mb} MB")]
    SizeLimitExceeded { estimated_mb: u64, limit_mb: u32 },

    #[error("Profile not found: {name}")]
    ProfileNotFound { name: String },

    // Processing Errors
    #[error("Format mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: String, found: String },

    #[error("Encoding failed: {reason}")]
    EncodingFailure {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unexpected error: {reason}")]
    Unknown { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MixError {
    /// Build an `EncodingFailure` from any underlying writer error
    pub fn encoding<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MixError::EncodingFailure {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MixError::InputNotFound { .. } => "INPUT_NOT_FOUND",
            MixError::InvalidRequest { .. } => "INVALID_REQUEST",
            MixError::InvalidProfile { .. } => "INVALID_PROFILE",
            MixError::InvalidOffset { .. } => "INVALID_OFFSET",
            MixError::SizeLimitExceeded { .. } => "SIZE_LIMIT_EXCEEDED",
            MixError::ProfileNotFound { .. } => "PROFILE_NOT_FOUND",
            MixError::FormatMismatch { .. } => "FORMAT_MISMATCH",
            MixError::EncodingFailure { .. } => "ENCODING_FAILURE",
            MixError::Unknown { .. } => "UNKNOWN",
            MixError::Io(_) => "IO_ERROR",
            MixError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the caller can fix this error by changing the request
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MixError::InputNotFound { .. }
                | MixError::InvalidRequest { .. }
                | MixError::InvalidProfile { .. }
                | MixError::InvalidOffset { .. }
                | MixError::SizeLimitExceeded { .. }
                | MixError::ProfileNotFound { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MixError::InputNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file is a supported audio format (WAV, MP3, FLAC, OGG, M4A)",
            ],
            MixError::InvalidProfile { .. } => vec![
                "Sample rate must be positive",
                "Bit depth must be between 1 and 32",
                "Channels must be 1 or 2",
                "Maximum size must be between 1 and 1000 MB",
            ],
            MixError::InvalidOffset { .. } => vec![
                "Choose a music offset shorter than the music track",
                "Use offset 0 to start from the beginning of the music",
            ],
            MixError::SizeLimitExceeded { .. } => vec![
                "Shorten the trailing buffer",
                "Use a profile with a lower sample rate or bit depth",
                "Raise the profile's maximum file size",
            ],
            MixError::EncodingFailure { .. } => vec![
                "Check the output directory exists and is writable",
                "Use a profile with 8, 16, 24 or 32 bits per sample",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MixError::InputNotFound {
            path: PathBuf::from("voice.wav"),
            reason: "missing".to_string(),
        };
        assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invalid_profile_lists_all_violations() {
        let err = MixError::InvalidProfile {
            violations: vec!["sample rate".to_string(), "channels".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("sample rate"));
        assert!(message.contains("channels"));
    }

    #[test]
    fn test_size_limit_message_carries_both_numbers() {
        let err = MixError::SizeLimitExceeded {
            estimated_mb: 61,
            limit_mb: 10,
        };
        let message = err.to_string();
        assert!(message.contains("61"));
        assert!(message.contains("10"));
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_encoding_failure_is_not_recoverable() {
        let err = MixError::encoding(
            "disk gone",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert_eq!(err.error_code(), "ENCODING_FAILURE");
        assert!(!err.is_recoverable());
    }
}
