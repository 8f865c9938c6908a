//! Feedback error types.

use thiserror::Error;

/// Errors that can occur playing a feedback cue.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Cue file was not found at the specified path.
    #[error("Feedback sound not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the cue file.
    #[error("Failed to decode feedback sound: {0}")]
    DecodeError(String),

    /// Failed to create a playback sink.
    #[error("Failed to open audio stream: {0}")]
    StreamError(String),
}

impl FeedbackError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if a synthesized tone should be played instead.
    #[must_use]
    pub fn should_fallback_to_tone(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::FileNotFound(_) | Self::DecodeError(_) => "A synthesized tone is used instead",
            Self::StreamError(_) => "Check the system audio settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedbackError::FileNotFound("/x/Tink.aiff".to_string());
        assert!(err.to_string().contains("Tink.aiff"));
    }

    #[test]
    fn test_classification() {
        assert!(FeedbackError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(FeedbackError::StreamError("x".into()).is_device_error());
        assert!(!FeedbackError::DecodeError("x".into()).is_device_error());

        assert!(FeedbackError::FileNotFound("x".into()).should_fallback_to_tone());
        assert!(FeedbackError::DecodeError("x".into()).should_fallback_to_tone());
        assert!(!FeedbackError::StreamError("x".into()).should_fallback_to_tone());
    }
}
