//! Touch feedback for state-changing actions.
//!
//! Every start, pause and resume fires a light pulse and every stop fires a
//! heavy pulse. On a desktop the pulse is an audio cue:
//!
//! ```text
//! Light → Tink (macOS) / audio-volume-change (freedesktop) / 880 Hz blip
//! Heavy → Glass (macOS) / complete (freedesktop)           / 440 Hz tone
//! ```
//!
//! Feedback is fire-and-forget. Implementations log their own failures and
//! never report them to the caller.

mod error;
mod player;

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::warn;

pub use error::FeedbackError;
pub use player::SoundFeedback;

/// Strength of a feedback pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    /// Start, pause, resume
    Light,
    /// Stop
    Heavy,
}

impl Pulse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pulse::Light => "light",
            Pulse::Heavy => "heavy",
        }
    }

    /// Candidate cue files, most preferred first.
    fn candidates(&self) -> &'static [&'static str] {
        match self {
            Pulse::Light => &[
                "/System/Library/Sounds/Tink.aiff",
                "/usr/share/sounds/freedesktop/stereo/audio-volume-change.oga",
            ],
            Pulse::Heavy => &[
                "/System/Library/Sounds/Glass.aiff",
                "/usr/share/sounds/freedesktop/stereo/complete.oga",
            ],
        }
    }

    /// Returns the first cue file that exists on this system.
    pub fn cue_path(&self) -> Option<&'static Path> {
        self.candidates()
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
    }

    /// Frequency (Hz) and length (ms) of the synthesized fallback tone.
    pub fn tone(&self) -> (f32, u64) {
        match self {
            Pulse::Light => (880.0, 40),
            Pulse::Heavy => (440.0, 150),
        }
    }
}

/// Receives feedback pulses.
pub trait HapticFeedback {
    fn pulse(&self, pulse: Pulse);
}

impl<T: HapticFeedback + ?Sized> HapticFeedback for Arc<T> {
    fn pulse(&self, pulse: Pulse) {
        (**self).pulse(pulse)
    }
}

/// Feedback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl HapticFeedback for NoopFeedback {
    fn pulse(&self, _pulse: Pulse) {}
}

/// Creates the feedback collaborator.
///
/// Returns [`NoopFeedback`] when `enabled` is false or audio is unavailable.
#[must_use]
pub fn try_create_feedback(enabled: bool) -> Arc<dyn HapticFeedback> {
    if !enabled {
        return Arc::new(NoopFeedback);
    }
    match SoundFeedback::new() {
        Ok(feedback) => Arc::new(feedback),
        Err(e) => {
            warn!("Audio not available, feedback disabled: {}", e);
            Arc::new(NoopFeedback)
        }
    }
}

/// Records pulses for tests.
#[derive(Debug, Default)]
pub struct MockHapticFeedback {
    pulses: Mutex<Vec<Pulse>>,
}

impl MockHapticFeedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pulses(&self) -> Vec<Pulse> {
        self.pulses.lock().unwrap().clone()
    }
}

impl HapticFeedback for MockHapticFeedback {
    fn pulse(&self, pulse: Pulse) {
        self.pulses.lock().unwrap().push(pulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tones_differ() {
        let (light_freq, light_ms) = Pulse::Light.tone();
        let (heavy_freq, heavy_ms) = Pulse::Heavy.tone();
        assert!(light_freq > heavy_freq);
        assert!(light_ms < heavy_ms);
    }

    #[test]
    fn test_cue_path_exists_when_found() {
        for pulse in [Pulse::Light, Pulse::Heavy] {
            if let Some(path) = pulse.cue_path() {
                assert!(path.exists());
            }
        }
    }

    #[test]
    fn test_mock_records_pulses() {
        let mock = Arc::new(MockHapticFeedback::new());
        let shared: Arc<dyn HapticFeedback> = mock.clone();

        shared.pulse(Pulse::Light);
        shared.pulse(Pulse::Heavy);
        assert_eq!(mock.pulses(), vec![Pulse::Light, Pulse::Heavy]);
    }

    #[test]
    fn test_disabled_feedback_is_noop() {
        let feedback = try_create_feedback(false);
        feedback.pulse(Pulse::Heavy);
    }
}
