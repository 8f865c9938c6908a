//! Audio-cue feedback using rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::FeedbackError;
use super::{HapticFeedback, Pulse};

/// Plays a short sound for every pulse.
///
/// The system cue for the pulse is tried first; if it is missing or cannot
/// be decoded a synthesized tone is played. Playback is detached, so
/// `pulse` never blocks.
pub struct SoundFeedback {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl SoundFeedback {
    /// Opens the default audio output.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::DeviceNotAvailable` if there is no output
    /// device.
    pub fn new() -> Result<Self, FeedbackError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| FeedbackError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Plays the cue for `pulse`.
    ///
    /// # Errors
    ///
    /// Returns an error only if no sink can be created.
    pub fn play(&self, pulse: Pulse) -> Result<(), FeedbackError> {
        let result = match pulse.cue_path() {
            Some(path) => self.play_file(path),
            None => Err(FeedbackError::FileNotFound(format!("{} cue", pulse.as_str()))),
        };

        match result {
            Err(e) if e.should_fallback_to_tone() => {
                debug!("{}, playing tone", e);
                self.play_tone(pulse)
            }
            other => other,
        }
    }

    fn play_file(&self, path: &Path) -> Result<(), FeedbackError> {
        let file = File::open(path)
            .map_err(|e| FeedbackError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| FeedbackError::DecodeError(e.to_string()))?;

        let sink = self.sink()?;
        sink.append(decoder);
        sink.detach();
        Ok(())
    }

    fn play_tone(&self, pulse: Pulse) -> Result<(), FeedbackError> {
        let (freq, millis) = pulse.tone();
        let tone = SineWave::new(freq)
            .take_duration(Duration::from_millis(millis))
            .amplify(0.2);

        let sink = self.sink()?;
        sink.append(tone);
        sink.detach();
        Ok(())
    }

    fn sink(&self) -> Result<Sink, FeedbackError> {
        Sink::try_new(&self.stream_handle).map_err(|e| FeedbackError::StreamError(e.to_string()))
    }
}

impl std::fmt::Debug for SoundFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundFeedback").finish_non_exhaustive()
    }
}

impl HapticFeedback for SoundFeedback {
    fn pulse(&self, pulse: Pulse) {
        if let Err(e) = self.play(pulse) {
            warn!("Feedback cue failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Audio hardware is usually missing in CI; tests skip when it is.

    #[test]
    fn test_play_both_pulses() {
        let feedback = match SoundFeedback::new() {
            Ok(f) => f,
            Err(e) => {
                assert!(e.is_device_error());
                return;
            }
        };

        assert!(feedback.play(Pulse::Light).is_ok());
        assert!(feedback.play(Pulse::Heavy).is_ok());
    }

    #[test]
    fn test_debug_impl() {
        if let Ok(feedback) = SoundFeedback::new() {
            assert!(format!("{:?}", feedback).contains("SoundFeedback"));
        }
    }
}
