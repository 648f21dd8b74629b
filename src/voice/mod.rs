//! Voice processing: text normalization, phoneme preprocessing, and the
//! speech-to-text / text-to-speech engine adapters

pub mod normalize;
pub mod phoneme;
pub mod stt;
pub mod tts;

pub use phoneme::{PhonemeOutcome, Phonemizer};
pub use stt::{SpeechToText, TranscriptionError};
pub use tts::{SynthesisError, TextToSpeech};

/// Remove a scratch file, logging instead of failing
pub(crate) fn discard_scratch(path: &std::path::Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %e, "scratch cleanup failed");
        }
    }
}
