//! Text-to-speech adapter wrapping a Coqui-style CLI
//!
//! Synthesis runs normalize → phonemize → engine invocation → output
//! validation. The output file stays on disk until the caller has read it;
//! validation failures remove it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use uuid::Uuid;

use super::{discard_scratch, normalize, Phonemizer};
use crate::config::TtsConfig;

/// Output files with fewer sample frames are flagged with a warning.
/// Some valid short utterances are genuinely brief, so this is not fatal.
const MIN_EXPECTED_FRAMES: u32 = 100;

/// Errors from the synthesis stage
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Synthesis engine exited non-zero
    #[error("synthesis engine failed (status {status}): {stderr}")]
    EngineFailure { status: i32, stderr: String },

    /// Engine reported success but wrote no output file
    #[error("synthesis output not found: {0}")]
    OutputMissing(PathBuf),

    /// Output file exists but is zero bytes
    #[error("synthesis output is empty: {0}")]
    OutputEmpty(PathBuf),

    /// Output file is not a parseable audio container
    #[error("synthesis output is not valid audio: {0}")]
    InvalidFormat(String),

    /// Any other unexpected failure
    #[error("synthesis failed: {0}")]
    Unknown(String),
}

/// Synthesizes speech from reply text via the external synthesis engine
#[derive(Debug, Clone)]
pub struct TextToSpeech {
    binary: PathBuf,
    model: PathBuf,
    config: PathBuf,
    speaker: String,
    output_dir: PathBuf,
    phonemizer: Phonemizer,
}

impl TextToSpeech {
    /// Create an adapter from config; `output_dir` holds synthesized files
    #[must_use]
    pub fn new(config: &TtsConfig, output_dir: PathBuf) -> Self {
        Self {
            binary: config.binary.clone(),
            model: config.model.clone(),
            config: config.config.clone(),
            speaker: config.speaker.clone(),
            output_dir,
            phonemizer: Phonemizer::new(config.phonemizer.clone()),
        }
    }

    /// Synthesize text to a WAV file and return its path
    ///
    /// The caller owns the returned file and removes it once read.
    ///
    /// # Errors
    ///
    /// Returns a [`SynthesisError`] describing the first failing step.
    pub async fn synthesize(&self, text: &str) -> Result<PathBuf, SynthesisError> {
        let normalized = normalize::expand_numbers(text);
        tracing::debug!(text = %normalized, "text after number expansion");

        let outcome = self.phonemizer.phonemize(&normalized).await;
        if outcome.degraded {
            tracing::warn!("synthesizing from plain text, phonemization degraded");
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| SynthesisError::Unknown(format!("failed to create output dir: {e}")))?;

        let output_path = self.output_dir.join(format!("tts_{}.wav", Uuid::new_v4()));

        let output = Command::new(&self.binary)
            .arg("--text")
            .arg(&outcome.text)
            .arg("--model_path")
            .arg(&self.model)
            .arg("--config_path")
            .arg(&self.config)
            .arg("--speaker_idx")
            .arg(&self.speaker)
            .arg("--out_path")
            .arg(&output_path)
            .output()
            .await
            .map_err(|e| SynthesisError::Unknown(format!("failed to invoke engine: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = output.status.code().unwrap_or(-1);
            tracing::error!(status, stderr = %stderr, "synthesis engine failed");
            discard_scratch(&output_path);
            return Err(SynthesisError::EngineFailure { status, stderr });
        }

        if let Err(e) = validate_output(&output_path) {
            if !matches!(e, SynthesisError::OutputMissing(_)) {
                discard_scratch(&output_path);
            }
            return Err(e);
        }

        tracing::info!(path = %output_path.display(), "synthesis complete");
        Ok(output_path)
    }
}

/// Check the synthesized file: exists, non-empty, parses as WAV, and has a
/// plausible number of sample frames
fn validate_output(path: &Path) -> Result<(), SynthesisError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SynthesisError::OutputMissing(path.to_path_buf()));
        }
        Err(e) => return Err(SynthesisError::Unknown(e.to_string())),
    };

    if metadata.len() == 0 {
        return Err(SynthesisError::OutputEmpty(path.to_path_buf()));
    }

    let reader =
        hound::WavReader::open(path).map_err(|e| SynthesisError::InvalidFormat(e.to_string()))?;

    let spec = reader.spec();
    let frames = reader.duration();
    tracing::debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        frames,
        "validated synthesis output"
    );

    if frames < MIN_EXPECTED_FRAMES {
        tracing::warn!(frames, "synthesis output has very few frames");
    }

    Ok(())
}
