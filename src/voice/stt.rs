//! Speech-to-text adapter wrapping a whisper.cpp-style CLI
//!
//! Audio bytes are persisted to a uniquely named scratch file, the engine is
//! invoked as a subprocess, and its plain-text transcript artifact is read
//! back. Scratch files are removed on every exit path.

use std::path::PathBuf;

use thiserror::Error;
use tokio::process::Command;
use uuid::Uuid;

use crate::config::SttConfig;

/// Errors from the transcription stage, each surfaced distinctly to the caller
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// Caller supplied no audio bytes
    #[error("empty audio input")]
    EmptyInput,

    /// Scratch audio file could not be written
    #[error("failed to write scratch audio: {0}")]
    ScratchWrite(#[source] std::io::Error),

    /// Recognition engine could not be started
    #[error("failed to invoke recognition engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// Recognition engine exited non-zero
    #[error("recognition engine failed (status {status}): {stderr}")]
    EngineFailure { status: i32, stderr: String },

    /// Engine reported success but wrote no transcript artifact
    #[error("transcript artifact not found: {0}")]
    OutputMissing(PathBuf),

    /// Transcript artifact exists but could not be read
    #[error("failed to read transcript artifact: {0}")]
    ArtifactRead(#[source] std::io::Error),

    /// Transcript artifact was empty or whitespace-only (no speech detected)
    #[error("empty transcript generated")]
    EmptyTranscript,
}

/// Transcribes recorded audio via the external recognition engine
#[derive(Debug, Clone)]
pub struct SpeechToText {
    binary: PathBuf,
    model: PathBuf,
    language: String,
    threads: u32,
    scratch_dir: PathBuf,
}

impl SpeechToText {
    /// Create an adapter from config; `scratch_dir` holds per-call artifacts
    #[must_use]
    pub fn new(config: &SttConfig, scratch_dir: PathBuf) -> Self {
        Self {
            binary: config.binary.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
            threads: config.threads,
            scratch_dir,
        }
    }

    /// Transcribe audio bytes to text
    ///
    /// `format_hint` is the uploaded file's extension (with or without the
    /// leading dot); it names the scratch file so the engine can sniff the
    /// container.
    ///
    /// # Errors
    ///
    /// Returns a [`TranscriptionError`] describing the first failing step.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        format_hint: &str,
    ) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyInput);
        }

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(TranscriptionError::ScratchWrite)?;

        // Per-call UUID keeps scratch names collision-free across
        // concurrent requests
        let id = Uuid::new_v4();
        let ext = normalize_extension(format_hint);
        let audio_path = self.scratch_dir.join(format!("{id}.{ext}"));
        let output_base = self.scratch_dir.join(id.to_string());
        let transcript_path = self.scratch_dir.join(format!("{id}.txt"));

        let _guard = ScratchGuard::new(vec![audio_path.clone(), transcript_path.clone()]);

        tokio::fs::write(&audio_path, audio)
            .await
            .map_err(TranscriptionError::ScratchWrite)?;

        tracing::debug!(
            audio_bytes = audio.len(),
            path = %audio_path.display(),
            "starting transcription"
        );

        let output = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(&audio_path)
            .arg("-otxt")
            .arg("-of")
            .arg(&output_base)
            .arg("-l")
            .arg(&self.language)
            .arg("--threads")
            .arg(self.threads.to_string())
            .arg("--no-gpu")
            .output()
            .await
            .map_err(TranscriptionError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = output.status.code().unwrap_or(-1);
            tracing::error!(status, stderr = %stderr, "recognition engine failed");
            return Err(TranscriptionError::EngineFailure { status, stderr });
        }

        let raw = match tokio::fs::read_to_string(&transcript_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscriptionError::OutputMissing(transcript_path));
            }
            Err(e) => return Err(TranscriptionError::ArtifactRead(e)),
        };

        let transcript = raw.trim();
        if transcript.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript.to_string())
    }
}

/// Strip a leading dot and fall back to wav for unusable hints
fn normalize_extension(hint: &str) -> String {
    let ext = hint.trim_start_matches('.');
    if ext.is_empty() || !ext.chars().all(char::is_alphanumeric) {
        "wav".to_string()
    } else {
        ext.to_ascii_lowercase()
    }
}

/// Removes per-call scratch files when the call ends, on every exit path
struct ScratchGuard {
    paths: Vec<PathBuf>,
}

impl ScratchGuard {
    fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "scratch cleanup failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SttConfig;

    fn config_with_binary(binary: &str) -> SttConfig {
        SttConfig {
            binary: PathBuf::from(binary),
            model: PathBuf::from("/models/ggml-test.bin"),
            language: "id".to_string(),
            threads: 4,
        }
    }

    #[tokio::test]
    async fn empty_input_rejected_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("stt");
        let stt = SpeechToText::new(&config_with_binary("whisper-cli"), scratch.clone());

        let err = stt.transcribe(&[], "wav").await.unwrap_err();
        assert!(matches!(err, TranscriptionError::EmptyInput));
        // no scratch dir created for rejected input
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let stt = SpeechToText::new(
            &config_with_binary("/nonexistent/whisper-cli"),
            dir.path().to_path_buf(),
        );

        let err = stt.transcribe(b"RIFF....WAVE", "wav").await.unwrap_err();
        assert!(matches!(err, TranscriptionError::Spawn(_)));
    }

    #[tokio::test]
    async fn nonzero_exit_carries_status() {
        let dir = tempfile::tempdir().unwrap();
        // `false` ignores its arguments and exits 1
        let stt = SpeechToText::new(&config_with_binary("false"), dir.path().to_path_buf());

        let err = stt.transcribe(b"RIFF....WAVE", "wav").await.unwrap_err();
        match err {
            TranscriptionError::EngineFailure { status, .. } => assert_eq!(status, 1),
            other => panic!("expected EngineFailure, got {other:?}"),
        }
    }

    /// Fake engine that writes `artifact` as its transcript (the `-of` base
    /// is argument 7 in the adapter's invocation)
    #[cfg(unix)]
    fn write_fake_engine(dir: &std::path::Path, artifact: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-engine");
        let script = format!("#!/bin/sh\nprintf '%s\\n' '{artifact}' > \"$7.txt\"\n");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn whitespace_only_artifact_is_empty_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let binary = write_fake_engine(dir.path(), "   ");
        let scratch = dir.path().join("scratch");
        let stt = SpeechToText::new(
            &config_with_binary(binary.to_str().unwrap()),
            scratch,
        );

        // silent audio yields a blank transcript artifact
        let err = stt.transcribe(b"RIFF....WAVE", "wav").await.unwrap_err();
        assert!(matches!(err, TranscriptionError::EmptyTranscript));
    }

    #[tokio::test]
    async fn successful_exit_without_artifact_is_output_missing() {
        let dir = tempfile::tempdir().unwrap();
        // `true` exits 0 without writing a transcript
        let stt = SpeechToText::new(&config_with_binary("true"), dir.path().to_path_buf());

        let err = stt.transcribe(b"RIFF....WAVE", "wav").await.unwrap_err();
        assert!(matches!(err, TranscriptionError::OutputMissing(_)));
    }

    #[tokio::test]
    async fn scratch_audio_removed_after_failed_call() {
        let dir = tempfile::tempdir().unwrap();
        let stt = SpeechToText::new(&config_with_binary("false"), dir.path().to_path_buf());

        let _ = stt.transcribe(b"RIFF....WAVE", "wav").await;

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "scratch files left behind: {leftovers:?}");
    }

    #[test]
    fn extension_hints_normalized() {
        assert_eq!(normalize_extension(".wav"), "wav");
        assert_eq!(normalize_extension("WEBM"), "webm");
        assert_eq!(normalize_extension(""), "wav");
        assert_eq!(normalize_extension("../etc"), "wav");
    }
}
