//! Phoneme preprocessing for the synthesis engine
//!
//! Runs an optional external grapheme-to-phoneme command over the normalized
//! text (stdin in, stdout out). Failure is never fatal: the caller always gets
//! text to synthesize, with `degraded` marking that phonemization fell back.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Result of phoneme preprocessing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeOutcome {
    /// Text to hand to the synthesis engine
    pub text: String,
    /// True when a configured phonemizer failed and the input passed through
    /// unchanged
    pub degraded: bool,
}

/// Best-effort grapheme-to-phoneme converter
#[derive(Debug, Clone)]
pub struct Phonemizer {
    command: Option<Vec<String>>,
}

impl Phonemizer {
    /// Create a phonemizer from a command line (program + args).
    /// `None` disables phonemization entirely.
    #[must_use]
    pub fn new(command: Option<Vec<String>>) -> Self {
        let command = command.filter(|argv| !argv.is_empty());
        Self { command }
    }

    /// Convert text to a phonetic form, falling back to the input on any failure
    pub async fn phonemize(&self, text: &str) -> PhonemeOutcome {
        let Some(argv) = &self.command else {
            return PhonemeOutcome {
                text: text.to_string(),
                degraded: false,
            };
        };

        match run_command(argv, text).await {
            Ok(phonemes) => {
                tracing::debug!(phonemes = %phonemes, "phonemization complete");
                PhonemeOutcome {
                    text: phonemes,
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "phonemization failed, falling back to plain text");
                PhonemeOutcome {
                    text: text.to_string(),
                    degraded: true,
                }
            }
        }
    }
}

async fn run_command(argv: &[String], text: &str) -> Result<String, String> {
    let mut child = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to spawn phonemizer: {e}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| format!("failed to write phonemizer stdin: {e}"))?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| format!("phonemizer execution failed: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "phonemizer exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    let phonemes = String::from_utf8(output.stdout)
        .map_err(|e| format!("phonemizer produced non-UTF8 output: {e}"))?;
    let phonemes = phonemes.trim();

    if phonemes.is_empty() {
        return Err("phonemizer produced empty output".to_string());
    }

    Ok(phonemes.to_string())
}
