//! Voice-chat pipeline orchestration
//!
//! Sequences STT → LLM → TTS, fail-fast, preserving every artifact produced
//! before the first failing stage. Conversation state is durably mutated on
//! generator success even when synthesis later fails.

use crate::chat::SessionManager;
use crate::config::Config;
use crate::voice::{discard_scratch, SpeechToText, TextToSpeech};
use crate::Error;

/// Pipeline stage tags for failure results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Stt,
    Llm,
    Tts,
}

impl Stage {
    /// Lowercase stage name for logs and error payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Stt => "stt",
            Self::Llm => "llm",
            Self::Tts => "tts",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one pipeline invocation
///
/// A failure carries whatever partial outputs earlier stages produced, so a
/// caller can still display the transcript when synthesis fails.
#[derive(Debug)]
pub enum PipelineOutcome {
    Success {
        /// Synthesized reply audio (WAV bytes)
        audio: Vec<u8>,
        transcript: String,
        reply: String,
    },
    Failure {
        stage: Stage,
        error: Error,
        transcript: String,
        reply: String,
    },
}

/// The voice-chat pipeline: STT adapter, per-session chat, TTS adapter
pub struct VoicePipeline {
    stt: SpeechToText,
    tts: TextToSpeech,
    sessions: SessionManager,
}

impl VoicePipeline {
    /// Build the pipeline from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            stt: SpeechToText::new(&config.stt, config.scratch_dir.join("stt")),
            tts: TextToSpeech::new(&config.tts, config.scratch_dir.join("tts")),
            sessions: SessionManager::new(&config.llm, config.state_dir.clone()),
        }
    }

    /// Run one voice-chat exchange
    ///
    /// Stages run strictly sequentially; the first failure short-circuits the
    /// rest. Empty input is rejected before any collaborator is invoked.
    pub async fn handle_voice_chat(
        &self,
        audio: &[u8],
        format_hint: &str,
        session_id: &str,
    ) -> PipelineOutcome {
        if audio.is_empty() {
            tracing::warn!("rejecting empty audio upload");
            return PipelineOutcome::Failure {
                stage: Stage::Input,
                error: Error::Input("empty audio upload".to_string()),
                transcript: String::new(),
                reply: String::new(),
            };
        }

        tracing::info!(audio_bytes = audio.len(), session = %session_id, "voice chat started");

        let transcript = match self.stt.transcribe(audio, format_hint).await {
            Ok(t) => t,
            Err(e) => {
                return PipelineOutcome::Failure {
                    stage: Stage::Stt,
                    error: e.into(),
                    transcript: String::new(),
                    reply: String::new(),
                };
            }
        };

        let reply = {
            let session = self.sessions.session(session_id).await;
            let mut session = session.lock().await;
            match session.respond(&transcript).await {
                Ok(r) => r,
                Err(e) => {
                    return PipelineOutcome::Failure {
                        stage: Stage::Llm,
                        error: e.into(),
                        transcript,
                        reply: String::new(),
                    };
                }
            }
        };

        let audio_path = match self.tts.synthesize(&reply.text).await {
            Ok(p) => p,
            Err(e) => {
                return PipelineOutcome::Failure {
                    stage: Stage::Tts,
                    error: e.into(),
                    transcript,
                    reply: reply.text,
                };
            }
        };

        let audio_bytes = match tokio::fs::read(&audio_path).await {
            Ok(bytes) => {
                discard_scratch(&audio_path);
                bytes
            }
            Err(e) => {
                discard_scratch(&audio_path);
                return PipelineOutcome::Failure {
                    stage: Stage::Tts,
                    error: e.into(),
                    transcript,
                    reply: reply.text,
                };
            }
        };

        tracing::info!(
            audio_bytes = audio_bytes.len(),
            "voice chat complete"
        );

        PipelineOutcome::Success {
            audio: audio_bytes,
            transcript,
            reply: reply.text,
        }
    }
}
