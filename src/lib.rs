//! Suara Gateway - voice-chat pipeline for an Indonesian-speaking assistant
//!
//! This library sequences three independently fallible external engines:
//! - speech-to-text via a whisper.cpp-style CLI
//! - conversational replies via a Gemini-style REST backend
//! - text-to-speech via a Coqui-style CLI
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  HTTP front end                      │
//! │            POST /voice-chat (multipart)              │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Voice pipeline                       │
//! │   STT adapter  →  chat session  →  TTS adapter      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              External engines                        │
//! │   whisper-cli  │  generateContent  │  tts CLI       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Each stage surfaces a typed error; the pipeline short-circuits on the
//! first failure but preserves every artifact produced before it, so the
//! HTTP layer can always return the transcript alongside a TTS failure.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod voice;

pub use chat::{ChatSession, GenerationError, Reply, SessionManager};
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{PipelineOutcome, Stage, VoicePipeline};
pub use voice::{SpeechToText, SynthesisError, TextToSpeech, TranscriptionError};
