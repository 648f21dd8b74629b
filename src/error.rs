//! Error types for the Suara gateway

use thiserror::Error;

use crate::chat::GenerationError;
use crate::voice::{SynthesisError, TranscriptionError};

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Suara gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or empty client input
    #[error("input error: {0}")]
    Input(String),

    /// Speech-to-text stage error
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    /// Language-generation stage error
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Text-to-speech stage error
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
