//! Configuration management for the Suara gateway

pub mod file;

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default system instruction for the assistant (Indonesian voice persona)
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are a responsive, intelligent, and fluent virtual assistant who communicates in Indonesian.
Your task is to provide clear, concise, and informative answers in response to user queries or statements spoken through voice.

Your answers must:
- Be written in polite and easily understandable Indonesian.
- Be short and to the point (maximum 2-3 sentences).
- Avoid repeating the user's question; respond directly with the answer.

If you're unsure about an answer, be honest and say that you don't know.";

/// Suara gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Speech-to-text engine configuration
    pub stt: SttConfig,

    /// Text-to-speech engine configuration
    pub tts: TtsConfig,

    /// LLM backend configuration
    pub llm: LlmConfig,

    /// Directory for persisted conversation histories
    pub state_dir: PathBuf,

    /// Root directory for per-request scratch files
    pub scratch_dir: PathBuf,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Speech-to-text engine configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// whisper-cli binary (name resolved via PATH, or an absolute path)
    pub binary: PathBuf,

    /// ggml model file
    pub model: PathBuf,

    /// Spoken language code
    pub language: String,

    /// Worker thread count, bounded for stability
    pub threads: u32,
}

/// Text-to-speech engine configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// tts binary
    pub binary: PathBuf,

    /// Model checkpoint
    pub model: PathBuf,

    /// Engine config JSON
    pub config: PathBuf,

    /// Speaker identity
    pub speaker: String,

    /// Optional grapheme-to-phoneme command (program + args)
    pub phonemizer: Option<Vec<String>>,
}

/// LLM backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Backend base URL
    pub base_url: String,

    /// API key; absence degrades the generator rather than failing startup
    pub api_key: Option<String>,

    /// System instruction injected on the first turn of a session
    pub system_instruction: String,
}

impl Config {
    /// Load configuration
    ///
    /// With an explicit `path` the file must exist and parse. Without one the
    /// standard config file is a best-effort overlay on top of defaults.
    /// `GEMINI_API_KEY` in the environment takes precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly given config file can't be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let overlay = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("failed to read {}: {e}", p.display()))
                })?;
                toml::from_str(&content)?
            }
            None => file::load_config_file(),
        };

        Ok(Self::from_overlay(overlay))
    }

    fn from_overlay(overlay: file::SuaraConfigFile) -> Self {
        let data_dir = default_data_dir();

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(overlay.api_keys.gemini);
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not configured, chat responses will be unavailable");
        }

        Self {
            server: ServerConfig {
                host: overlay.server.host.unwrap_or_else(|| "0.0.0.0".to_string()),
                port: overlay.server.port.unwrap_or(8000),
            },
            stt: SttConfig {
                binary: overlay
                    .stt
                    .binary
                    .unwrap_or_else(|| PathBuf::from("whisper-cli")),
                model: overlay
                    .stt
                    .model
                    .unwrap_or_else(|| data_dir.join("models").join("ggml-large-v3-turbo.bin")),
                language: overlay.stt.language.unwrap_or_else(|| "id".to_string()),
                threads: overlay.stt.threads.unwrap_or(4),
            },
            tts: TtsConfig {
                binary: overlay.tts.binary.unwrap_or_else(|| PathBuf::from("tts")),
                model: overlay.tts.model.unwrap_or_else(|| {
                    data_dir.join("coqui").join("checkpoint_1260000-inference.pth")
                }),
                config: overlay
                    .tts
                    .config
                    .unwrap_or_else(|| data_dir.join("coqui").join("config.json")),
                speaker: overlay.tts.speaker.unwrap_or_else(|| "ardi".to_string()),
                phonemizer: overlay.tts.phonemizer,
            },
            llm: LlmConfig {
                model: overlay
                    .llm
                    .model
                    .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
                base_url: overlay
                    .llm
                    .base_url
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                api_key,
                system_instruction: overlay
                    .llm
                    .system_instruction
                    .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            },
            state_dir: overlay.state.dir.unwrap_or_else(|| data_dir.join("state")),
            scratch_dir: overlay
                .state
                .scratch_dir
                .unwrap_or_else(|| std::env::temp_dir().join("suara-gateway")),
        }
    }
}

/// Default data directory: `~/.local/share/suara` (platform equivalent)
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".suara"),
        |d| d.data_dir().join("suara"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config = Config::from_overlay(file::SuaraConfigFile::default());

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.stt.language, "id");
        assert_eq!(config.stt.threads, 4);
        assert_eq!(config.tts.speaker, "ardi");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert!(config.tts.phonemizer.is_none());
    }

    #[test]
    fn overlay_wins_over_defaults() {
        let overlay: file::SuaraConfigFile = toml::from_str(
            r#"
            [server]
            port = 9090

            [stt]
            binary = "/opt/whisper/whisper-cli"
            threads = 2

            [llm]
            model = "gemini-2.5-flash"
            "#,
        )
        .unwrap();

        let config = Config::from_overlay(overlay);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.stt.binary, PathBuf::from("/opt/whisper/whisper-cli"));
        assert_eq!(config.stt.threads, 2);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        // untouched sections keep defaults
        assert_eq!(config.tts.speaker, "ardi");
    }
}
