//! TOML configuration file loading
//!
//! Supports `~/.config/suara/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SuaraConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Speech-to-text engine configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Text-to-speech engine configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// LLM backend configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// State/storage configuration
    #[serde(default)]
    pub state: StateFileConfig,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Bind address (e.g. "0.0.0.0")
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,
}

/// Speech-to-text engine configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// Path to the whisper-cli binary
    pub binary: Option<PathBuf>,

    /// Path to the ggml model file
    pub model: Option<PathBuf>,

    /// Spoken language code (e.g. "id")
    pub language: Option<String>,

    /// Worker thread count for the engine
    pub threads: Option<u32>,
}

/// Text-to-speech engine configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Path to the tts binary
    pub binary: Option<PathBuf>,

    /// Path to the model checkpoint
    pub model: Option<PathBuf>,

    /// Path to the engine config JSON
    pub config: Option<PathBuf>,

    /// Speaker identity (e.g. "ardi")
    pub speaker: Option<String>,

    /// Grapheme-to-phoneme command (program + args), reads text on
    /// stdin and writes the phonetic form on stdout
    pub phonemizer: Option<Vec<String>>,
}

/// LLM backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gemini-2.0-flash")
    pub model: Option<String>,

    /// Backend base URL
    pub base_url: Option<String>,

    /// System instruction override
    pub system_instruction: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub gemini: Option<String>,
}

/// State/storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StateFileConfig {
    /// Directory for persisted conversation histories
    pub dir: Option<PathBuf>,

    /// Directory for per-request scratch files
    pub scratch_dir: Option<PathBuf>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SuaraConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> SuaraConfigFile {
    let Some(path) = config_file_path() else {
        return SuaraConfigFile::default();
    };

    if !path.exists() {
        return SuaraConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                SuaraConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            SuaraConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/suara/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("suara").join("config.toml"))
}
