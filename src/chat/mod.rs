//! Language-response generation with durable multi-turn state
//!
//! A [`ChatSession`] owns the ordered turn list for one conversation. The
//! first exchange on a fresh session records the system instruction exactly
//! once; every exchange appends the user turn and the backend's reply, then
//! persists best-effort. Sessions are handed out by [`SessionManager`], which
//! serializes concurrent callers per session identity.

pub mod history;
pub mod store;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

pub use history::{Role, Turn};
pub use store::HistoryStore;

use crate::config::LlmConfig;

/// Errors from the language-generation stage
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backend misconfigured or unreachable; permanent until reconfigured
    #[error("language backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend call failed mid-exchange
    #[error("language backend failure: {0}")]
    BackendFailure(String),
}

/// A successful generation result
#[derive(Debug, Clone)]
pub struct Reply {
    /// The assistant's reply text
    pub text: String,
    /// True when the exchange succeeded but persisting the updated history
    /// failed; the in-memory state remains authoritative
    pub persist_degraded: bool,
}

/// Client for a Gemini-style generateContent REST backend
#[derive(Debug, Clone)]
pub struct GenerateBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<WireContent<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateBackend {
    /// Create a backend client. A missing API key does not fail here; every
    /// exchange will report `BackendUnavailable` instead.
    #[must_use]
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }

    /// Build a backend from LLM config
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
        )
    }

    /// Send the full turn history and return the model's reply text
    async fn generate(&self, turns: &[Turn]) -> Result<String, GenerationError> {
        let Some(api_key) = &self.api_key else {
            return Err(GenerationError::BackendUnavailable(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        };

        let request = GenerateRequest {
            contents: turns
                .iter()
                .map(|t| WireContent {
                    role: t.role.wire_name(),
                    parts: vec![WirePart { text: &t.content }],
                })
                .collect(),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    GenerationError::BackendUnavailable(e.to_string())
                } else {
                    GenerationError::BackendFailure(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "backend error");
            return Err(GenerationError::BackendFailure(format!(
                "backend error {status}: {body}"
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::BackendFailure(format!("malformed response: {e}")))?;

        let reply: String = result
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let reply = reply.trim();

        if reply.is_empty() {
            return Err(GenerationError::BackendFailure(
                "backend returned no candidate text".to_string(),
            ));
        }

        Ok(reply.to_string())
    }
}

/// One conversation with durable history
#[derive(Debug)]
pub struct ChatSession {
    backend: GenerateBackend,
    system_instruction: Option<String>,
    store: HistoryStore,
    turns: Vec<Turn>,
}

impl ChatSession {
    /// Restore a session from its persisted history, or start fresh when the
    /// history file is missing, empty, or malformed
    #[must_use]
    pub fn restore(
        backend: GenerateBackend,
        system_instruction: Option<String>,
        store: HistoryStore,
    ) -> Self {
        let turns = store.load().unwrap_or_default();
        if turns.is_empty() {
            tracing::info!(path = %store.path().display(), "starting fresh chat session");
        } else {
            tracing::info!(
                path = %store.path().display(),
                turns = turns.len(),
                "restored chat session"
            );
        }

        Self {
            backend,
            system_instruction,
            store,
            turns,
        }
    }

    /// Whether at least one turn has been exchanged
    #[must_use]
    pub fn is_warm(&self) -> bool {
        !self.turns.is_empty()
    }

    /// Current turn history
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Exchange one user message for a reply
    ///
    /// On a fresh session the configured system instruction is recorded first,
    /// exactly once for the conversation's lifetime. On success the user and
    /// assistant turns are appended and the history is persisted best-effort;
    /// on failure the turn list is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the backend is unavailable or fails.
    pub async fn respond(&mut self, user_text: &str) -> Result<Reply, GenerationError> {
        tracing::info!(prompt = %user_text, "processing user prompt");

        let checkpoint = self.turns.len();

        if self.turns.is_empty() {
            if let Some(instruction) = &self.system_instruction {
                tracing::debug!("injecting system instruction into fresh session");
                self.turns.push(Turn::system(instruction.clone()));
            }
        }
        self.turns.push(Turn::user(user_text));

        let reply_text = match self.backend.generate(&self.turns).await {
            Ok(text) => text,
            Err(e) => {
                self.turns.truncate(checkpoint);
                return Err(e);
            }
        };

        self.turns.push(Turn::assistant(reply_text.clone()));
        tracing::info!(reply = %reply_text, "backend reply received");

        let persist_degraded = match self.store.save(&self.turns) {
            Ok(()) => false,
            Err(e) => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    error = %e,
                    "failed to persist history, continuing with in-memory state"
                );
                true
            }
        };

        Ok(Reply {
            text: reply_text,
            persist_degraded,
        })
    }
}

/// Hands out per-identity chat sessions, each behind its own lock
///
/// Concurrent requests against the same session identity queue on the
/// session mutex rather than interleaving turns.
pub struct SessionManager {
    backend: GenerateBackend,
    system_instruction: Option<String>,
    state_dir: PathBuf,
    sessions: RwLock<HashMap<String, Arc<Mutex<ChatSession>>>>,
}

impl SessionManager {
    /// Create a manager persisting histories under `state_dir`
    #[must_use]
    pub fn new(config: &LlmConfig, state_dir: PathBuf) -> Self {
        Self {
            backend: GenerateBackend::from_config(config),
            system_instruction: Some(config.system_instruction.clone())
                .filter(|s| !s.is_empty()),
            state_dir,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the session for an identity, restoring it from disk on first use
    pub async fn session(&self, id: &str) -> Arc<Mutex<ChatSession>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        // racing caller may have inserted meanwhile
        if let Some(session) = sessions.get(id) {
            return Arc::clone(session);
        }

        let store = HistoryStore::new(self.state_dir.join(format!("history.{id}.json")));
        let session = Arc::new(Mutex::new(ChatSession::restore(
            self.backend.clone(),
            self.system_instruction.clone(),
            store,
        )));
        sessions.insert(id.to_string(), Arc::clone(&session));
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable_backend() -> GenerateBackend {
        GenerateBackend::new(
            "http://127.0.0.1:9".to_string(),
            "gemini-2.0-flash".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn missing_api_key_is_permanently_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.json"));
        let mut session =
            ChatSession::restore(unavailable_backend(), Some("instr".to_string()), store);

        for _ in 0..2 {
            let err = session.respond("halo").await.unwrap_err();
            assert!(matches!(err, GenerationError::BackendUnavailable(_)));
        }

        // failed exchanges leave no turns behind
        assert!(!session.is_warm());
    }

    #[tokio::test]
    async fn restore_tolerates_corrupt_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        std::fs::write(&path, "{{{").unwrap();

        let session = ChatSession::restore(
            unavailable_backend(),
            Some("instr".to_string()),
            HistoryStore::new(path),
        );
        assert!(!session.is_warm());
    }

    #[tokio::test]
    async fn manager_returns_same_handle_for_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = LlmConfig {
            model: "gemini-2.0-flash".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            system_instruction: "instr".to_string(),
        };
        let manager = SessionManager::new(&config, dir.path().to_path_buf());

        let a = manager.session("default").await;
        let b = manager.session("default").await;
        assert!(Arc::ptr_eq(&a, &b));

        let c = manager.session("other").await;
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
