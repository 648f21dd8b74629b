//! Voice-chat endpoint: multipart audio in, JSON bundle out

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Serialize;

use super::ApiState;
use crate::pipeline::{PipelineOutcome, Stage};

/// Voice clips recorded in a browser stay well under this
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/voice-chat", post(voice_chat))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Successful voice-chat response
#[derive(Debug, Serialize)]
struct VoiceChatResponse {
    /// Base64-encoded WAV bytes
    audio: String,
    audio_filename: String,
    transcript: String,
    response_text: String,
}

/// Error response; partial fields are populated with whatever the pipeline
/// produced before failing
#[derive(Debug, Serialize)]
struct VoiceChatError {
    error: String,
    transcript: String,
    response_text: String,
}

impl VoiceChatError {
    fn bad_request(error: impl Into<String>) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                error: error.into(),
                transcript: String::new(),
                response_text: String::new(),
            }),
        )
            .into_response()
    }
}

/// Process one voice-chat exchange
///
/// Accepts a multipart form with a `file` field (the recorded clip) and an
/// optional `session` field selecting the conversation.
async fn voice_chat(State(state): State<Arc<ApiState>>, mut multipart: Multipart) -> Response {
    let mut audio: Option<(Vec<u8>, String)> = None;
    let mut session = "default".to_string();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "malformed multipart upload");
                return VoiceChatError::bad_request(format!("malformed upload: {e}"));
            }
        };

        match field.name() {
            Some("file") => {
                let ext = field
                    .file_name()
                    .and_then(|name| name.rsplit_once('.').map(|(_, e)| e.to_string()))
                    .unwrap_or_else(|| "wav".to_string());
                match field.bytes().await {
                    Ok(bytes) => audio = Some((bytes.to_vec(), ext)),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read upload body");
                        return VoiceChatError::bad_request(format!("failed to read upload: {e}"));
                    }
                }
            }
            Some("session") => {
                if let Ok(value) = field.text().await {
                    session = sanitize_session_id(&value);
                }
            }
            _ => {}
        }
    }

    let Some((bytes, ext)) = audio else {
        return VoiceChatError::bad_request("missing file field");
    };

    let outcome = state.pipeline.handle_voice_chat(&bytes, &ext, &session).await;

    match outcome {
        PipelineOutcome::Success {
            audio,
            transcript,
            reply,
        } => Json(VoiceChatResponse {
            audio: BASE64_STANDARD.encode(audio),
            audio_filename: "response.wav".to_string(),
            transcript,
            response_text: reply,
        })
        .into_response(),
        PipelineOutcome::Failure {
            stage,
            error,
            transcript,
            reply,
        } => {
            let status = if stage == Stage::Input {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::error!(stage = %stage, error = %error, "voice chat failed");
            (
                status,
                Json(VoiceChatError {
                    error: format!("{stage} stage failed: {error}"),
                    transcript,
                    response_text: reply,
                }),
            )
                .into_response()
        }
    }
}

/// Restrict session identities to filesystem-safe names
fn sanitize_session_id(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}
