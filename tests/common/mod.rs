//! Shared test helpers: a stub generateContent backend and fake engine
//! binaries, so pipeline behavior is testable without real models

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Captured state of the stub LLM backend
pub struct StubBackend {
    /// Canned reply text
    pub reply: String,
    /// Request bodies received, in order
    pub requests: Mutex<Vec<Value>>,
}

async fn generate(State(stub): State<Arc<StubBackend>>, Json(body): Json<Value>) -> Json<Value> {
    stub.requests.lock().unwrap().push(body);
    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": stub.reply }]
            }
        }]
    }))
}

/// Spawn a stub generateContent backend returning `reply` for every exchange.
/// Returns the base URL and a handle to the captured requests.
pub async fn spawn_backend(reply: &str) -> (String, Arc<StubBackend>) {
    let stub = Arc::new(StubBackend {
        reply: reply.to_string(),
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1beta/models/{model}", post(generate))
        .with_state(Arc::clone(&stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), stub)
}

/// Spawn a stub backend that fails every exchange with HTTP 500
pub async fn spawn_failing_backend() -> String {
    let app = Router::new().route(
        "/v1beta/models/{model}",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Write a fake whisper-cli that emits `transcript` as its text artifact.
/// Argument 7 is the `-of` output base in the adapter's invocation.
pub fn write_fake_stt(dir: &Path, transcript: &str) -> PathBuf {
    assert!(!transcript.contains('\''), "transcript must be shell-safe");
    let path = dir.join("fake-whisper-cli");
    let script = format!("#!/bin/sh\nprintf '%s\\n' '{transcript}' > \"$7.txt\"\n");
    std::fs::write(&path, script).unwrap();
    make_executable(&path);
    path
}

/// Write a fake tts binary that copies `src_wav` to its `--out_path`
/// (argument 10 in the adapter's invocation)
pub fn write_fake_tts(dir: &Path, src_wav: &Path) -> PathBuf {
    let path = dir.join("fake-tts");
    let script = format!("#!/bin/sh\ncp '{}' \"${{10}}\"\n", src_wav.display());
    std::fs::write(&path, script).unwrap();
    make_executable(&path);
    path
}

/// Write a short valid mono WAV file
pub fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..2205 {
        writer
            .write_sample(i16::try_from(i % 128).unwrap())
            .unwrap();
    }
    writer.finalize().unwrap();
}
