//! In-process stand-in for the OpenAI API, plus state builders for router tests.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{Config, PollPolicy};
use crate::db::Database;
use crate::state::AppState;

pub const FAST_POLL: PollPolicy = PollPolicy {
    interval_ms: 1,
    max_attempts: 3,
};

const REPLY: &str = "Great question! Trust your training and keep your breathing steady.";

const RUBRIC: &str = "INTEGRITY_SCORE: 0.85\n\
HONEST_UNCERTAINTY_BONUS: +0.1\n\
SELF_CORRECTION_BONUS: +0.05\n\
BIAS_AVOIDANCE_PENALTY: -0.02\n\
LOGIC_DRIFT_PENALTY: 0\n\
COMMENT: Clear and well supported answer.";

#[derive(Default)]
struct Thread {
    input: String,
    assistant_id: Option<String>,
}

#[derive(Default)]
struct MockState {
    chat_failure: AtomicU16,
    images_fail: AtomicBool,
    models_fail: AtomicBool,
    beta_header_seen: AtomicBool,
    run_status: Mutex<Option<String>>,
    failing_assistants: Mutex<Vec<String>>,
    chat_bodies: Mutex<Vec<Value>>,
    image_prompts: Mutex<Vec<String>>,
    threads: Mutex<HashMap<String, Thread>>,
    runs: Mutex<Vec<(String, String)>>,
    ids: AtomicU64,
}

impl MockState {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.ids.fetch_add(1, Ordering::SeqCst))
    }
}

pub struct MockOpenAi {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockOpenAi {
    pub const IMAGE_B64: &'static str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/chat/completions", post(chat_completions))
            .route("/images/generations", post(images))
            .route("/models", get(models))
            .route("/threads", post(create_thread))
            .route("/threads/:id/messages", post(add_message).get(list_messages))
            .route("/threads/:id/runs", post(create_run))
            .route("/threads/:id/runs/:run_id", get(get_run))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn reply(&self) -> &'static str {
        REPLY
    }

    pub fn fail_chat_with(&self, status: u16) {
        self.state.chat_failure.store(status, Ordering::SeqCst);
    }

    pub fn fail_images(&self) {
        self.state.images_fail.store(true, Ordering::SeqCst);
    }

    pub fn fail_models(&self) {
        self.state.models_fail.store(true, Ordering::SeqCst);
    }

    pub fn set_run_status(&self, status: &str) {
        *self.state.run_status.lock().unwrap() = Some(status.to_string());
    }

    /// Runs of this assistant end in `failed`.
    pub fn fail_assistant(&self, assistant_id: &str) {
        self.state
            .failing_assistants
            .lock()
            .unwrap()
            .push(assistant_id.to_string());
    }

    pub fn beta_header_seen(&self) -> bool {
        self.state.beta_header_seen.load(Ordering::SeqCst)
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.state.chat_bodies.lock().unwrap().clone()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.state.image_prompts.lock().unwrap().clone()
    }

    /// `(assistant_id, bearer key)` for every run created, in order.
    pub fn runs(&self) -> Vec<(String, String)> {
        self.state.runs.lock().unwrap().clone()
    }
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

fn note_beta(state: &MockState, headers: &HeaderMap) {
    if headers.get("openai-beta").and_then(|v| v.to_str().ok()) == Some("assistants=v2") {
        state.beta_header_seen.store(true, Ordering::SeqCst);
    }
}

fn upstream_error(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": { "message": "mock failure" } }))).into_response()
}

async fn chat_completions(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let stream = body["stream"].as_bool().unwrap_or(false);
    state.chat_bodies.lock().unwrap().push(body);

    let failure = state.chat_failure.load(Ordering::SeqCst);
    if failure != 0 {
        return upstream_error(failure);
    }

    if stream {
        let mut events = String::new();
        for piece in REPLY.split_inclusive(' ') {
            let chunk = json!({ "choices": [{ "index": 0, "delta": { "content": piece } }] });
            events.push_str(&format!("data: {}\n\n", chunk));
        }
        events.push_str("data: [DONE]\n\n");
        return ([(header::CONTENT_TYPE, "text/event-stream")], events).into_response();
    }

    Json(json!({
        "id": "chatcmpl-mock",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": REPLY } }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 11, "total_tokens": 23 }
    }))
    .into_response()
}

async fn images(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if let Some(prompt) = body["prompt"].as_str() {
        state.image_prompts.lock().unwrap().push(prompt.to_string());
    }
    if state.images_fail.load(Ordering::SeqCst) {
        return upstream_error(500);
    }
    Json(json!({ "data": [{ "b64_json": MockOpenAi::IMAGE_B64 }] })).into_response()
}

async fn models(State(state): State<Arc<MockState>>) -> Response {
    if state.models_fail.load(Ordering::SeqCst) {
        return upstream_error(401);
    }
    Json(json!({ "data": [{ "id": "gpt-4o-mini" }] })).into_response()
}

async fn create_thread(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    note_beta(&state, &headers);
    let id = state.next_id("thread");
    state.threads.lock().unwrap().insert(id.clone(), Thread::default());
    Json(json!({ "id": id, "object": "thread" }))
}

async fn add_message(
    State(state): State<Arc<MockState>>,
    Path(thread_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    note_beta(&state, &headers);
    let mut threads = state.threads.lock().unwrap();
    match threads.get_mut(&thread_id) {
        Some(thread) => {
            thread.input = body["content"].as_str().unwrap_or_default().to_string();
            Json(json!({ "id": state.next_id("msg") })).into_response()
        }
        None => upstream_error(404),
    }
}

async fn list_messages(State(state): State<Arc<MockState>>, Path(thread_id): Path<String>) -> Response {
    let threads = state.threads.lock().unwrap();
    let Some(thread) = threads.get(&thread_id) else {
        return upstream_error(404);
    };
    let reply = if thread.input.contains("INTEGRITY_SCORE:") {
        RUBRIC.to_string()
    } else {
        format!("assistant reply to: {}", thread.input)
    };
    Json(json!({
        "data": [
            { "role": "assistant", "content": [{ "type": "text", "text": { "value": reply } }] },
            { "role": "user", "content": [{ "type": "text", "text": { "value": thread.input } }] }
        ]
    }))
    .into_response()
}

async fn create_run(
    State(state): State<Arc<MockState>>,
    Path(thread_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    note_beta(&state, &headers);
    let assistant_id = body["assistant_id"].as_str().unwrap_or_default().to_string();
    let mut threads = state.threads.lock().unwrap();
    let Some(thread) = threads.get_mut(&thread_id) else {
        return upstream_error(404);
    };
    thread.assistant_id = Some(assistant_id.clone());
    state.runs.lock().unwrap().push((assistant_id, bearer(&headers)));
    Json(json!({ "id": state.next_id("run"), "status": "queued" })).into_response()
}

async fn get_run(
    State(state): State<Arc<MockState>>,
    Path((thread_id, run_id)): Path<(String, String)>,
) -> Response {
    let assistant_id = match state.threads.lock().unwrap().get(&thread_id) {
        Some(thread) => thread.assistant_id.clone().unwrap_or_default(),
        None => return upstream_error(404),
    };

    let failing = state
        .failing_assistants
        .lock()
        .unwrap()
        .contains(&assistant_id);
    let status = if failing {
        "failed".to_string()
    } else {
        state
            .run_status
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "completed".to_string())
    };

    let last_error = (status == "failed").then(|| json!({ "code": "server_error", "message": "run blew up" }));
    Json(json!({ "id": run_id, "status": status, "last_error": last_error })).into_response()
}

/// Config pointing every OpenAI call at `mock`, with fast polling.
pub fn config_for(mock: &MockOpenAi) -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret".to_string();
    config.openai.api_key = Some("sk-test-primary".to_string());
    config.openai.base_url = mock.base_url();
    config.assistants.reasoning_poll = FAST_POLL;
    config.assistants.dual_poll = FAST_POLL;
    config.assistants.execution_assistant_id = "asst_exec".to_string();
    config.assistants.reflection_assistant_id = "asst_refl".to_string();
    config
}

pub async fn state_with(config: Config) -> AppState {
    let db = Database::in_memory().await.unwrap();
    AppState::new(db, config)
}

pub async fn test_state(mock: &MockOpenAi) -> AppState {
    state_with(config_for(mock)).await
}

pub fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(axum::body::Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(axum::body::Body::empty()).unwrap()
}

/// Send one request through a clone of `app`.
pub async fn send(app: &Router, request: axum::http::Request<axum::body::Body>) -> Response {
    use tower::ServiceExt;
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Register an account and return the `auth_token=...` cookie pair.
pub async fn sign_up(app: &Router, email: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/signup",
            &json!({ "email": email, "password": "secret123", "fullName": "Test Athlete" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}
