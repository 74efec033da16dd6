use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{AssistantFailure, PromptRequest};

use crate::{
    pipeline::{self, PipelineError},
    state::AppState,
};

/// `success: false` envelope carrying the request id.
#[derive(Debug)]
struct Failure {
    status: StatusCode,
    body: AssistantFailure,
}

impl Failure {
    fn new(status: StatusCode, request_id: &str, error: &str, details: Option<String>) -> Self {
        Self {
            status,
            body: AssistantFailure {
                success: false,
                error: error.to_string(),
                details,
                request_id: request_id.to_string(),
            },
        }
    }

    fn bad_request(request_id: &str, error: &str, details: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, request_id, error, details)
    }

    /// `failed` names the workflow step reported for execution errors.
    fn from_pipeline(err: PipelineError, request_id: &str, failed: &str) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        match err {
            PipelineError::MissingKey => Self::new(
                status,
                request_id,
                &err.to_string(),
                Some("Please set OPENAI_API_KEY environment variable".to_string()),
            ),
            PipelineError::InvalidKeyFormat => Self::new(
                status,
                request_id,
                &err.to_string(),
                Some("API key must start with 'sk-'".to_string()),
            ),
            PipelineError::Connection(ref e) => Self::new(
                status,
                request_id,
                "OpenAI connection failed",
                Some(e.to_string()),
            ),
            PipelineError::Execution(_) | PipelineError::TimedOut(_) => {
                Self::new(status, request_id, failed, Some(err.to_string()))
            }
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        tracing::warn!(
            request_id = %self.body.request_id,
            "Assistant request failed: {}",
            self.body.error
        );
        no_cache(self.status, self.body)
    }
}

fn no_cache<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CACHE_CONTROL, "no-cache")], Json(body)).into_response()
}

fn read_prompt(body: &[u8], request_id: &str) -> Result<String, Failure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Failure::bad_request(request_id, "Empty request body", None));
    }
    let req: PromptRequest = serde_json::from_slice(body).map_err(|e| {
        Failure::bad_request(request_id, "Invalid JSON in request", Some(e.to_string()))
    })?;

    req.prompt
        .as_ref()
        .and_then(|p| p.as_str())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Failure::bad_request(
                request_id,
                "Invalid prompt",
                Some("Prompt must be a non-empty string".to_string()),
            )
        })
}

/// POST /api/reasoning-pipeline
pub async fn reasoning_pipeline(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = pipeline::request_id();
    let prompt = match read_prompt(&body, &request_id) {
        Ok(prompt) => prompt,
        Err(failure) => return failure.into_response(),
    };

    match pipeline::reason(&state.openai, &state.config.assistants, &prompt, &request_id).await {
        Ok(result) => no_cache(StatusCode::OK, result),
        Err(e) => Failure::from_pipeline(e, &request_id, "Reasoning pipeline failed").into_response(),
    }
}

/// POST /api/dual-assistant
pub async fn dual_assistant(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = pipeline::request_id();
    let prompt = match read_prompt(&body, &request_id) {
        Ok(prompt) => prompt,
        Err(failure) => return failure.into_response(),
    };

    match pipeline::dual(&state.openai, &state.config.assistants, &prompt, &request_id).await {
        Ok(result) => no_cache(StatusCode::OK, result),
        Err(e) => Failure::from_pipeline(e, &request_id, "Execution assistant failed").into_response(),
    }
}
