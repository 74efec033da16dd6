use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use futures::StreamExt;
use serde_json::Value;
use shared::{ChatMessage, CoachChatRequest, Role};

use crate::{
    auth::MaybeUser,
    coaches,
    error::AppError,
    history::{self, Turn},
    openai::WireMessage,
    state::AppState,
};

/// Collects `delta.content` from an SSE byte stream split at arbitrary
/// chunk boundaries.
#[derive(Debug, Default)]
struct DeltaCollector {
    pending: Vec<u8>,
    content: String,
}

impl DeltaCollector {
    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.consume_line(&String::from_utf8_lossy(&line));
        }
    }

    fn consume_line(&mut self, line: &str) {
        let Some(data) = line.trim().strip_prefix("data: ") else {
            return;
        };
        if data == "[DONE]" {
            return;
        }
        if let Ok(event) = serde_json::from_str::<Value>(data) {
            if let Some(piece) = event["choices"][0]["delta"]["content"].as_str() {
                self.content.push_str(piece);
            }
        }
    }

    fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        self.consume_line(&String::from_utf8_lossy(&rest));
        self.content
    }
}

async fn system_prompt_for(state: &AppState, coach_id: &str) -> Result<String, AppError> {
    if let Some(record) = state.db.get_coach(coach_id).await? {
        return Ok(record.system_prompt);
    }
    coaches::by_slug(coach_id)
        .map(|coach| coach.system_prompt.clone())
        .ok_or_else(|| AppError::NotFound("Coach not found".to_string()))
}

/// POST /api/coach-chat. Streams the upstream SSE body back unchanged and
/// appends a final `[DONE]` event once the reply has been stored.
pub async fn coach_chat(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: CoachChatRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON in request body".to_string()))?;
    if req.messages.is_empty() {
        return Err(AppError::BadRequest("Messages array is required".to_string()));
    }
    let coach_id = req
        .coach_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Coach ID is required".to_string()))?;

    let system_prompt = system_prompt_for(&state, &coach_id).await?;
    let mut upstream = vec![WireMessage::new(Role::System, system_prompt)];
    upstream.extend(
        req.messages
            .iter()
            .map(|m| WireMessage::new(m.role, m.content.clone())),
    );

    let resp = state.openai.chat_stream(&upstream).await?;
    tracing::debug!("Streaming reply from {}", coach_id);

    let stream = async_stream::stream! {
        let mut bytes = resp.bytes_stream();
        let mut collector = DeltaCollector::default();

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    collector.push(&chunk);
                    yield Ok::<Bytes, std::io::Error>(chunk);
                }
                Err(e) => {
                    tracing::error!("Upstream stream failed: {}", e);
                    yield Err(std::io::Error::other(e));
                    return;
                }
            }
        }

        let reply = collector.finish();
        if let Some(user) = &user {
            if !reply.is_empty() {
                let mut messages = req.messages.clone();
                messages.push(ChatMessage {
                    timestamp: Some(Utc::now()),
                    ..ChatMessage::assistant(reply)
                });
                let turn = Turn {
                    user_id: &user.id,
                    coach_id: &coach_id,
                    session_id: req.session_id.as_deref(),
                    messages: &messages,
                    context: None,
                };
                if let Err(e) = history::record_turn(&state.db, turn).await {
                    tracing::error!("Failed to save streamed session: {}", e);
                }
            }
        }

        yield Ok(Bytes::from_static(b"data: [DONE]\n\n"));
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::CONNECTION, "keep-alive"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
