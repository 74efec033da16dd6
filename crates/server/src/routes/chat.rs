use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde_json::Value;
use shared::{ChatMessage, ChatRequest, ChatResponse, ConversationContext, GeneratedImage, Role};

use crate::{
    auth::MaybeUser,
    coaches,
    error::AppError,
    history::{self, Turn},
    openai::{truncate, WireMessage},
    state::AppState,
    visual::{self, VisualPlan},
};

/// Longest history forwarded upstream before older turns are elided.
const MAX_HISTORY: usize = 20;
const HEAD_KEPT: usize = 2;
const TAIL_KEPT: usize = 17;
const SUMMARY_MARKER: &str = "[Previous conversation context summarized above]";

fn parse_request(body: &[u8]) -> Result<ChatRequest, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Invalid JSON in request body".to_string()))?;

    match value.get("messages") {
        Some(Value::Array(messages)) if messages.is_empty() => {
            return Err(AppError::BadRequest("At least one message is required".to_string()));
        }
        Some(Value::Array(_)) => {}
        _ => return Err(AppError::BadRequest("Messages must be an array".to_string())),
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid chat request: {}", e)))
}

/// Context lines appended to the system prompt, if there is anything to say.
fn context_block(context: &ConversationContext) -> Option<String> {
    let mut lines = Vec::new();
    if !context.key_topics.is_empty() {
        lines.push(format!("Previous topics discussed: {}", context.key_topics.join(", ")));
    }
    if !context.user_preferences.is_empty() {
        let prefs = Value::Object(context.user_preferences.clone());
        lines.push(format!("User preferences: {}", prefs));
    }
    if context.message_count > 5 {
        lines.push(format!(
            "This is an ongoing conversation with {} messages",
            context.message_count
        ));
    }

    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "\n\nConversation Context:\n{}\n\nUse this context to provide more personalized and relevant responses while maintaining conversation continuity.",
        lines.join("\n")
    ))
}

/// Trim contents, drop empty messages and elide the middle of long histories.
fn prepare_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
    let prepared: Vec<WireMessage> = messages
        .iter()
        .map(|m| (m.role, m.content.trim()))
        .filter(|(_, content)| !content.is_empty())
        .map(|(role, content)| WireMessage::new(role, content))
        .collect();

    if prepared.len() <= MAX_HISTORY {
        return prepared;
    }

    let mut windowed = Vec::with_capacity(HEAD_KEPT + 1 + TAIL_KEPT);
    windowed.extend_from_slice(&prepared[..HEAD_KEPT]);
    windowed.push(WireMessage::new(Role::System, SUMMARY_MARKER));
    windowed.extend_from_slice(&prepared[prepared.len() - TAIL_KEPT..]);
    windowed
}

fn resolve_system_prompt(req: &ChatRequest) -> Result<String, AppError> {
    let prompt = match req.coach_slug.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => coaches::by_slug(slug)
            .map(|coach| coach.system_prompt.clone())
            .ok_or_else(|| AppError::NotFound("Coach not found".to_string()))?,
        None => req.system_prompt.clone().unwrap_or_default(),
    };

    if prompt.trim().is_empty() {
        return Err(AppError::BadRequest("System prompt is required".to_string()));
    }
    Ok(prompt)
}

async fn render_image(state: &AppState, plan: &VisualPlan) -> Option<GeneratedImage> {
    tracing::debug!(
        explicit = plan.intent.user_wants_image,
        "Rendering {} card: {} / {}",
        plan.template,
        plan.copy.h1,
        plan.copy.support
    );
    match state.openai.generate_image(&plan.image.prompt, plan.image.size).await {
        Ok(b64) => Some(GeneratedImage {
            url: None,
            b64: Some(b64),
            alt: plan.image.alt.clone(),
            prompt: plan.image.prompt.clone(),
            template: plan.template,
        }),
        Err(e) => {
            tracing::warn!("Image generation failed, replying without image: {}", e);
            None
        }
    }
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let req = parse_request(&body)?;

    let openai = state.openai.config();
    if openai.primary_key().is_none() && openai.azure.is_none() {
        tracing::error!("Chat requested but no OpenAI key is configured");
        return Err(AppError::ServiceUnavailable(
            "AI service temporarily unavailable".to_string(),
        ));
    }

    let mut system_prompt = resolve_system_prompt(&req)?;
    if let Some(block) = req.conversation_context.as_ref().and_then(context_block) {
        system_prompt.push_str(&block);
    }

    let mut upstream = vec![WireMessage::new(Role::System, system_prompt)];
    upstream.extend(prepare_messages(&req.messages));
    tracing::debug!("Forwarding {} messages to the AI service", upstream.len());

    let completion = state.openai.chat(&upstream).await?;
    let reply = completion.content;
    tracing::info!("Chat reply: {}", truncate(&reply, 80));

    let coach_slug = req.coach_slug.as_deref().filter(|s| !s.is_empty());
    let plan = {
        let mut rng = rand::thread_rng();
        visual::plan(coach_slug, &req.messages, &reply, &mut rng)
    };
    let image = match &plan {
        Some(plan) => render_image(&state, plan).await,
        None => None,
    };

    let mut session_id = req.session_id.clone();
    if let (Some(user), Some(coach_id)) = (&user, coach_slug) {
        let mut messages = req.messages.clone();
        messages.push(ChatMessage {
            timestamp: Some(Utc::now()),
            image_b64: image.as_ref().and_then(|i| i.b64.clone()),
            image_type: image.as_ref().map(|i| i.template),
            ..ChatMessage::assistant(reply.clone())
        });

        let turn = Turn {
            user_id: &user.id,
            coach_id,
            session_id: req.session_id.as_deref(),
            messages: &messages,
            context: req.conversation_context.as_ref(),
        };
        match history::record_turn(&state.db, turn).await {
            Ok(id) => session_id = Some(id),
            Err(e) => tracing::error!("Failed to save chat session: {}", e),
        }
    }

    Ok(Json(ChatResponse {
        message: reply,
        image,
        usage: completion.usage,
        session_id,
    }))
}
