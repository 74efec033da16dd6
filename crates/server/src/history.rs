//! Persistence of chat turns into `coach_sessions`.

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use shared::{ChatMessage, ConversationContext, SessionDetail, SessionSummary};
use uuid::Uuid;

use crate::db::{self, CoachSession, Database};
use crate::openai::truncate;

const TRACKED_SPORTS: [&str; 7] = [
    "basketball",
    "football",
    "soccer",
    "tennis",
    "volleyball",
    "track",
    "swimming",
];

/// Messages scanned when refreshing the conversation context.
const CONTEXT_WINDOW: usize = 10;

/// One completed exchange: the conversation as the client sent it, with
/// the assistant's reply appended.
pub struct Turn<'a> {
    pub user_id: &'a str,
    pub coach_id: &'a str,
    pub session_id: Option<&'a str>,
    pub messages: &'a [ChatMessage],
    pub context: Option<&'a ConversationContext>,
}

pub fn title_for(messages: &[ChatMessage]) -> String {
    let first = messages
        .first()
        .map(|m| m.content.as_str())
        .filter(|c| !c.is_empty())
        .unwrap_or("New Session");
    format!("{}...", truncate(first, 50))
}

/// Keep the stored history append-only. An incoming list that extends the
/// stored one contributes only its new messages; anything else contributes
/// just its final exchange.
pub fn merge_history(stored: Vec<ChatMessage>, incoming: &[ChatMessage]) -> Vec<ChatMessage> {
    let extends = incoming.len() >= stored.len()
        && stored
            .iter()
            .zip(incoming)
            .all(|(kept, sent)| kept.role == sent.role && kept.content == sent.content);

    let start = if extends {
        stored.len()
    } else {
        incoming.len().saturating_sub(2)
    };
    let mut merged = stored;
    merged.extend_from_slice(&incoming[start..]);
    merged
}

/// Refresh the advisory context from the latest messages, keeping what the
/// client already knew.
pub fn derive_context(messages: &[ChatMessage], client: Option<&ConversationContext>) -> ConversationContext {
    let mut context = client.cloned().unwrap_or_default();
    let recent = &messages[messages.len().saturating_sub(CONTEXT_WINDOW)..];

    for message in recent {
        let content = message.content.to_lowercase();
        for sport in TRACKED_SPORTS {
            if content.contains(sport) && !context.key_topics.iter().any(|t| t == sport) {
                context.key_topics.push(sport.to_string());
            }
        }

        if content.contains("prefer") || content.contains("like") {
            if content.contains("morning") {
                context
                    .user_preferences
                    .insert("timePreference".to_string(), Value::from("morning"));
            }
            if content.contains("evening") {
                context
                    .user_preferences
                    .insert("timePreference".to_string(), Value::from("evening"));
            }
        }
    }

    context.message_count = messages.len();
    context.last_activity = Some(Utc::now());
    context
}

/// Store `turn`, returning the id of the session it landed in. An unknown
/// `session_id` starts a new session rather than touching another row.
pub async fn record_turn(db: &Database, turn: Turn<'_>) -> Result<String> {
    let now = db::now();

    if let Some(id) = turn.session_id {
        if let Some(mut existing) = db.get_coach_session(id, turn.user_id).await? {
            let stored = parse_messages(&existing.messages);
            let merged = merge_history(stored, turn.messages);
            let context = derive_context(&merged, turn.context);

            existing.messages = serde_json::to_string(&merged)?;
            existing.conversation_context = Some(serde_json::to_string(&context)?);
            existing.message_count = merged.len() as i64;
            existing.updated_at = Some(now);
            db.update_coach_session(&existing).await?;
            tracing::debug!("Updated session {} ({} messages)", id, merged.len());
            return Ok(existing.id);
        }
        tracing::warn!("Session {} not found for user {}, starting a new one", id, turn.user_id);
    }

    let context = derive_context(turn.messages, turn.context);
    let session = CoachSession {
        id: Uuid::new_v4().to_string(),
        user_id: turn.user_id.to_string(),
        coach_id: turn.coach_id.to_string(),
        title: title_for(turn.messages),
        messages: serde_json::to_string(turn.messages)?,
        conversation_context: Some(serde_json::to_string(&context)?),
        message_count: turn.messages.len() as i64,
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };
    db.create_coach_session(&session).await?;
    tracing::info!("Created session {} with {}", session.id, session.coach_id);
    Ok(session.id)
}

fn parse_messages(raw: &str) -> Vec<ChatMessage> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!("Discarding unreadable session history: {}", e);
        Vec::new()
    })
}

pub fn summary(session: &CoachSession) -> SessionSummary {
    SessionSummary {
        id: session.id.clone(),
        coach_id: session.coach_id.clone(),
        title: session.title.clone(),
        message_count: session.message_count,
        created_at: session.created_at.clone(),
        updated_at: session.updated_at.clone(),
    }
}

pub fn detail(session: CoachSession) -> SessionDetail {
    let conversation_context = session
        .conversation_context
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());
    SessionDetail {
        summary: summary(&session),
        messages: parse_messages(&session.messages),
        conversation_context,
    }
}
