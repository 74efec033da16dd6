use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Chat
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One message in a coach conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_b64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<VisualTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Client-maintained conversation summary sent alongside chat requests
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub user_preferences: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_summary: Option<String>,
}

/// POST /api/chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub coach_slug: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub conversation_context: Option<ConversationContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub image: Option<GeneratedImage>,
    pub usage: Option<serde_json::Value>,
    pub session_id: Option<String>,
}

/// Image attached to an assistant reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64: Option<String>,
    pub alt: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub template: VisualTemplate,
}

/// POST /api/coach-chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub coach_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

// ============================================================================
// Positive-messaging visuals
// ============================================================================

/// Layout category for a generated motivational card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VisualTemplate {
    AffirmationCard,
    ConfidenceBoost,
    ProcessCue,
    BelongingTile,
    AutonomyChoice,
    MindsetMicro,
}

impl VisualTemplate {
    pub const ALL: [VisualTemplate; 6] = [
        VisualTemplate::AffirmationCard,
        VisualTemplate::ConfidenceBoost,
        VisualTemplate::ProcessCue,
        VisualTemplate::BelongingTile,
        VisualTemplate::AutonomyChoice,
        VisualTemplate::MindsetMicro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualTemplate::AffirmationCard => "affirmation_card",
            VisualTemplate::ConfidenceBoost => "confidence_boost",
            VisualTemplate::ProcessCue => "process_cue",
            VisualTemplate::BelongingTile => "belonging_tile",
            VisualTemplate::AutonomyChoice => "autonomy_choice",
            VisualTemplate::MindsetMicro => "mindset_micro",
        }
    }
}

impl fmt::Display for VisualTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Assistants (reasoning pipeline, dual assistant)
// ============================================================================

/// Body of POST /api/reasoning-pipeline and POST /api/dual-assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RewardComponents {
    pub honest_uncertainty_bonus: f64,
    pub self_correction_bonus: f64,
    pub bias_avoidance_penalty: f64,
    pub logic_drift_penalty: f64,
}

/// Scored rubric from the final reflection phase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalEvaluation {
    pub integrity_score: f64,
    pub reward_components: RewardComponents,
    pub comment: String,
    pub raw_evaluation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantPair {
    pub execution: String,
    pub reflection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMetadata {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "assistantIds")]
    pub assistant_ids: AssistantPair,
    #[serde(rename = "apiKeys")]
    pub api_keys: AssistantPair,
    pub phases_completed: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningResponse {
    pub success: bool,
    pub initial_execution: String,
    pub reflection_on_initial: String,
    pub final_response: String,
    pub final_evaluation: FinalEvaluation,
    pub metadata: PipelineMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionNotes {
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualAssistantMetadata {
    pub execution_assistant: String,
    pub reflection_assistant: String,
    pub timestamp: DateTime<Utc>,
    pub tools_enabled: Vec<String>,
    pub api_keys: AssistantPair,
    pub method: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualAssistantResponse {
    pub success: bool,
    pub response: String,
    pub reflection: ReflectionNotes,
    pub metadata: DualAssistantMetadata,
}

/// Failure envelope used by the assistant routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantFailure {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub request_id: String,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "full_name")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub full_name: Option<String>,
    pub age: Option<i64>,
    pub sport: Option<String>,
    pub school: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserInfo,
}

// ============================================================================
// Sessions, coaches, health
// ============================================================================

/// Persisted coach session without its message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub coach_id: String,
    pub title: String,
    pub message_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Persisted coach session with its full message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub messages: Vec<ChatMessage>,
    pub conversation_context: Option<ConversationContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachInfo {
    pub slug: String,
    pub emoji: String,
    pub name: String,
    pub tagline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeysConfigured {
    pub primary: bool,
    pub secondary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEnvironment {
    pub version: String,
    pub api_keys_configured: ApiKeysConfigured,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub environment: HealthEnvironment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }

    #[test]
    fn test_chat_message_defaults_role_to_user() {
        let msg: ChatMessage = serde_json::from_str(r#"{"content":"hi coach"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hi coach");
        assert!(msg.image_url.is_none());
    }

    #[test]
    fn test_chat_message_skips_empty_image_fields() {
        let json = serde_json::to_string(&ChatMessage::assistant("Nice work")).unwrap();
        assert!(!json.contains("imageUrl"));
        assert!(!json.contains("timestamp"));
        assert!(json.contains("\"role\":\"assistant\""));
    }

    #[test]
    fn test_chat_request_uses_camel_case() {
        let json = r#"{
            "messages": [{"role": "user", "content": "show me a drill"}],
            "coachSlug": "coach-skills",
            "sessionId": "abc",
            "conversationContext": {"keyTopics": ["basketball"], "messageCount": 7}
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.coach_slug.as_deref(), Some("coach-skills"));
        assert_eq!(req.session_id.as_deref(), Some("abc"));
        let ctx = req.conversation_context.unwrap();
        assert_eq!(ctx.key_topics, vec!["basketball"]);
        assert_eq!(ctx.message_count, 7);
        assert!(ctx.user_preferences.is_empty());
    }

    #[test]
    fn test_chat_response_serializes_null_image() {
        let resp = ChatResponse {
            message: "Keep going".to_string(),
            image: None,
            usage: None,
            session_id: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"image\":null"));
        assert!(json.contains("\"sessionId\":null"));
    }

    #[test]
    fn test_generated_image_type_field() {
        let image = GeneratedImage {
            url: None,
            b64: Some("aGVsbG8=".to_string()),
            alt: "Affirmation card".to_string(),
            prompt: "[affirmation_card] ...".to_string(),
            template: VisualTemplate::AffirmationCard,
        };
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"type\":\"affirmation_card\""));
        assert!(!json.contains("\"url\""));
    }

    #[test]
    fn test_visual_template_names_match_serde() {
        for template in VisualTemplate::ALL {
            let json = serde_json::to_string(&template).unwrap();
            assert_eq!(json, format!("\"{}\"", template.as_str()));
        }
    }

    #[test]
    fn test_pipeline_metadata_field_names() {
        let meta = PipelineMetadata {
            request_id: "abc123".to_string(),
            timestamp: Utc::now(),
            assistant_ids: AssistantPair {
                execution: "asst_exec".to_string(),
                reflection: "asst_refl".to_string(),
            },
            api_keys: AssistantPair {
                execution: "PRIMARY".to_string(),
                reflection: "SECONDARY".to_string(),
            },
            phases_completed: 4,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"requestId\":\"abc123\""));
        assert!(json.contains("\"assistantIds\""));
        assert!(json.contains("\"phases_completed\":4"));
    }

    #[test]
    fn test_assistant_failure_omits_missing_details() {
        let failure = AssistantFailure {
            success: false,
            error: "Invalid prompt".to_string(),
            details: None,
            request_id: "r1".to_string(),
        };
        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"requestId\":\"r1\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_session_detail_flattens_summary() {
        let detail = SessionDetail {
            summary: SessionSummary {
                id: "s1".to_string(),
                coach_id: "coach-calm".to_string(),
                title: "Pre-game nerves...".to_string(),
                message_count: 2,
                created_at: None,
                updated_at: None,
            },
            messages: vec![ChatMessage::user("hi"), ChatMessage::assistant("hey")],
            conversation_context: None,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], "s1");
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }
}
