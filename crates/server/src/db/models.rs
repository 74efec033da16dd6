use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub provider: String,
    pub provider_id: Option<String>,
    pub email_verified: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub age: Option<i64>,
    pub sport: Option<String>,
    pub school: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Login session backing an `auth_token`
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CoachRecord {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub tagline: String,
    pub system_prompt: String,
    pub created_at: Option<String>,
}

/// A persisted conversation with one coach. `messages` and
/// `conversation_context` hold JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct CoachSession {
    pub id: String,
    pub user_id: String,
    pub coach_id: String,
    pub title: String,
    pub messages: String,
    pub conversation_context: Option<String>,
    pub message_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
