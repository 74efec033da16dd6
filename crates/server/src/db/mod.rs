use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;

mod models;
pub mod query;

pub use models::*;

/// Timestamps are stored as RFC 3339 UTC strings so they compare lexically.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now() -> String {
    timestamp(Utc::now())
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str, max_connections: u32) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", path);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(&database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Single-connection in-memory database; every connection to
    /// `sqlite::memory:` would otherwise see its own empty schema.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT,
                provider TEXT NOT NULL DEFAULT 'email',
                provider_id TEXT,
                email_verified INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                email TEXT,
                full_name TEXT,
                age INTEGER,
                sport TEXT,
                school TEXT,
                created_at TEXT,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coaches (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                emoji TEXT NOT NULL,
                tagline TEXT NOT NULL,
                system_prompt TEXT NOT NULL,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coach_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                coach_id TEXT NOT NULL,
                title TEXT NOT NULL,
                messages TEXT NOT NULL DEFAULT '[]',
                conversation_context TEXT,
                message_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token TEXT UNIQUE NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
            "CREATE INDEX IF NOT EXISTS idx_users_provider ON users(provider, provider_id)",
            "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON coach_sessions(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_sessions_token ON user_sessions(token)",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        tracing::info!("Database migrations completed");
        Ok(())
    }

    // Coach operations
    pub async fn upsert_coaches(&self, coaches: &[CoachRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for coach in coaches {
            sqlx::query(
                r#"
                INSERT INTO coaches (id, name, emoji, tagline, system_prompt, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    emoji = excluded.emoji,
                    tagline = excluded.tagline,
                    system_prompt = excluded.system_prompt
                "#,
            )
            .bind(&coach.id)
            .bind(&coach.name)
            .bind(&coach.emoji)
            .bind(&coach.tagline)
            .bind(&coach.system_prompt)
            .bind(&coach.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        tracing::info!("Seeded {} coaches", coaches.len());
        Ok(())
    }

    pub async fn get_coach(&self, id: &str) -> Result<Option<CoachRecord>> {
        let coach = sqlx::query_as::<_, CoachRecord>(
            "SELECT id, name, emoji, tagline, system_prompt, created_at FROM coaches WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(coach)
    }

    // User operations
    pub async fn create_user(&self, user: &User, profile: &Profile) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, provider, provider_id, email_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.provider)
        .bind(&user.provider_id)
        .bind(user.email_verified)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, age, sport, school, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.age)
        .bind(&profile.sport)
        .bind(&profile.school)
        .bind(&profile.created_at)
        .bind(&profile.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, provider, provider_id, email_verified, created_at, updated_at
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, provider, provider_id, email_verified, created_at, updated_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, age, sport, school, created_at, updated_at
            FROM profiles WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    // Login session operations
    pub async fn create_user_session(&self, session: &UserSession) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_sessions (id, user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.token)
        .bind(&session.expires_at)
        .bind(&session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Session row for `token` that has not expired as of `now`.
    pub async fn get_active_user_session(&self, token: &str, now: &str) -> Result<Option<UserSession>> {
        let session = sqlx::query_as::<_, UserSession>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM user_sessions WHERE token = ? AND expires_at > ?
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn delete_user_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn purge_expired_user_sessions(&self, now: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // Coach session operations
    pub async fn create_coach_session(&self, session: &CoachSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO coach_sessions
                (id, user_id, coach_id, title, messages, conversation_context, message_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.coach_id)
        .bind(&session.title)
        .bind(&session.messages)
        .bind(&session.conversation_context)
        .bind(session.message_count)
        .bind(&session.created_at)
        .bind(&session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rewrites the history of a session owned by `session.user_id`.
    /// Returns false when no such session exists for that user.
    pub async fn update_coach_session(&self, session: &CoachSession) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE coach_sessions
            SET messages = ?, conversation_context = ?, message_count = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&session.messages)
        .bind(&session.conversation_context)
        .bind(session.message_count)
        .bind(&session.updated_at)
        .bind(&session.id)
        .bind(&session.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_coach_session(&self, id: &str, user_id: &str) -> Result<Option<CoachSession>> {
        let session = sqlx::query_as::<_, CoachSession>(
            r#"
            SELECT id, user_id, coach_id, title, messages, conversation_context, message_count, created_at, updated_at
            FROM coach_sessions WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn list_coach_sessions(&self, user_id: &str) -> Result<Vec<CoachSession>> {
        let sessions = sqlx::query_as::<_, CoachSession>(
            r#"
            SELECT id, user_id, coach_id, title, messages, conversation_context, message_count, created_at, updated_at
            FROM coach_sessions WHERE user_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    pub async fn delete_coach_session(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM coach_sessions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(id: &str, email: &str) -> (User, Profile) {
        let now = now();
        (
            User {
                id: id.to_string(),
                email: email.to_string(),
                password_hash: Some("hash".to_string()),
                provider: "email".to_string(),
                provider_id: None,
                email_verified: false,
                created_at: Some(now.clone()),
                updated_at: Some(now.clone()),
            },
            Profile {
                id: id.to_string(),
                email: Some(email.to_string()),
                full_name: Some("Jordan Lee".to_string()),
                ..Default::default()
            },
        )
    }

    fn coach_session(id: &str, user_id: &str, updated_at: &str) -> CoachSession {
        CoachSession {
            id: id.to_string(),
            user_id: user_id.to_string(),
            coach_id: "coach-calm".to_string(),
            title: "Nerves before the final...".to_string(),
            messages: "[]".to_string(),
            conversation_context: None,
            message_count: 0,
            created_at: Some(updated_at.to_string()),
            updated_at: Some(updated_at.to_string()),
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_user_and_profile_roundtrip() {
        let db = Database::in_memory().await.unwrap();
        let (u, p) = user("u1", "jordan@example.com");
        db.create_user(&u, &p).await.unwrap();

        let found = db.get_user_by_email("jordan@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert_eq!(found.provider, "email");
        assert!(!found.email_verified);

        let profile = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Jordan Lee"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::in_memory().await.unwrap();
        let (u, p) = user("u1", "dup@example.com");
        db.create_user(&u, &p).await.unwrap();
        let (u2, p2) = user("u2", "dup@example.com");
        assert!(db.create_user(&u2, &p2).await.is_err());
        assert!(db.get_user_by_id("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_user_sessions_are_inactive_and_purged() {
        let db = Database::in_memory().await.unwrap();
        let (u, p) = user("u1", "a@example.com");
        db.create_user(&u, &p).await.unwrap();

        let now_at = Utc::now();
        for (token, offset) in [("live", 1), ("stale", -1)] {
            db.create_user_session(&UserSession {
                id: format!("s-{}", token),
                user_id: "u1".to_string(),
                token: token.to_string(),
                expires_at: timestamp(now_at + Duration::hours(offset)),
                created_at: Some(timestamp(now_at)),
            })
            .await
            .unwrap();
        }

        let now_str = timestamp(now_at);
        assert!(db.get_active_user_session("live", &now_str).await.unwrap().is_some());
        assert!(db.get_active_user_session("stale", &now_str).await.unwrap().is_none());
        assert_eq!(db.purge_expired_user_sessions(&now_str).await.unwrap(), 1);
        assert!(db.delete_user_session("live").await.unwrap());
        assert!(!db.delete_user_session("live").await.unwrap());
    }

    #[tokio::test]
    async fn test_coach_sessions_scoped_to_owner() {
        let db = Database::in_memory().await.unwrap();
        for (id, email) in [("u1", "a@example.com"), ("u2", "b@example.com")] {
            let (u, p) = user(id, email);
            db.create_user(&u, &p).await.unwrap();
        }
        db.create_coach_session(&coach_session("c1", "u1", "2026-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        db.create_coach_session(&coach_session("c2", "u1", "2026-02-01T00:00:00.000Z"))
            .await
            .unwrap();

        let listed = db.list_coach_sessions("u1").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);

        assert!(db.get_coach_session("c1", "u2").await.unwrap().is_none());

        let mut other = coach_session("c1", "u2", "2026-03-01T00:00:00.000Z");
        other.messages = r#"[{"role":"user","content":"hijack"}]"#.to_string();
        assert!(!db.update_coach_session(&other).await.unwrap());
        assert!(!db.delete_coach_session("c1", "u2").await.unwrap());

        let mut mine = coach_session("c1", "u1", "2026-03-01T00:00:00.000Z");
        mine.message_count = 2;
        assert!(db.update_coach_session(&mine).await.unwrap());
        let stored = db.get_coach_session("c1", "u1").await.unwrap().unwrap();
        assert_eq!(stored.message_count, 2);
    }

    #[tokio::test]
    async fn test_upsert_coaches_overwrites() {
        let db = Database::in_memory().await.unwrap();
        let mut record = CoachRecord {
            id: "coach-calm".to_string(),
            name: "Coach Calm".to_string(),
            emoji: "🧘".to_string(),
            tagline: "Breathe".to_string(),
            system_prompt: "v1".to_string(),
            created_at: Some(now()),
        };
        db.upsert_coaches(std::slice::from_ref(&record)).await.unwrap();
        record.system_prompt = "v2".to_string();
        db.upsert_coaches(std::slice::from_ref(&record)).await.unwrap();

        let stored = db.get_coach("coach-calm").await.unwrap().unwrap();
        assert_eq!(stored.system_prompt, "v2");
    }
}
