//! Password hashing, signed session tokens, the `auth_token` cookie and the
//! request extractors built on them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    db::{self, Database, User},
    error::AppError,
    state::AppState,
};

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: usize,
    /// Keeps two tokens issued in the same second distinct
    pub jti: String,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Sign a token for `user`. Returns the token and its expiry.
pub fn issue_token(user: &User, auth: &AuthConfig) -> Result<(String, DateTime<Utc>), AppError> {
    let expires_at = Utc::now()
        .checked_add_signed(Duration::hours(auth.token_expiry_hours as i64))
        .ok_or_else(|| AppError::Internal("Failed to calculate expiration".to_string()))?;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        exp: expires_at.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    // Stored expiry matches the signed one to the second
    let expires_at = Utc
        .timestamp_opt(claims.exp as i64, 0)
        .single()
        .unwrap_or(expires_at);
    Ok((token, expires_at))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::AuthError("Invalid token".to_string())
    })
}

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, auth: &AuthConfig) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        AUTH_COOKIE,
        token,
        auth.token_expiry_hours * 3600
    );
    if auth.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", AUTH_COOKIE)
}

/// Token from the `auth_token` cookie, or from `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve a token to its user: valid signature, live session row and an
/// existing account are all required.
pub async fn authenticate(db: &Database, secret: &str, token: &str) -> Result<User, AppError> {
    let claims = verify_token(token, secret)?;

    db.get_active_user_session(token, &db::now())
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid or expired token".to_string()))?;

    db.get_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::AuthError("User not found".to_string()))
}

/// The signed-in user; rejects the request with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::AuthError("No token found".to_string()))?;
        let user = authenticate(&state.db, &state.config.auth.jwt_secret, &token).await?;
        Ok(CurrentUser { user })
    }
}

/// The signed-in user when there is one. Auth failures are not errors here.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        match authenticate(&state.db, &state.config.auth.jwt_secret, &token).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(e) => {
                tracing::debug!("Continuing without user: {}", e);
                Ok(MaybeUser(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "ath@example.com".to_string(),
            password_hash: None,
            provider: "email".to_string(),
            provider_id: None,
            email_verified: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not a phc string"));
    }

    #[test]
    fn test_token_roundtrip_and_wrong_secret() {
        let auth = AuthConfig::default();
        let (token, expires_at) = issue_token(&user(), &auth).unwrap();
        assert!(expires_at > Utc::now() + Duration::hours(167));

        let claims = verify_token(&token, &auth.jwt_secret).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ath@example.com");
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_tokens_are_unique() {
        let auth = AuthConfig::default();
        let (a, _) = issue_token(&user(), &auth).unwrap();
        let (b, _) = issue_token(&user(), &auth).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cookie_attributes() {
        let mut auth = AuthConfig::default();
        let cookie = session_cookie("abc", &auth);
        assert_eq!(cookie, "auth_token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800");

        auth.cookie_secure = true;
        assert!(session_cookie("abc", &auth).ends_with("; Secure"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_token_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=from-cookie"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));
    }

    #[tokio::test]
    async fn test_authenticate_requires_live_session() {
        let db = Database::in_memory().await.unwrap();
        let auth = AuthConfig::default();
        let account = user();
        db.create_user(&account, &db::Profile { id: account.id.clone(), ..Default::default() })
            .await
            .unwrap();

        let (token, expires_at) = issue_token(&account, &auth).unwrap();
        let err = authenticate(&db, &auth.jwt_secret, &token).await.unwrap_err();
        assert_eq!(err.public_message(), "Invalid or expired token");

        db.create_user_session(&db::UserSession {
            id: Uuid::new_v4().to_string(),
            user_id: account.id.clone(),
            token: token.clone(),
            expires_at: db::timestamp(expires_at),
            created_at: Some(db::now()),
        })
        .await
        .unwrap();
        let found = authenticate(&db, &auth.jwt_secret, &token).await.unwrap();
        assert_eq!(found.id, account.id);
    }
}
