use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shared::{SignInRequest, SignUpRequest, UserInfo, UserResponse};
use uuid::Uuid;

use crate::{
    auth::{self, CurrentUser},
    db::{self, Profile, User, UserSession},
    error::AppError,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

fn user_info(user: User, profile: Option<Profile>) -> UserInfo {
    let profile = profile.unwrap_or_default();
    UserInfo {
        id: user.id,
        email: user.email,
        email_verified: user.email_verified,
        created_at: user.created_at,
        updated_at: user.updated_at,
        profile: shared::Profile {
            full_name: profile.full_name,
            age: profile.age,
            sport: profile.sport,
            school: profile.school,
        },
    }
}

/// Issue a token, record its session row and build the `Set-Cookie` value.
async fn start_session(state: &AppState, user: &User) -> Result<String, AppError> {
    let (token, expires_at) = auth::issue_token(user, &state.config.auth)?;
    state
        .db
        .create_user_session(&UserSession {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            token: token.clone(),
            expires_at: db::timestamp(expires_at),
            created_at: Some(db::now()),
        })
        .await?;
    Ok(auth::session_cookie(&token, &state.config.auth))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest("Password must be at least 6 characters".to_string()));
    }
    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let now = db::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        password_hash: Some(auth::hash_password(&req.password)?),
        provider: "email".to_string(),
        provider_id: None,
        email_verified: false,
        created_at: Some(now.clone()),
        updated_at: Some(now.clone()),
    };
    let profile = Profile {
        id: user.id.clone(),
        email: Some(email),
        full_name: req.full_name.filter(|n| !n.trim().is_empty()),
        created_at: Some(now.clone()),
        updated_at: Some(now),
        ..Default::default()
    };
    state.db.create_user(&user, &profile).await?;
    tracing::info!("Registered user {}", user.id);

    let cookie = start_session(&state, &user).await?;
    let body = UserResponse {
        user: user_info(user, Some(profile)),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

/// POST /api/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

    let verified = user
        .password_hash
        .as_deref()
        .map(|hash| auth::verify_password(&req.password, hash))
        .unwrap_or(false);
    if !verified {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let purged = state.db.purge_expired_user_sessions(&db::now()).await?;
    if purged > 0 {
        tracing::debug!("Purged {} expired sessions", purged);
    }

    let cookie = start_session(&state, &user).await?;
    let profile = state.db.get_profile(&user.id).await?;
    tracing::info!("User {} signed in", user.id);

    let body = UserResponse {
        user: user_info(user, profile),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

/// POST /api/auth/signout. Always clears the cookie.
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = auth::token_from_headers(&headers) {
        if let Err(e) = state.db.delete_user_session(&token).await {
            tracing::error!("Sign out error: {}", e);
        }
    }
    (
        [(header::SET_COOKIE, auth::clear_cookie())],
        Json(json!({ "success": true })),
    )
}

/// GET /api/auth/user
pub async fn current_user(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let profile = state.db.get_profile(&current.user.id).await?;
    Ok(Json(UserResponse {
        user: user_info(current.user, profile),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::create_router;
    use crate::testing::{body_json, get_request, json_request, send, sign_up, test_state, MockOpenAi};

    #[tokio::test]
    async fn test_signup_then_fetch_user() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);

        let cookie = sign_up(&app, "Runner@Example.com").await;
        assert!(cookie.starts_with("auth_token="));

        let response = send(&app, get_request("/api/auth/user", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "runner@example.com");
        assert_eq!(body["user"]["profile"]["full_name"], "Test Athlete");
    }

    #[tokio::test]
    async fn test_duplicate_signup_rejected() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);
        sign_up(&app, "a@example.com").await;

        let response = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                &json!({ "email": "a@example.com", "password": "another1" }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "User already exists");
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                &json!({ "email": "b@example.com", "password": "123" }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signin_checks_password() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);
        sign_up(&app, "c@example.com").await;

        let wrong = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signin",
                &json!({ "email": "c@example.com", "password": "wrong-pass" }),
                None,
            ),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong).await["error"], "Invalid credentials");

        let right = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signin",
                &json!({ "email": "c@example.com", "password": "secret123" }),
                None,
            ),
        )
        .await;
        assert_eq!(right.status(), StatusCode::OK);
        let cookie = right.headers()["set-cookie"].to_str().unwrap();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);
        let response = send(
            &app,
            json_request("POST", "/api/auth/signin", &json!({ "email": "", "password": "" }), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Email and password are required");
    }

    #[tokio::test]
    async fn test_signout_invalidates_token() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);
        let cookie = sign_up(&app, "d@example.com").await;

        let response = send(&app, json_request("POST", "/api/auth/signout", &json!({}), Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()["set-cookie"].to_str().unwrap().contains("Max-Age=0"));

        let response = send(&app, get_request("/api/auth/user", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_user_without_token() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);
        let response = send(&app, get_request("/api/auth/user", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "No token found");
    }
}
