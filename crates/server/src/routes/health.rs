use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::Utc;
use shared::{ApiKeysConfigured, HealthEnvironment, HealthResponse};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "unavailable".to_string()
        }
    };

    let openai = &state.config.openai;
    let body = HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        environment: HealthEnvironment {
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_keys_configured: ApiKeysConfigured {
                primary: openai.primary_key().is_some(),
                secondary: openai.secondary_key().is_some(),
            },
            database,
        },
    };

    ([(header::CACHE_CONTROL, "no-cache")], Json(body))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::create_router;
    use crate::testing::{body_json, get_request, send, test_state, MockOpenAi};

    #[tokio::test]
    async fn test_health_reports_keys_and_database() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);

        let response = send(&app, get_request("/api/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "no-cache");

        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(body["environment"]["apiKeysConfigured"]["primary"], true);
        assert_eq!(body["environment"]["apiKeysConfigured"]["secondary"], false);
        assert_eq!(body["environment"]["database"], "ok");
    }
}
