use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{coaches, db::Database, state::AppState};

async fn initialize(db: &Database) -> anyhow::Result<()> {
    db.run_migrations().await?;
    coaches::seed(db).await
}

/// POST /api/init-db
pub async fn init_db(State(state): State<AppState>) -> impl IntoResponse {
    match initialize(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Database initialized successfully" })),
        ),
        Err(e) => {
            tracing::error!("Database initialization failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Database initialization failed" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::testing::{body_json, json_request, send, test_state, MockOpenAi};

    #[tokio::test]
    async fn test_init_db_seeds_coaches() {
        let mock = MockOpenAi::start().await;
        let state = test_state(&mock).await;
        let app = create_router(state.clone());

        let response = send(&app, json_request("POST", "/api/init-db", &json!({}), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Database initialized successfully");

        let calm = state.db.get_coach("coach-calm").await.unwrap().unwrap();
        assert_eq!(calm.name, coaches::by_slug("coach-calm").unwrap().name);

        // Idempotent
        let response = send(&app, json_request("POST", "/api/init-db", &json!({}), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
