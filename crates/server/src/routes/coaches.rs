use axum::{extract::Path, Json};
use shared::CoachInfo;

use crate::{coaches, error::AppError};

/// GET /api/coaches. System prompts are left out of the listing.
pub async fn list_coaches() -> Json<Vec<CoachInfo>> {
    Json(coaches::all().iter().map(|coach| coach.info(false)).collect())
}

/// GET /api/coaches/:slug
pub async fn get_coach(Path(slug): Path<String>) -> Result<Json<CoachInfo>, AppError> {
    coaches::by_slug(&slug)
        .map(|coach| Json(coach.info(true)))
        .ok_or_else(|| AppError::NotFound("Coach not found".to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::coaches;
    use crate::routes::create_router;
    use crate::testing::{body_json, get_request, send, test_state, MockOpenAi};

    #[tokio::test]
    async fn test_list_and_get() {
        let mock = MockOpenAi::start().await;
        let app = create_router(test_state(&mock).await);

        let response = send(&app, get_request("/api/coaches", None)).await;
        let list = body_json(response).await;
        assert_eq!(list.as_array().unwrap().len(), coaches::all().len());
        assert!(list[0].get("systemPrompt").is_none());

        let response = send(&app, get_request("/api/coaches/coach-fuel", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let coach = body_json(response).await;
        assert_eq!(coach["slug"], "coach-fuel");
        assert!(!coach["systemPrompt"].as_str().unwrap().is_empty());

        let response = send(&app, get_request("/api/coaches/coach-nobody", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
