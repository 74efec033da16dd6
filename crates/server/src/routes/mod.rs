use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod admin;
mod assistants;
mod auth;
mod chat;
mod coach_chat;
mod coaches;
mod data;
mod health;
mod sessions;
mod visuals;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and setup
        .route("/api/health", get(health::health_check))
        .route("/api/init-db", post(admin::init_db))
        // Auth routes
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/user", get(auth::current_user))
        // Coach conversations
        .route("/api/chat", post(chat::chat))
        .route("/api/coach-chat", post(coach_chat::coach_chat))
        .route("/api/coaches", get(coaches::list_coaches))
        .route("/api/coaches/:slug", get(coaches::get_coach))
        .route("/api/sessions", get(sessions::list_sessions))
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        // Assistant workflows
        .route("/api/reasoning-pipeline", post(assistants::reasoning_pipeline))
        .route("/api/dual-assistant", post(assistants::dual_assistant))
        // Generic table access
        .route(
            "/api/data/:table",
            get(data::select_rows)
                .post(data::insert_row)
                .patch(data::update_rows)
                .delete(data::delete_rows),
        )
        // Brand tooling
        .route("/api/visuals/copy-bank", get(visuals::copy_bank))
        .route("/api/visuals/brand-contrast", get(visuals::brand_contrast))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
