pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::career::handlers as career;
use crate::chat::handlers as chat;
use crate::cv::handlers as cv;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        // Chats
        .route("/api/v1/chats", get(chat::handle_list_chats))
        .route("/api/v1/chats", post(chat::handle_create_chat))
        .route("/api/v1/chats/:id", get(chat::handle_get_chat))
        .route("/api/v1/chats/:id/messages", post(chat::handle_append_message))
        // Assistant
        .route("/api/v1/assistant/respond", post(chat::handle_respond))
        .route("/api/v1/assistant/title", post(chat::handle_generate_title))
        // Career paths
        .route("/api/v1/career-paths", get(career::handle_list))
        .route("/api/v1/career-paths", post(career::handle_save))
        .route("/api/v1/career-paths/generate", post(career::handle_generate))
        // Resume
        .route("/api/v1/cv", get(cv::handle_get))
        .route("/api/v1/cv", put(cv::handle_upload))
        .route("/api/v1/cv", delete(cv::handle_delete))
        // Job board
        .route("/api/v1/jobs", post(jobs::handle_create_job))
        .route("/api/v1/jobs/mine", get(jobs::handle_my_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_job_details))
        .with_state(state)
}
