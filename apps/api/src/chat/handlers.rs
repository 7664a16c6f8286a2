use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::session::Session;
use crate::chat::queries;
use crate::errors::AppError;
use crate::models::chat::{AiMessage, ChatRow, ChatWithMessages, MessageRole, MessageRow};
use crate::prompts;
use crate::state::AppState;

/// GET /api/v1/chats
pub async fn handle_list_chats(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<ChatRow>>, AppError> {
    let chats = queries::list_chats(&state.db, session.user_id).await?;
    Ok(Json(chats))
}

/// GET /api/v1/chats/:id
pub async fn handle_get_chat(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatWithMessages>, AppError> {
    let chat = queries::fetch_chat(&state.db, session.user_id, id).await?;
    Ok(Json(chat))
}

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub title: String,
    pub messages: Vec<AiMessage>,
}

#[derive(Serialize)]
pub struct CreateChatResponse {
    pub id: Uuid,
}

/// POST /api/v1/chats
///
/// The one-time initial save: a title plus the first requester/assistant
/// message pair.
pub async fn handle_create_chat(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<CreateChatResponse>), AppError> {
    let id = queries::create_chat(&state.db, session.user_id, &req.title, &req.messages).await?;
    Ok((StatusCode::CREATED, Json(CreateChatResponse { id })))
}

/// POST /api/v1/chats/:id/messages
///
/// Incremental single-turn save for an already-persisted chat.
pub async fn handle_append_message(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(message): Json<AiMessage>,
) -> Result<(StatusCode, Json<MessageRow>), AppError> {
    let row = queries::append_message(&state.db, session.user_id, id, &message).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub messages: Vec<AiMessage>,
}

#[derive(Serialize)]
pub struct RespondResponse {
    pub content: String,
}

/// POST /api/v1/assistant/respond
///
/// Sends the full turn history to the model and returns its reply.
pub async fn handle_respond(
    State(state): State<AppState>,
    _session: Session,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, AppError> {
    if req.messages.is_empty() {
        return Err(AppError::Validation("messages must not be empty".to_string()));
    }
    let content = state
        .llm
        .text_chat(&req.messages)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    Ok(Json(RespondResponse { content }))
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub input: String,
}

#[derive(Serialize)]
pub struct TitleResponse {
    pub title: String,
}

/// POST /api/v1/assistant/title
pub async fn handle_generate_title(
    State(state): State<AppState>,
    _session: Session,
    Json(req): Json<TitleRequest>,
) -> Result<Json<TitleResponse>, AppError> {
    if req.input.trim().is_empty() {
        return Err(AppError::Validation("input must not be empty".to_string()));
    }
    let prompt = prompts::title_prompt(&req.input);
    let title = state
        .llm
        .text_chat(&[AiMessage {
            role: MessageRole::User,
            content: prompt,
        }])
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    Ok(Json(TitleResponse {
        title: title.trim().to_string(),
    }))
}
