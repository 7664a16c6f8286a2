//! Per-use-case chat queries. Every read and write is scoped to the
//! authenticated user's id; a chat owned by someone else is
//! indistinguishable from a missing one.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::chat::{AiMessage, ChatRow, ChatWithMessages, MessageRow};

/// Returns the user's chats, most recent first.
pub async fn list_chats(pool: &PgPool, user_id: Uuid) -> Result<Vec<ChatRow>, AppError> {
    Ok(sqlx::query_as::<_, ChatRow>(
        "SELECT * FROM chats WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Returns one chat with its full message history in creation order.
pub async fn fetch_chat(
    pool: &PgPool,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<ChatWithMessages, AppError> {
    let chat: Option<ChatRow> =
        sqlx::query_as("SELECT * FROM chats WHERE id = $1 AND user_id = $2")
            .bind(chat_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let chat = chat.ok_or_else(|| AppError::NotFound(format!("Chat {chat_id} not found")))?;

    let messages: Vec<MessageRow> = sqlx::query_as(
        "SELECT * FROM messages WHERE chat_id = $1 ORDER BY created_at ASC",
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(ChatWithMessages { chat, messages })
}

/// Persists a brand-new chat with its first requester/assistant pair.
/// Exactly two messages are required; the store skips commits below two
/// and nothing legitimately sends more before the first save.
pub async fn create_chat(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    messages: &[AiMessage],
) -> Result<Uuid, AppError> {
    if messages.len() != 2 {
        return Err(AppError::Validation(
            "a new chat must contain exactly two messages".to_string(),
        ));
    }

    let chat_id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO chats (id, title, user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        "#,
    )
    .bind(chat_id)
    .bind(title)
    .bind(user_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for message in messages {
        sqlx::query(
            r#"
            INSERT INTO messages (id, content, role, chat_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&message.content)
        .bind(message.role)
        .bind(chat_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("Created chat {chat_id} for user {user_id}");
    Ok(chat_id)
}

/// Appends a single message to an existing chat owned by the user.
pub async fn append_message(
    pool: &PgPool,
    user_id: Uuid,
    chat_id: Uuid,
    message: &AiMessage,
) -> Result<MessageRow, AppError> {
    let owned: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM chats WHERE id = $1 AND user_id = $2")
            .bind(chat_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    if owned.is_none() {
        return Err(AppError::NotFound(format!("Chat {chat_id} not found")));
    }

    let row: MessageRow = sqlx::query_as(
        r#"
        INSERT INTO messages (id, content, role, chat_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&message.content)
    .bind(message.role)
    .bind(chat_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}
