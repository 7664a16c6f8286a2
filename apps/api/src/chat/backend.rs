//! Production [`ChatBackend`]: persistence via the chat queries, title
//! generation via the prompt templates and the LLM client. One instance is
//! bound to one authenticated user.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::chat::queries;
use crate::chat::store::{ChatBackend, ChatSummary, Conversation, StoreError, Turn};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::chat::AiMessage;
use crate::prompts;

pub struct ServerChatBackend {
    db: PgPool,
    llm: LlmClient,
    user_id: Uuid,
}

impl ServerChatBackend {
    pub fn new(db: PgPool, llm: LlmClient, user_id: Uuid) -> Self {
        ServerChatBackend { db, llm, user_id }
    }
}

impl From<AppError> for StoreError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized => StoreError::Unauthenticated,
            AppError::NotFound(_) => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl ChatBackend for ServerChatBackend {
    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, StoreError> {
        let rows = queries::list_chats(&self.db, self.user_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| ChatSummary {
                id: row.id,
                title: row.title,
            })
            .collect())
    }

    async fn fetch_chat(&self, id: Uuid) -> Result<Conversation, StoreError> {
        let detail = queries::fetch_chat(&self.db, self.user_id, id).await?;
        Ok(Conversation {
            id: detail.chat.id,
            title: detail.chat.title,
            saved: true,
            turns: detail
                .messages
                .into_iter()
                .map(|m| Turn {
                    id: m.id,
                    role: m.role,
                    content: m.content,
                    created_at: m.created_at,
                })
                .collect(),
        })
    }

    async fn create_chat(&self, title: &str, turns: &[Turn]) -> Result<Uuid, StoreError> {
        let messages: Vec<AiMessage> = turns
            .iter()
            .map(|t| AiMessage {
                role: t.role,
                content: t.content.clone(),
            })
            .collect();
        Ok(queries::create_chat(&self.db, self.user_id, title, &messages).await?)
    }

    async fn append_message(&self, chat_id: Uuid, message: AiMessage) -> Result<(), StoreError> {
        queries::append_message(&self.db, self.user_id, chat_id, &message).await?;
        Ok(())
    }

    async fn generate_title(&self, input: &str) -> Result<String, StoreError> {
        let prompt = prompts::title_prompt(input);
        let title = self
            .llm
            .text_chat(&[AiMessage {
                role: crate::models::chat::MessageRole::User,
                content: prompt,
            }])
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(title.trim().to_string())
    }
}
