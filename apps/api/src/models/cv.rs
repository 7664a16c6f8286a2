use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One stored resume per user. `object_key` addresses the PDF in object
/// storage; `url` is the public retrieval URL handed to the client.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub name: String,
    pub object_key: String,
    pub url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
