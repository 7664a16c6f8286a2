use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: Option<String>,
    pub company: String,
    pub status: JobStatus,
    pub posted_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub cover_note: Option<String>,
    pub status: ApplicationStatus,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub hired_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List view: the poster's job plus how many applications it has drawn.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobWithApplicationCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub job: JobRow,
    pub applications: i64,
}

/// Detail view: the poster's job plus its full application list.
#[derive(Debug, Clone, Serialize)]
pub struct JobWithApplications {
    #[serde(flatten)]
    pub job: JobRow,
    pub applications: Vec<ApplicationRow>,
}
