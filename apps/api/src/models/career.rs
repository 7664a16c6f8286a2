use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Typical entry level for a career path. The model sometimes capitalizes
/// these despite instructions, so both spellings are accepted on input and
/// normalized to lowercase everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "career_level", rename_all = "lowercase")]
pub enum CareerLevel {
    #[serde(alias = "Beginner")]
    Beginner,
    #[serde(alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "Advanced")]
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "growth_outlook", rename_all = "lowercase")]
pub enum GrowthOutlook {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Moderate")]
    Moderate,
    #[serde(alias = "High")]
    High,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CareerPathRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub confidence_score: i32,
    pub level: CareerLevel,
    pub domain: String,
    pub estimated_time_to_entry: String,
    pub salary_range_min: i32,
    pub salary_range_max: i32,
    pub growth_outlook: GrowthOutlook,
    pub relevance_reasons: Json<Vec<String>>,
    pub job_titles: Json<Vec<String>>,
    pub required_skills: Json<Vec<String>>,
    pub optional_skills: Option<Json<Vec<String>>>,
    pub certifications: Option<Json<Vec<String>>>,
    pub related_paths: Json<Vec<String>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
