use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::auth::session::Session;
use crate::career::schema::{parse_career_paths, CareerPath};
use crate::cv::pdf;
use crate::errors::AppError;
use crate::models::career::CareerPathRow;
use crate::models::chat::{AiMessage, MessageRole};
use crate::models::cv::CvRow;
use crate::prompts;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Free-text extra info: interests, goals, preferred work style.
    pub input: String,
}

/// POST /api/v1/career-paths/generate
///
/// Resume text + user input → prompt → model → strip/parse/validate.
/// The generated paths are returned, not persisted; saving is a separate,
/// per-path call.
pub async fn handle_generate(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Vec<CareerPath>>, AppError> {
    let cv: Option<CvRow> = sqlx::query_as("SELECT * FROM cv_infos WHERE user_id = $1")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await?;
    let cv = cv.ok_or_else(|| {
        AppError::Validation("upload a resume before generating career paths".to_string())
    })?;

    let object = state
        .s3
        .get_object()
        .bucket(&state.config.s3_bucket)
        .key(&cv.object_key)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to fetch resume: {e}")))?;
    let body = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to read resume: {e}")))?
        .into_bytes();

    let resume_text = pdf::extract_text(&body).ok_or_else(|| {
        AppError::Validation("the stored resume could not be read as a PDF".to_string())
    })?;

    let prompt = prompts::career_path_prompt(&resume_text, &req.input);
    let raw = state
        .llm
        .text_chat(&[AiMessage {
            role: MessageRole::User,
            content: prompt,
        }])
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let paths = parse_career_paths(&raw)?;
    Ok(Json(paths))
}

/// POST /api/v1/career-paths
pub async fn handle_save(
    State(state): State<AppState>,
    session: Session,
    Json(path): Json<CareerPath>,
) -> Result<StatusCode, AppError> {
    path.validate().map_err(AppError::Validation)?;

    sqlx::query(
        r#"
        INSERT INTO career_paths
            (id, title, description, confidence_score, level, domain,
             estimated_time_to_entry, salary_range_min, salary_range_max,
             growth_outlook, relevance_reasons, job_titles, required_skills,
             optional_skills, certifications, related_paths, user_id,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $18)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&path.title)
    .bind(&path.description)
    .bind(path.confidence_score)
    .bind(path.level)
    .bind(&path.domain)
    .bind(&path.estimated_time_to_entry)
    .bind(path.salary_range_usd.min)
    .bind(path.salary_range_usd.max)
    .bind(path.growth_outlook)
    .bind(SqlJson(&path.relevance_reasons))
    .bind(SqlJson(&path.job_titles))
    .bind(SqlJson(&path.required_skills))
    .bind(path.optional_skills.as_ref().map(SqlJson))
    .bind(path.certifications.as_ref().map(SqlJson))
    .bind(SqlJson(&path.related_paths))
    .bind(session.user_id)
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    Ok(StatusCode::CREATED)
}

/// GET /api/v1/career-paths
pub async fn handle_list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CareerPathRow>>, AppError> {
    let paths: Vec<CareerPathRow> = sqlx::query_as(
        "SELECT * FROM career_paths WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(paths))
}
