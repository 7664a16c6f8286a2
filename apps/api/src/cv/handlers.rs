use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::cv::CvRow;
use crate::state::AppState;

const MAX_PDF_BYTES: usize = 4 * 1024 * 1024;

/// GET /api/v1/cv
pub async fn handle_get(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Option<CvRow>>, AppError> {
    let cv: Option<CvRow> = sqlx::query_as("SELECT * FROM cv_infos WHERE user_id = $1")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await?;
    Ok(Json(cv))
}

/// PUT /api/v1/cv
///
/// Multipart upload of a single PDF. Replaces any previously stored resume;
/// the old object is deleted best-effort after the new one is in place.
pub async fn handle_upload(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<CvRow>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .unwrap_or("resume.pdf")
            .to_string();
        let is_pdf = field
            .content_type()
            .map(|ct| ct == "application/pdf")
            .unwrap_or_else(|| file_name.to_ascii_lowercase().ends_with(".pdf"));
        if !is_pdf {
            return Err(AppError::Validation("only PDF resumes are accepted".to_string()));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        if data.len() > MAX_PDF_BYTES {
            return Err(AppError::Validation("resume must be at most 4MB".to_string()));
        }
        upload = Some((file_name, data.to_vec()));
    }

    let (name, data) = upload
        .ok_or_else(|| AppError::Validation("missing 'file' field in upload".to_string()))?;

    let object_key = format!("cvs/{}/{}.pdf", session.user_id, Uuid::new_v4());
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&object_key)
        .body(ByteStream::from(data))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Resume upload failed: {e}")))?;

    let url = format!(
        "{}/{}/{}",
        state.config.s3_endpoint.trim_end_matches('/'),
        state.config.s3_bucket,
        object_key
    );

    let existing: Option<CvRow> = sqlx::query_as("SELECT * FROM cv_infos WHERE user_id = $1")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await?;

    let row: CvRow = if let Some(previous) = existing {
        let row = sqlx::query_as(
            r#"
            UPDATE cv_infos
            SET name = $1, object_key = $2, url = $3, updated_at = $4
            WHERE user_id = $5
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&object_key)
        .bind(&url)
        .bind(Utc::now())
        .bind(session.user_id)
        .fetch_one(&state.db)
        .await?;

        if let Err(e) = state
            .s3
            .delete_object()
            .bucket(&state.config.s3_bucket)
            .key(&previous.object_key)
            .send()
            .await
        {
            warn!("Failed to delete replaced resume {}: {e}", previous.object_key);
        }
        row
    } else {
        sqlx::query_as(
            r#"
            INSERT INTO cv_infos (id, name, object_key, url, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&object_key)
        .bind(&url)
        .bind(session.user_id)
        .bind(Utc::now())
        .fetch_one(&state.db)
        .await?
    };

    info!("Stored resume {} for user {}", row.object_key, session.user_id);
    Ok(Json(row))
}

/// DELETE /api/v1/cv
pub async fn handle_delete(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, AppError> {
    let cv: Option<CvRow> = sqlx::query_as("SELECT * FROM cv_infos WHERE user_id = $1")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await?;
    let cv = cv.ok_or_else(|| AppError::NotFound("No resume on file".to_string()))?;

    state
        .s3
        .delete_object()
        .bucket(&state.config.s3_bucket)
        .key(&cv.object_key)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Resume deletion failed: {e}")))?;

    sqlx::query("DELETE FROM cv_infos WHERE user_id = $1")
        .bind(session.user_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
