use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::job::{
    ApplicationRow, JobRow, JobStatus, JobWithApplicationCount, JobWithApplications,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    /// Mirrors the posting form's toggle: true lists the job as open.
    pub status: bool,
}

fn validate_job(req: &CreateJobRequest) -> Result<(), String> {
    for (field, value) in [
        ("title", &req.title),
        ("company", &req.company),
        ("location", &req.location),
    ] {
        let len = value.chars().count();
        if !(3..=255).contains(&len) {
            return Err(format!("{field} must be between 3 and 255 characters"));
        }
    }
    let len = req.description.chars().count();
    if !(15..=1000).contains(&len) {
        return Err("description must be between 15 and 1000 characters".to_string());
    }
    Ok(())
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    validate_job(&req).map_err(AppError::Validation)?;

    let status = if req.status {
        JobStatus::Open
    } else {
        JobStatus::Closed
    };

    let job: JobRow = sqlx::query_as(
        r#"
        INSERT INTO jobs
            (id, title, description, location, salary, company, status,
             posted_by_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.location)
    .bind(&req.salary)
    .bind(&req.company)
    .bind(status)
    .bind(session.user_id)
    .bind(Utc::now())
    .fetch_one(&state.db)
    .await?;

    info!("User {} posted job {}", session.user_id, job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/mine
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<JobWithApplicationCount>>, AppError> {
    let jobs: Vec<JobWithApplicationCount> = sqlx::query_as(
        r#"
        SELECT j.*, COUNT(a.id) AS applications
        FROM jobs j
        LEFT JOIN applications a ON a.job_id = j.id
        WHERE j.posted_by_id = $1
        GROUP BY j.id
        ORDER BY j.created_at DESC
        "#,
    )
    .bind(session.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
///
/// Detail view for the poster: the job plus every application it received.
/// A job posted by someone else reads as not-found.
pub async fn handle_job_details(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<JobWithApplications>, AppError> {
    let job: Option<JobRow> =
        sqlx::query_as("SELECT * FROM jobs WHERE id = $1 AND posted_by_id = $2")
            .bind(id)
            .bind(session.user_id)
            .fetch_optional(&state.db)
            .await?;
    let job = job.ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let applications: Vec<ApplicationRow> =
        sqlx::query_as("SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at ASC")
            .bind(id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(JobWithApplications { job, applications }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateJobRequest {
        CreateJobRequest {
            title: "Backend Engineer".to_string(),
            company: "Acme Corp".to_string(),
            location: "Remote".to_string(),
            salary: Some("$120k-$150k".to_string()),
            description: "Build and operate our payments platform.".to_string(),
            status: true,
        }
    }

    #[test]
    fn test_valid_job_passes() {
        assert!(validate_job(&valid_request()).is_ok());
    }

    #[test]
    fn test_short_title_rejected() {
        let mut req = valid_request();
        req.title = "QA".to_string();
        assert!(validate_job(&req).is_err());
    }

    #[test]
    fn test_description_bounds() {
        let mut req = valid_request();
        req.description = "too short".to_string();
        assert!(validate_job(&req).is_err());
        req.description = "d".repeat(1000);
        assert!(validate_job(&req).is_ok());
        req.description = "d".repeat(1001);
        assert!(validate_job(&req).is_err());
    }

    #[test]
    fn test_salary_is_optional() {
        let mut req = valid_request();
        req.salary = None;
        assert!(validate_job(&req).is_ok());
    }
}
