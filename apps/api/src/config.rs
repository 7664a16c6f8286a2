use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup aborts if any required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub watsonx_api_key: String,
    pub watsonx_service_url: String,
    pub watsonx_project_id: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let watsonx_service_url = require_env("WATSONX_SERVICE_URL")?;
        reqwest::Url::parse(&watsonx_service_url)
            .context("WATSONX_SERVICE_URL must be a valid URL")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            session_secret: require_env("SESSION_SECRET")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            watsonx_api_key: require_env("WATSONX_API_KEY")?,
            watsonx_service_url,
            watsonx_project_id: require_env("WATSONX_PROJECT_ID")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
