pub mod auth;
pub mod career;
pub mod chat;
pub mod config;
pub mod cv;
pub mod db;
pub mod errors;
pub mod jobs;
pub mod llm_client;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod state;
