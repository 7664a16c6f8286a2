pub mod career;
pub mod chat;
pub mod cv;
pub mod job;
pub mod user;
