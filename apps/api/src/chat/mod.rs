pub mod backend;
pub mod handlers;
pub mod queries;
pub mod store;
