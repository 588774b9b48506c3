pub mod auth;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod server;
pub mod stream;
