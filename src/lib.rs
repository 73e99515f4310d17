pub mod app;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod food_image;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod relay;
pub mod routes;

// Re-export key functions for convenience
pub use app::{AppState, build_router, create_app, init_tracing};
