use crate::app::AppState;
use crate::handlers::{
    analyze_food, favicon, generate_meal_plan, health_check, health_query, root,
};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/favicon.ico", get(favicon))
        .route("/generate_meal_plan/", post(generate_meal_plan))
        .route("/analyze_food/", post(analyze_food))
        .route("/health_query/", post(health_query))
}
