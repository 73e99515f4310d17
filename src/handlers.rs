use std::io;

use axum::{
    extract::{
        Form, Json, Multipart, State,
        multipart::MultipartRejection,
        rejection::{FormRejection, JsonRejection},
    },
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use tracing::{debug, info};

use crate::app::AppState;
use crate::envelope::Envelope;
use crate::error::AppResult;
use crate::food_image::FoodImage;
use crate::models::{HealthProfile, HealthResponse, MessageResponse, QueryForm};
use crate::relay::{FoodAnalysisRelay, HealthQueryRelay, MealPlanRelay, RelayError, run_relay};

pub const UPLOAD_FIELD: &str = "file";
const FAVICON_CANDIDATES: [&str; 2] = ["favicon.ico", "blank.ico"];

/// Liveness endpoint
pub async fn root() -> AppResult<ResponseJson<MessageResponse>> {
    debug!("Root endpoint called");
    Ok(ResponseJson(MessageResponse::new(
        "NutriFit AI Backend is running!",
    )))
}

/// Health check handler
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");
    Ok(ResponseJson(HealthResponse::ok()))
}

/// Serves `favicon.ico` (or `blank.ico`) from the static directory, falling
/// back to a JSON message when neither exists.
pub async fn favicon(State(state): State<AppState>) -> AppResult<Response> {
    for name in FAVICON_CANDIDATES {
        match tokio::fs::read(state.static_dir.join(name)).await {
            Ok(bytes) => {
                return Ok(([(header::CONTENT_TYPE, "image/x-icon")], bytes).into_response());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ResponseJson(MessageResponse::new("favicon not found")).into_response())
}

pub async fn generate_meal_plan(
    State(state): State<AppState>,
    payload: Result<Json<HealthProfile>, JsonRejection>,
) -> Envelope {
    info!("Meal plan endpoint called");
    let profile = payload
        .map(|Json(profile)| profile)
        .map_err(|rejection| RelayError::Rejected(rejection.body_text()));

    run_relay::<MealPlanRelay>(state.model.as_ref(), profile).await
}

pub async fn analyze_food(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Envelope {
    info!("Food analysis endpoint called");
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => Err(RelayError::Rejected(rejection.body_text())),
    };

    run_relay::<FoodAnalysisRelay>(state.model.as_ref(), upload).await
}

pub async fn health_query(
    State(state): State<AppState>,
    form: Result<Form<QueryForm>, FormRejection>,
) -> Envelope {
    info!("Health query endpoint called");
    let query = form
        .map(|Form(form)| form.query)
        .map_err(|rejection| RelayError::Rejected(rejection.body_text()));

    run_relay::<HealthQueryRelay>(state.model.as_ref(), query).await
}

/// Takes the first `file` field of the form; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<FoodImage, RelayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::Rejected(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| RelayError::Rejected(e.body_text()))?;

        debug!(
            "Received upload {:?} ({:?}, {} bytes)",
            filename,
            content_type,
            bytes.len()
        );
        return Ok(FoodImage {
            bytes,
            filename,
            content_type,
        });
    }

    Err(RelayError::MissingField(UPLOAD_FIELD))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_root_message() {
        let ResponseJson(body) = root().await.unwrap();
        assert_eq!(body.message, "NutriFit AI Backend is running!");
    }
}
