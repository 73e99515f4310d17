//! The validate -> prompt -> call -> envelope pipeline shared by all
//! three AI endpoints.

use thiserror::Error;
use tracing::{info, warn};

use crate::envelope::{ANSWER_KEY, Envelope, FOOD_ANALYSIS_KEY, MEAL_PLAN_KEY};
use crate::food_image::{DecodedImage, FoodImage};
use crate::llm::{GenerativeModel, ModelError};
use crate::models::HealthProfile;

pub const FOOD_ANALYSIS_PROMPT: &str =
    "Analyze this food image. Describe food name, calories, and nutrition details.";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    Rejected(String),

    #[error("Missing upload field `{0}`")]
    MissingField(&'static str),

    #[error("Cannot decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// What gets sent to the model for one request
#[derive(Debug)]
pub struct ModelPrompt {
    pub text: String,
    pub image: Option<DecodedImage>,
}

impl ModelPrompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }
}

/// One relay endpoint: its input shape, its prompt and its result key.
pub trait Relay {
    type Input;

    /// Envelope key carrying the model output
    const RESULT_KEY: &'static str;

    fn build_prompt(input: Self::Input) -> Result<ModelPrompt, RelayError>;
}

pub struct MealPlanRelay;

impl Relay for MealPlanRelay {
    type Input = HealthProfile;
    const RESULT_KEY: &'static str = MEAL_PLAN_KEY;

    fn build_prompt(profile: HealthProfile) -> Result<ModelPrompt, RelayError> {
        Ok(ModelPrompt::text(format!(
            "Create a personalized 1-day meal plan for:\n\
             Age: {}, Gender: {}, Height: {:?} cm, Weight: {:?} kg.\n\
             Goal: {}, Allergies: {}, Fitness Level: {}.\n\
             Include calories, macros, and meal timings.",
            profile.age,
            profile.gender,
            profile.height,
            profile.weight,
            profile.goal,
            profile.allergies,
            profile.fitness_level,
        )))
    }
}

pub struct FoodAnalysisRelay;

impl Relay for FoodAnalysisRelay {
    type Input = FoodImage;
    const RESULT_KEY: &'static str = FOOD_ANALYSIS_KEY;

    fn build_prompt(upload: FoodImage) -> Result<ModelPrompt, RelayError> {
        let image = upload.decode()?;
        Ok(ModelPrompt {
            text: FOOD_ANALYSIS_PROMPT.to_string(),
            image: Some(image),
        })
    }
}

/// Empty queries are forwarded as-is; only the client refuses them.
pub struct HealthQueryRelay;

impl Relay for HealthQueryRelay {
    type Input = String;
    const RESULT_KEY: &'static str = ANSWER_KEY;

    fn build_prompt(query: String) -> Result<ModelPrompt, RelayError> {
        Ok(ModelPrompt::text(format!(
            "Answer this health question scientifically: {}",
            query
        )))
    }
}

async fn call_model(model: &dyn GenerativeModel, prompt: ModelPrompt) -> Result<String, RelayError> {
    let text = match &prompt.image {
        Some(image) => model.complete_multimodal(&prompt.text, image).await?,
        None => model.complete(&prompt.text).await?,
    };
    Ok(text)
}

/// Runs one relay. Every failure, including a rejected input, becomes the
/// envelope's `error`; nothing propagates past this point.
pub async fn run_relay<R: Relay>(
    model: &dyn GenerativeModel,
    input: Result<R::Input, RelayError>,
) -> Envelope {
    let outcome = match input.and_then(R::build_prompt) {
        Ok(prompt) => call_model(model, prompt).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(text) => {
            info!("Relay `{}` succeeded ({} bytes)", R::RESULT_KEY, text.len());
            Envelope::success(R::RESULT_KEY, text)
        }
        Err(e) => {
            warn!("Relay `{}` failed: {}", R::RESULT_KEY, e);
            Envelope::failure(R::RESULT_KEY, e.to_string())
        }
    }
}
