//! External generative-model capability.
//!
//! Relays only see the [`GenerativeModel`] trait; the concrete backend
//! (Gemini or the offline mock) is chosen once at startup and injected
//! through the router state.

pub mod gemini;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{Config, ModelProvider};
use crate::food_image::DecodedImage;

pub use gemini::GeminiClient;
pub use mock::MockModel;

/// Failures of the external model call. Callers do not classify these any
/// further; the message ends up verbatim in the response envelope.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    InvalidResponse(String),

    #[error("Model returned no candidates{}", block_suffix(.0))]
    NoCandidates(Option<String>),

    #[error("Failed to encode image for the model: {0}")]
    ImageEncoding(String),

    #[error("{0}")]
    Unavailable(String),
}

fn block_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" (blocked: {})", reason),
        None => String::new(),
    }
}

/// Text and vision completion, treated as an opaque black box
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Completes a text-only prompt.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    /// Completes a prompt that comes with one image.
    async fn complete_multimodal(
        &self,
        prompt: &str,
        image: &DecodedImage,
    ) -> Result<String, ModelError>;
}

/// Builds the model backend selected in the configuration
pub fn model_from_config(config: &Config) -> anyhow::Result<Arc<dyn GenerativeModel>> {
    let model: Arc<dyn GenerativeModel> = match config.provider {
        ModelProvider::Gemini => Arc::new(GeminiClient::new(config.gemini.clone())?),
        ModelProvider::Mock => Arc::new(MockModel::new()),
    };
    Ok(model)
}
