//! Offline model for local runs and tests.

use async_trait::async_trait;

use super::{GenerativeModel, ModelError};
use crate::food_image::DecodedImage;

/// Echoes prompts back instead of calling a real model
#[derive(Debug, Clone, Default)]
pub struct MockModel {
    failure: Option<String>,
    reply: Option<String>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            reply: None,
        }
    }

    /// Every call succeeds with the given text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            failure: None,
            reply: Some(text.into()),
        }
    }

    fn respond(&self, echo: String) -> Result<String, ModelError> {
        if let Some(message) = &self.failure {
            return Err(ModelError::Unavailable(message.clone()));
        }
        Ok(self.reply.clone().unwrap_or(echo))
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.respond(format!("Mock response for: {}", prompt))
    }

    async fn complete_multimodal(
        &self,
        prompt: &str,
        image: &DecodedImage,
    ) -> Result<String, ModelError> {
        self.respond(format!(
            "Mock response for: {} [image {}x{}]",
            prompt,
            image.width(),
            image.height()
        ))
    }
}
