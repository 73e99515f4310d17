use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, bail};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Which generative-model backend the relays talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Mock,
}

impl ModelProvider {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            other => bail!("MODEL_PROVIDER must be `gemini` or `mock`, got `{}`", other),
        }
    }
}

/// Settings for the Gemini completion API
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: ModelProvider,
    pub gemini: GeminiConfig,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Reads the configuration from the process environment, after loading
    /// an optional `.env` file from the working directory.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid number, got `{}`", raw))?,
            None => 8000,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("MAX_UPLOAD_BYTES must be a valid number, got `{}`", raw)
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let provider = match lookup("MODEL_PROVIDER") {
            Some(raw) => ModelProvider::parse(&raw)?,
            None => ModelProvider::Gemini,
        };

        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let model = model.trim().trim_start_matches("models/").to_string();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            provider,
            gemini: GeminiConfig {
                api_key: lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty()),
                model,
                base_url: lookup("GEMINI_BASE_URL")
                    .map(|url| url.trim().trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            },
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            max_upload_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
