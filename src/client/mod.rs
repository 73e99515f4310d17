//! Blocking client for the relay endpoints, used by the terminal front end.
//!
//! Each panel issues exactly one request per user action and turns whatever
//! comes back (or fails to come back) into a [`PanelOutcome`].

pub mod shell;

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde_json::Value;
use tracing::debug;

use crate::envelope::{ANSWER_KEY, ERROR_KEY, FOOD_ANALYSIS_KEY, MEAL_PLAN_KEY};
use crate::handlers::UPLOAD_FIELD;
use crate::models::HealthProfile;

pub use shell::{Shell, render};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

pub const AGE_RANGE: RangeInclusive<u32> = 1..=100;
pub const HEIGHT_RANGE: RangeInclusive<f64> = 100.0..=250.0;
pub const WEIGHT_RANGE: RangeInclusive<f64> = 30.0..=200.0;
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

pub const EMPTY_QUERY_WARNING: &str = "Please enter a question first.";

/// Static description of one UI panel
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub path: &'static str,
    pub result_key: &'static str,
    pub heading: &'static str,
    pub empty_warning: &'static str,
    pub failure_label: &'static str,
}

pub const MEAL_PLAN_PANEL: Panel = Panel {
    path: "/generate_meal_plan/",
    result_key: MEAL_PLAN_KEY,
    heading: "Your AI Meal Plan",
    empty_warning: "No meal plan returned.",
    failure_label: "Error fetching meal plan",
};

pub const FOOD_ANALYSIS_PANEL: Panel = Panel {
    path: "/analyze_food/",
    result_key: FOOD_ANALYSIS_KEY,
    heading: "Nutritional Analysis",
    empty_warning: "No analysis returned.",
    failure_label: "Error analyzing food",
};

pub const HEALTH_QUERY_PANEL: Panel = Panel {
    path: "/health_query/",
    result_key: ANSWER_KEY,
    heading: "Science-Backed Answer",
    empty_warning: "No answer returned.",
    failure_label: "Error fetching answer",
};

/// What a panel renders after one interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
    Success { heading: &'static str, body: String },
    /// Non-fatal: the call worked but produced nothing usable, or the input
    /// was refused before any request was made.
    Warning(String),
    /// The server answered with an `error` inside the envelope
    BackendError(String),
    /// Non-2xx status from the server
    RequestFailed { status: u16, body: String },
    /// The server could not be reached at all
    ConnectionError(String),
    Failed(String),
}

impl PanelOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PanelOutcome::Success { .. })
    }
}

/// Classifies a server response for the given panel.
pub fn interpret(panel: &Panel, status: u16, body: &str) -> PanelOutcome {
    if !(200..300).contains(&status) {
        return PanelOutcome::RequestFailed {
            status,
            body: body.to_string(),
        };
    }

    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(e) => return PanelOutcome::Failed(format!("{}: {}", panel.failure_label, e)),
    };

    let non_empty = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    if let Some(text) = non_empty(panel.result_key) {
        PanelOutcome::Success {
            heading: panel.heading,
            body: text,
        }
    } else if let Some(error) = non_empty(ERROR_KEY) {
        PanelOutcome::BackendError(error)
    } else {
        PanelOutcome::Warning(panel.empty_warning.to_string())
    }
}

/// Strips whitespace and trailing slashes from a configured base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Parses `raw` and checks it lies within `range`.
pub fn parse_in_range<T>(raw: &str, range: &RangeInclusive<T>) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display,
{
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", raw.trim()))?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "must be between {} and {}",
            range.start(),
            range.end()
        ))
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

fn image_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Synchronous HTTP client for the relay server
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    /// `timeout: None` lets a call wait for as long as the server takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: normalize_base_url(base_url),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, panel: &Panel) -> String {
        format!("{}{}", self.base_url, panel.path)
    }

    fn send(&self, panel: &Panel, request: RequestBuilder) -> PanelOutcome {
        debug!("POST {}", self.url(panel));
        match request.send() {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text() {
                    Ok(body) => interpret(panel, status, &body),
                    Err(e) => PanelOutcome::Failed(format!("{}: {}", panel.failure_label, e)),
                }
            }
            Err(e) if e.is_connect() => PanelOutcome::ConnectionError(format!(
                "Cannot connect to backend at {}. Is the server running?",
                self.base_url
            )),
            Err(e) => PanelOutcome::Failed(format!("{}: {}", panel.failure_label, e)),
        }
    }

    pub fn generate_meal_plan(&self, profile: &HealthProfile) -> PanelOutcome {
        let panel = &MEAL_PLAN_PANEL;
        self.send(panel, self.http.post(self.url(panel)).json(profile))
    }

    /// Uploads a `jpg`/`jpeg`/`png` file; other extensions are refused locally.
    pub fn analyze_food(&self, path: &Path) -> PanelOutcome {
        let panel = &FOOD_ANALYSIS_PANEL;
        if !is_supported_image(path) {
            return PanelOutcome::Warning(format!(
                "Unsupported file type for {}. Choose a jpg, jpeg or png image.",
                path.display()
            ));
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return PanelOutcome::Failed(format!(
                    "Cannot read {}: {}",
                    path.display(),
                    e
                ));
            }
        };
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = match multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(image_mime(path))
        {
            Ok(part) => part,
            Err(e) => return PanelOutcome::Failed(format!("{}: {}", panel.failure_label, e)),
        };
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        self.send(panel, self.http.post(self.url(panel)).multipart(form))
    }

    /// Blank questions never reach the network.
    pub fn ask(&self, query: &str) -> PanelOutcome {
        if query.trim().is_empty() {
            return PanelOutcome::Warning(EMPTY_QUERY_WARNING.to_string());
        }
        let panel = &HEALTH_QUERY_PANEL;
        self.send(
            panel,
            self.http.post(self.url(panel)).form(&[("query", query)]),
        )
    }
}
