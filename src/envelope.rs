use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const MEAL_PLAN_KEY: &str = "meal_plan";
pub const FOOD_ANALYSIS_KEY: &str = "food_analysis";
pub const ANSWER_KEY: &str = "answer";
pub const ERROR_KEY: &str = "error";

/// The fixed two-key JSON object every relay endpoint answers with.
///
/// Serialises as `{"<key>": text, "error": null}` on success and
/// `{"<key>": null, "error": message}` on failure. Both keys are always
/// emitted so clients can look either of them up unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    key: &'static str,
    result: Result<String, String>,
}

impl Envelope {
    pub fn success(key: &'static str, text: impl Into<String>) -> Self {
        Self {
            key,
            result: Ok(text.into()),
        }
    }

    pub fn failure(key: &'static str, error: impl Into<String>) -> Self {
        Self {
            key,
            result: Err(error.into()),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn text(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.text())?;
        map.serialize_entry(ERROR_KEY, &self.error())?;
        map.end()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success(MEAL_PLAN_KEY, "Eat oats");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"meal_plan": "Eat oats", "error": null})
        );
    }

    #[test]
    fn test_failure_shape() {
        let envelope = Envelope::failure(ANSWER_KEY, "quota exceeded");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"answer": null, "error": "quota exceeded"})
        );
        assert_eq!(envelope.text(), None);
        assert_eq!(envelope.error(), Some("quota exceeded"));
    }

    #[test]
    fn test_empty_text_is_still_success() {
        let envelope = Envelope::success(FOOD_ANALYSIS_KEY, "");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["food_analysis"], json!(""));
        assert!(value["error"].is_null());
    }
}
