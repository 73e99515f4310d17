use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for FitnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FitnessLevel::Beginner => "Beginner",
            FitnessLevel::Intermediate => "Intermediate",
            FitnessLevel::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

/// Request payload for the meal plan endpoint.
///
/// Ranges (age 1-100, height 100-250 cm, weight 30-200 kg) are enforced by
/// the client before the request is sent; the server only checks types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    #[serde(deserialize_with = "lax_whole_number")]
    pub age: u32,
    pub gender: Gender,
    #[serde(deserialize_with = "lax_number")]
    pub height: f64,
    #[serde(deserialize_with = "lax_number")]
    pub weight: f64,
    pub goal: String,
    /// Comma-separated, passed through unparsed
    pub allergies: String,
    pub fitness_level: FitnessLevel,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts a JSON number or a numeric string such as `"175"`.
fn lax_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => value,
        NumberOrText::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid number `{}`", raw)))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(D::Error::custom("number must be finite"))
    }
}

/// Like [`lax_number`], but the value must have no fractional part (`30.0` is fine).
fn lax_whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = lax_number(deserializer)?;
    if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Ok(value as u32)
    } else {
        Err(D::Error::custom(format!("expected a whole number, got {}", value)))
    }
}

/// Form payload for the health query endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryForm {
    pub query: String,
}

/// Payload of the liveness and favicon fallback endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_integer_measurements() {
        let profile: HealthProfile = serde_json::from_str(
            r#"{"age":30,"gender":"Male","height":175,"weight":70,"goal":"Weight loss","allergies":"none","fitness_level":"Intermediate"}"#,
        )
        .unwrap();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.height, 175.0);
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.fitness_level, FitnessLevel::Intermediate);
    }

    fn profile_with(age: &str, height: &str) -> serde_json::Result<HealthProfile> {
        serde_json::from_str(&format!(
            r#"{{"age":{},"gender":"Female","height":{},"weight":60,"goal":"","allergies":"","fitness_level":"Beginner"}}"#,
            age, height
        ))
    }

    #[test]
    fn test_profile_coerces_lax_numbers() {
        let profile = profile_with("30.0", r#""175""#).unwrap();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.height, 175.0);

        let profile = profile_with(r#""42""#, "162.5").unwrap();
        assert_eq!(profile.age, 42);
        assert_eq!(profile.height, 162.5);
    }

    #[test]
    fn test_profile_rejects_fractional_age_and_non_numeric_text() {
        assert!(profile_with("30.5", "175").is_err());
        assert!(profile_with("-1", "175").is_err());
        assert!(profile_with("30", r#""tall""#).is_err());
        assert!(profile_with("30", r#""inf""#).is_err());
    }

    #[test]
    fn test_profile_rejects_unknown_gender() {
        let result = serde_json::from_str::<HealthProfile>(
            r#"{"age":30,"gender":"Robot","height":175,"weight":70,"goal":"","allergies":"","fitness_level":"Beginner"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_labels_match_wire_names() {
        assert_eq!(Gender::Female.to_string(), "Female");
        assert_eq!(FitnessLevel::Advanced.to_string(), "Advanced");
        assert_eq!(
            serde_json::to_string(&FitnessLevel::Advanced).unwrap(),
            "\"Advanced\""
        );
    }
}
