use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST <endpoint>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "chatInput")]
    pub chat_input: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            chat_input: prompt.into(),
        }
    }
}

/// Successful response body. Fields are taken as-is: no URL or emptiness checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
}

impl GenerateResponse {
    /// Reads `image_url` and `caption` from any JSON value. Missing or
    /// non-string fields become empty strings.
    pub fn from_value(body: &Value) -> Self {
        Self {
            image_url: string_field(body, "image_url").unwrap_or_default(),
            caption: string_field(body, "caption").unwrap_or_default(),
        }
    }
}

/// The `error` field of a failure body, if it is a non-empty string.
pub fn error_field(body: &Value) -> Option<String> {
    string_field(body, "error").filter(|msg| !msg.is_empty())
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// What a finished request resolved to, already reduced to what the view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success { image_url: String, caption: String },
    Failure { message: String },
}

impl From<GenerateResponse> for GenerationOutcome {
    fn from(response: GenerateResponse) -> Self {
        GenerationOutcome::Success {
            image_url: response.image_url,
            caption: response.caption,
        }
    }
}
