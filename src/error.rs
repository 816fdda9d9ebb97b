use thiserror::Error;

/// Shown when a submission is attempted with an empty or whitespace-only prompt.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt!";

/// Used when the API answers with a failure status but no `error` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong!";

/// Used when a transport failure carries no description of its own.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

#[derive(Debug, Error)]
pub enum ImagenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Application { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImagenError {
    /// The single message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            ImagenError::Validation(msg) => msg.clone(),
            ImagenError::Application { message, .. } => message.clone(),
            ImagenError::Transport(msg) if msg.trim().is_empty() => {
                NETWORK_ERROR_MESSAGE.to_string()
            }
            ImagenError::Transport(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn empty_prompt() -> Self {
        ImagenError::Validation(EMPTY_PROMPT_MESSAGE.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImagenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_shows_server_message() {
        let err = ImagenError::Application {
            status: 400,
            message: "chatInput is required".into(),
        };
        assert_eq!(err.user_message(), "chatInput is required");
        assert_eq!(err.to_string(), "API error (400): chatInput is required");
    }

    #[test]
    fn test_blank_transport_error_falls_back() {
        assert_eq!(
            ImagenError::Transport("  ".into()).user_message(),
            NETWORK_ERROR_MESSAGE
        );
        assert_eq!(
            ImagenError::Transport("connection refused".into()).user_message(),
            "connection refused"
        );
    }

    #[test]
    fn test_empty_prompt_message() {
        assert_eq!(ImagenError::empty_prompt().user_message(), EMPTY_PROMPT_MESSAGE);
    }
}
