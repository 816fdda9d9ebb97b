use crate::controller::cooldown::Cooldown;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_url: String,
    pub caption: String,
}

/// Exactly one phase is active at a time; result and error live inside their phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success(GenerationResult),
    Error(String),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Success(_) => "success",
            Phase::Error(_) => "error",
        }
    }
}

/// State of one view's generation attempts. Created empty on mount, dropped on teardown.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub prompt: String,
    pub phase: Phase,
    pub cooldown: Cooldown,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.phase {
            Phase::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn cooldown_secs(&self) -> u32 {
        self.cooldown.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = SessionState::new();
        assert_eq!(state.prompt, "");
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.is_loading());
        assert!(state.result().is_none());
        assert!(state.error_message().is_none());
        assert_eq!(state.cooldown_secs(), 0);
    }

    #[test]
    fn test_accessors_follow_phase() {
        let mut state = SessionState::new();
        state.phase = Phase::Success(GenerationResult {
            image_url: "http://x/img.png".into(),
            caption: "A cat astronaut".into(),
        });
        assert_eq!(state.result().map(|r| r.caption.as_str()), Some("A cat astronaut"));
        assert!(state.error_message().is_none());

        state.phase = Phase::Error("boom".into());
        assert!(state.result().is_none());
        assert_eq!(state.error_message(), Some("boom"));
        assert_eq!(state.phase.name(), "error");
    }
}
