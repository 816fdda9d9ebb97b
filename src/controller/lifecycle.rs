use crate::{
    api::GenerationApi,
    config::ControllerConfig,
    error::ImagenError,
    logger,
    models::{GenerationOutcome, GenerationResult, Phase, SessionState},
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
}

/// Why a submission was ignored. The session state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    CoolingDown { remaining_secs: u32 },
    InFlight,
}

pub enum SubmitDecision {
    /// A request was issued; run it and hand the completion back.
    Dispatched(PendingRequest),
    Rejected(Rejection),
    /// The prompt was empty and the validation error is now shown.
    Invalid,
}

impl std::fmt::Debug for SubmitDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitDecision::Dispatched(pending) => f
                .debug_tuple("Dispatched")
                .field(&pending.seq)
                .finish(),
            SubmitDecision::Rejected(rejection) => {
                f.debug_tuple("Rejected").field(rejection).finish()
            }
            SubmitDecision::Invalid => f.write_str("Invalid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Applied { cooldown_started: bool },
    /// A newer request was dispatched, or this one was already applied.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(CompletionStatus),
    Rejected(Rejection),
    Invalid,
}

/// The result of one dispatched request, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub seq: u64,
    pub request_id: Uuid,
    pub outcome: GenerationOutcome,
}

/// One in-flight generation request. Owns everything it needs so it can be
/// spawned independently of the controller that issued it.
pub struct PendingRequest {
    pub seq: u64,
    pub request_id: Uuid,
    prompt: String,
    api: Arc<dyn GenerationApi>,
}

impl PendingRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Performs the request. Every failure is folded into the outcome.
    pub async fn run(self) -> Completion {
        let _timer = logger::timer(&format!("generate request {}", self.request_id));

        let outcome = match self.api.generate(&self.prompt).await {
            Ok(response) => GenerationOutcome::from(response),
            Err(e) => {
                log::debug!("Request {} failed: {}", self.request_id, e);
                GenerationOutcome::Failure {
                    message: e.user_message(),
                }
            }
        };

        Completion {
            seq: self.seq,
            request_id: self.request_id,
            outcome,
        }
    }
}

/// Drives one view's submit → await → result/error → cooldown cycle.
pub struct RequestController {
    config: ControllerConfig,
    api: Arc<dyn GenerationApi>,
    state: SessionState,
    last_seq: u64,
    in_flight: Option<u64>,
}

impl RequestController {
    pub fn new(config: ControllerConfig, api: Arc<dyn GenerationApi>) -> Self {
        Self {
            config,
            api,
            state: SessionState::new(),
            last_seq: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn update_prompt(&mut self, text: impl Into<String>) {
        self.state.prompt = text.into();
    }

    pub fn on_key(&mut self, key: Key) -> Option<SubmitDecision> {
        match key {
            Key::Enter => Some(self.begin_submit()),
            _ => None,
        }
    }

    /// Checks preconditions and, if they hold, enters `Loading` and returns
    /// the request to run. The prompt is captured as it is now.
    pub fn begin_submit(&mut self) -> SubmitDecision {
        if self.state.cooldown.is_active() {
            let remaining_secs = self.state.cooldown.remaining();
            log::debug!("Submit ignored, cooling down for {}s", remaining_secs);
            return SubmitDecision::Rejected(Rejection::CoolingDown { remaining_secs });
        }

        if self.config.reject_while_loading && self.in_flight.is_some() {
            log::debug!("Submit ignored, a request is already in flight");
            return SubmitDecision::Rejected(Rejection::InFlight);
        }

        if self.state.prompt.trim().is_empty() {
            self.state.phase = Phase::Error(ImagenError::empty_prompt().user_message());
            return SubmitDecision::Invalid;
        }

        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        self.state.phase = Phase::Loading;

        let pending = PendingRequest {
            seq: self.last_seq,
            request_id: Uuid::new_v4(),
            prompt: self.state.prompt.clone(),
            api: self.api.clone(),
        };
        log::info!(
            "🎨 Dispatching request {} (seq {})",
            pending.request_id,
            pending.seq
        );

        SubmitDecision::Dispatched(pending)
    }

    /// Applies a finished request. Only the latest dispatched request is
    /// applied, and only once; anything else is discarded.
    pub fn complete(&mut self, completion: Completion) -> CompletionStatus {
        if self.in_flight != Some(completion.seq) {
            log::debug!(
                "Discarding stale completion {} (seq {}, latest {})",
                completion.request_id,
                completion.seq,
                self.last_seq
            );
            return CompletionStatus::Stale;
        }
        self.in_flight = None;

        match completion.outcome {
            GenerationOutcome::Success { image_url, caption } => {
                log::info!("✅ Request {} succeeded", completion.request_id);
                self.state.phase = Phase::Success(GenerationResult { image_url, caption });

                let cooldown_started = self.config.cooldown_secs > 0;
                if cooldown_started {
                    self.state.cooldown.start(self.config.cooldown_secs);
                    log::debug!("Cooldown started: {}s", self.config.cooldown_secs);
                }
                CompletionStatus::Applied { cooldown_started }
            }
            GenerationOutcome::Failure { message } => {
                log::warn!("Request {} failed: {}", completion.request_id, message);
                self.state.phase = Phase::Error(message);
                CompletionStatus::Applied {
                    cooldown_started: false,
                }
            }
        }
    }

    /// Submits and waits for the response in place.
    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.begin_submit() {
            SubmitDecision::Dispatched(pending) => {
                let completion = pending.run().await;
                SubmitOutcome::Completed(self.complete(completion))
            }
            SubmitDecision::Rejected(rejection) => SubmitOutcome::Rejected(rejection),
            SubmitDecision::Invalid => SubmitOutcome::Invalid,
        }
    }

    /// One elapsed cooldown second. Returns the seconds left.
    pub fn tick(&mut self) -> u32 {
        let remaining = self.state.cooldown.tick();
        if remaining == 0 {
            log::debug!("Cooldown finished");
        }
        remaining
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, EMPTY_PROMPT_MESSAGE, GENERIC_FAILURE_MESSAGE};
    use crate::models::GenerateResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Reply {
        Ok(&'static str, &'static str),
        Status(u16, Option<&'static str>),
        Transport(&'static str),
    }

    struct ScriptedApi {
        reply: Reply,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationApi for ScriptedApi {
        async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
            self.calls.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Reply::Ok(image_url, caption) => Ok(GenerateResponse {
                    image_url: image_url.to_string(),
                    caption: caption.to_string(),
                }),
                Reply::Status(status, error) => Err(ImagenError::Application {
                    status: *status,
                    message: error.unwrap_or(GENERIC_FAILURE_MESSAGE).to_string(),
                }),
                Reply::Transport(msg) => Err(ImagenError::Transport(msg.to_string())),
            }
        }
    }

    fn controller(config: ControllerConfig, api: Arc<ScriptedApi>) -> RequestController {
        RequestController::new(config, api)
    }

    #[tokio::test]
    async fn test_success_sets_result_and_cooldown() {
        let api = ScriptedApi::new(Reply::Ok("http://x/img.png", "A cat astronaut"));
        let mut ctl = controller(ControllerConfig::hosted(), api.clone());

        ctl.update_prompt("a cat astronaut");
        let outcome = ctl.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Completed(CompletionStatus::Applied {
                cooldown_started: true
            })
        );
        let result = ctl.state().result().unwrap();
        assert_eq!(result.image_url, "http://x/img.png");
        assert_eq!(result.caption, "A cat astronaut");
        assert!(ctl.state().error_message().is_none());
        assert!(!ctl.state().is_loading());
        assert_eq!(ctl.state().cooldown_secs(), 45);
        assert_eq!(api.calls(), vec!["a cat astronaut".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_or_blank_prompt_never_calls_api() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::hosted(), api.clone());

        for prompt in ["", "   ", "\t\n"] {
            ctl.update_prompt(prompt);
            assert_eq!(ctl.submit().await, SubmitOutcome::Invalid);
            assert_eq!(ctl.state().error_message(), Some(EMPTY_PROMPT_MESSAGE));
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_rejects_without_touching_state() {
        let api = ScriptedApi::new(Reply::Ok("http://x/img.png", "first"));
        let mut ctl = controller(ControllerConfig::hosted(), api.clone());

        ctl.update_prompt("first");
        ctl.submit().await;
        let before = ctl.state().phase.clone();

        ctl.update_prompt("second");
        assert_eq!(
            ctl.submit().await,
            SubmitOutcome::Rejected(Rejection::CoolingDown { remaining_secs: 45 })
        );
        assert_eq!(ctl.state().phase, before);
        assert_eq!(ctl.state().cooldown_secs(), 45);
        assert_eq!(api.calls().len(), 1);

        // Cooldown also wins over an empty prompt.
        ctl.update_prompt("");
        assert!(matches!(ctl.submit().await, SubmitOutcome::Rejected(_)));
        assert_eq!(ctl.state().phase, before);
    }

    #[tokio::test]
    async fn test_submissions_accepted_again_after_countdown() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::hosted(), api.clone());

        ctl.update_prompt("a cat astronaut");
        ctl.submit().await;

        for expected in (0..45).rev() {
            assert_eq!(ctl.tick(), expected);
        }
        assert_eq!(ctl.tick(), 0);

        assert!(matches!(ctl.submit().await, SubmitOutcome::Completed(_)));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_local_profile_has_no_cooldown() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::local(), api.clone());

        ctl.update_prompt("again and again");
        assert_eq!(
            ctl.submit().await,
            SubmitOutcome::Completed(CompletionStatus::Applied {
                cooldown_started: false
            })
        );
        assert_eq!(ctl.state().cooldown_secs(), 0);
        assert!(matches!(ctl.submit().await, SubmitOutcome::Completed(_)));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_with_error_field() {
        let api = ScriptedApi::new(Reply::Status(400, Some("Request blocked due to: SAFETY")));
        let mut ctl = controller(ControllerConfig::hosted(), api);

        ctl.update_prompt("something");
        ctl.submit().await;

        assert_eq!(
            ctl.state().error_message(),
            Some("Request blocked due to: SAFETY")
        );
        assert!(ctl.state().result().is_none());
        assert_eq!(ctl.state().cooldown_secs(), 0);
    }

    #[tokio::test]
    async fn test_failure_without_error_field_is_generic() {
        let api = ScriptedApi::new(Reply::Status(500, None));
        let mut ctl = controller(ControllerConfig::hosted(), api);

        ctl.update_prompt("something");
        ctl.submit().await;

        assert_eq!(ctl.state().error_message(), Some(GENERIC_FAILURE_MESSAGE));
        assert!(ctl.state().result().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let api = ScriptedApi::new(Reply::Transport("connection refused"));
        let mut ctl = controller(ControllerConfig::hosted(), api);
        ctl.update_prompt("something");
        ctl.submit().await;
        assert_eq!(ctl.state().error_message(), Some("connection refused"));

        let api = ScriptedApi::new(Reply::Transport(""));
        let mut ctl = controller(ControllerConfig::hosted(), api);
        ctl.update_prompt("something");
        ctl.submit().await;
        assert_eq!(ctl.state().error_message(), Some("Network error"));
    }

    #[tokio::test]
    async fn test_loading_is_left_exactly_once() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::local(), api);

        ctl.update_prompt("a prompt");
        let pending = match ctl.begin_submit() {
            SubmitDecision::Dispatched(pending) => pending,
            other => panic!("expected dispatch, got {:?}", other),
        };
        assert!(ctl.state().is_loading());
        assert!(ctl.state().result().is_none());
        assert!(ctl.state().error_message().is_none());

        let completion = pending.run().await;
        assert!(matches!(
            ctl.complete(completion.clone()),
            CompletionStatus::Applied { .. }
        ));
        assert!(!ctl.state().is_loading());

        // Delivering the same completion again changes nothing.
        ctl.update_prompt("edited after completion");
        let before = ctl.state().phase.clone();
        assert_eq!(ctl.complete(completion), CompletionStatus::Stale);
        assert_eq!(ctl.state().phase, before);
    }

    #[tokio::test]
    async fn test_resubmit_while_loading_is_rejected_by_default() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::hosted(), api.clone());

        ctl.update_prompt("first");
        let first = ctl.begin_submit();
        assert!(matches!(first, SubmitDecision::Dispatched(_)));
        assert!(matches!(
            ctl.on_key(Key::Enter),
            Some(SubmitDecision::Rejected(Rejection::InFlight))
        ));
        assert!(ctl.state().is_loading());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded_when_reentry_allowed() {
        let api = ScriptedApi::new(Reply::Ok("http://x/img.png", "caption"));
        let config = ControllerConfig::local().with_reject_while_loading(false);
        let mut ctl = controller(config, api);

        ctl.update_prompt("first");
        let first = match ctl.begin_submit() {
            SubmitDecision::Dispatched(pending) => pending,
            other => panic!("expected dispatch, got {:?}", other),
        };
        ctl.update_prompt("second");
        let second = match ctl.begin_submit() {
            SubmitDecision::Dispatched(pending) => pending,
            other => panic!("expected dispatch, got {:?}", other),
        };
        assert_eq!(first.prompt(), "first");
        assert_eq!(second.prompt(), "second");
        assert!(second.seq > first.seq);

        let first_done = first.run().await;
        let second_done = second.run().await;

        assert_eq!(ctl.complete(first_done), CompletionStatus::Stale);
        assert!(ctl.state().is_loading());
        assert!(matches!(
            ctl.complete(second_done),
            CompletionStatus::Applied { .. }
        ));
        assert!(!ctl.state().is_loading());
    }

    #[tokio::test]
    async fn test_prompt_edits_do_not_affect_in_flight_request() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::hosted(), api.clone());

        ctl.update_prompt("original");
        let pending = match ctl.begin_submit() {
            SubmitDecision::Dispatched(pending) => pending,
            other => panic!("expected dispatch, got {:?}", other),
        };
        ctl.update_prompt("typed while loading");
        let completion = pending.run().await;
        ctl.complete(completion);

        assert_eq!(api.calls(), vec!["original".to_string()]);
        assert_eq!(ctl.state().prompt, "typed while loading");
    }

    #[test]
    fn test_only_enter_submits() {
        let api = ScriptedApi::new(Reply::Ok("u", "c"));
        let mut ctl = controller(ControllerConfig::hosted(), api);
        ctl.update_prompt("");

        assert!(ctl.on_key(Key::Char('a')).is_none());
        assert!(ctl.on_key(Key::Escape).is_none());
        assert_eq!(ctl.state().phase, Phase::Idle);

        assert!(matches!(ctl.on_key(Key::Enter), Some(SubmitDecision::Invalid)));
        assert_eq!(ctl.state().error_message(), Some(EMPTY_PROMPT_MESSAGE));
    }
}
