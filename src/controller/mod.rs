pub mod cooldown;
pub mod lifecycle;

pub use cooldown::{Cooldown, CooldownTimer};
pub use lifecycle::{
    Completion, CompletionStatus, Key, PendingRequest, Rejection, RequestController,
    SubmitDecision, SubmitOutcome,
};
