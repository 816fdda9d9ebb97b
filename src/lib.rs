//! Client for a prompt-to-image generation API.
//!
//! The [`controller::RequestController`] owns the lifecycle of one user action:
//! submit a prompt, wait for the API, show the image or the error, then hold
//! further submissions back for a cooldown. [`view`] embeds it in a terminal.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logger;
pub mod models;
pub mod view;

pub use api::{GenerationApi, ImageApiClient};
pub use config::{ApiConfig, Config, ControllerConfig, Profile};
pub use controller::{RequestController, SubmitDecision, SubmitOutcome};
pub use error::{ImagenError, Result};
pub use models::*;
