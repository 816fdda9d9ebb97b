pub mod http_client;

use crate::{error::Result, models::GenerateResponse};
use async_trait::async_trait;

pub use http_client::ImageApiClient;

/// The remote image-generation service.
///
/// `Ok` is returned only for a 2xx answer. Failure statuses come back as
/// `ImagenError::Application`, anything that kept a JSON body from arriving
/// as `ImagenError::Transport`.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse>;
}
