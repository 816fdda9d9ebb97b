use crate::{
    api::GenerationApi,
    config::ApiConfig,
    error::{ImagenError, Result, GENERIC_FAILURE_MESSAGE},
    models::{error_field, GenerateRequest, GenerateResponse},
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub struct ImageApiClient {
    client: Client,
    endpoint: Url,
}

impl ImageApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .ok_or_else(|| ImagenError::Config("API endpoint is required".into()))?;
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            ImagenError::Config(format!("invalid API endpoint '{}': {}", endpoint, e))
        })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ImagenError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationApi for ImageApiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
        let payload = serde_json::to_vec(&GenerateRequest::new(prompt))
            .map_err(|e| ImagenError::Serialization(e.to_string()))?;

        log::debug!("POST {} ({} bytes)", self.endpoint, payload.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ImagenError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ImagenError::Transport(e.to_string()))?;

        // The body is read as JSON whatever the status says.
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ImagenError::Transport(format!("invalid JSON response: {}", e)))?;

        if !status.is_success() {
            let message =
                error_field(&body).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            log::warn!("Generation failed with status {}: {}", status, message);
            return Err(ImagenError::Application {
                status: status.as_u16(),
                message,
            });
        }

        Ok(GenerateResponse::from_value(&body))
    }
}
