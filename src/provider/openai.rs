use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use super::{ImageProvider, ImageResult, ProviderError, truncate_for_log};
use crate::prompt::Prompt;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: TIMEOUT,
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// `data[0].url` wins over `data[0].b64_json`; either one is a success.
fn extract_image(json: &serde_json::Value) -> Result<ImageResult, ProviderError> {
    let first = &json["data"][0];

    if let Some(url) = first["url"].as_str().filter(|s| !s.is_empty()) {
        return Ok(ImageResult::url(url));
    }
    if let Some(b64) = first["b64_json"].as_str().filter(|s| !s.is_empty()) {
        return Ok(ImageResult::base64(b64));
    }

    Err(ProviderError::MalformedResponse(
        "no image in OpenAI response".into(),
    ))
}

#[async_trait::async_trait]
impl ImageProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<ImageResult, ProviderError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt.raw(),
            "size": "1024x1024",
            "n": 1
        });

        let resp = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body: truncate_for_log(&text, 500),
            });
        }

        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            ProviderError::MalformedResponse(format!("invalid OpenAI JSON: {e}"))
        })?;

        extract_image(&json)
    }
}
