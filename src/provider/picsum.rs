use std::time::Duration;

use reqwest::Client;

use super::{ImageProvider, ImageResult, ProviderError, fetch_image};
use crate::prompt::Prompt;

const DEFAULT_BASE_URL: &str = "https://picsum.photos";
const SIZE: u32 = 1024;
const TIMEOUT: Duration = Duration::from_secs(5);

/// Deterministic placeholder from Picsum, seeded by the encoded prompt.
///
/// The same prompt always maps to the same picture. An empty seed is still
/// requested as-is (`/seed//1024/1024`).
pub struct PicsumProvider {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl PicsumProvider {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: TIMEOUT,
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn image_url(&self, prompt: &Prompt) -> String {
        format!("{}/seed/{}/{SIZE}/{SIZE}", self.base_url, prompt.encoded())
    }
}

impl Default for PicsumProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ImageProvider for PicsumProvider {
    fn name(&self) -> &str {
        "Picsum"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<ImageResult, ProviderError> {
        fetch_image(&self.client, &self.image_url(prompt), self.timeout).await
    }
}
