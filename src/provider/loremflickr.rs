use std::time::Duration;

use reqwest::Client;

use super::{ImageProvider, ImageResult, ProviderError, fetch_image};
use crate::prompt::Prompt;

const DEFAULT_BASE_URL: &str = "https://loremflickr.com";
const SIZE: u32 = 800;
const TIMEOUT: Duration = Duration::from_secs(8);

/// Keyword-matched stock photo from LoremFlickr.
///
/// Requests `/{800}/{800}/{encoded prompt}`. Whatever image comes back is
/// accepted; there is no check that it actually matches the keywords.
pub struct LoremFlickrProvider {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl LoremFlickrProvider {
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
        format!("{}/{SIZE}/{SIZE}/{}", self.base_url, prompt.encoded())
    }
}

impl Default for LoremFlickrProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ImageProvider for LoremFlickrProvider {
    fn name(&self) -> &str {
        "LoremFlickr"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<ImageResult, ProviderError> {
        fetch_image(&self.client, &self.image_url(prompt), self.timeout).await
    }
}
