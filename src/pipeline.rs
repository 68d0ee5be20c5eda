use serde::{Deserialize, Serialize};

use crate::chain::{ChainError, FallbackChain, Generation};
use crate::config::Config;
use crate::prompt::Prompt;
use crate::provider::{
    self, GeminiProvider, ImageProvider, ImageResult, LoremFlickrProvider, OpenAiProvider,
    PicsumProvider,
};

/// Fixed message returned to callers when every provider fails.
pub const GENERATION_FAILED: &str = "Failed to generate image";

/// What the caller receives on success: `{ "photo": "..." }`.
///
/// `photo` is either a URL or a base64 string depending on which provider
/// answered. Both are valid photo values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub photo: String,
}

impl From<ImageResult> for ImageResponse {
    fn from(image: ImageResult) -> Self {
        Self { photo: image.data }
    }
}

/// What the caller receives on failure: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Build the provider fallback chain from configuration.
///
/// Creates provider instances following `provider_order`, skipping disabled
/// providers and keyed providers with no API key configured.
///
/// # Example
///
/// ```rust,no_run
/// use photo_chain::config::Config;
/// use photo_chain::pipeline::build_provider_chain;
///
/// let mut config = Config::load(Some("config.json".as_ref())).unwrap();
/// config.apply_env();
/// let chain = build_provider_chain(&config);
/// println!("Chain: {}", chain.provider_names().join(" → "));
/// ```
pub fn build_provider_chain(config: &Config) -> FallbackChain {
    let mut providers: Vec<Box<dyn ImageProvider>> = Vec::new();

    for name in config.enabled_providers() {
        match name.as_str() {
            "gemini" => {
                if config.providers.gemini.api_key.is_empty() {
                    log::warn!(
                        "Gemini enabled but no API key configured (set {})",
                        crate::config::GEMINI_API_KEY_ENV
                    );
                    continue;
                }
                providers.push(Box::new(GeminiProvider::new(
                    config.providers.gemini.api_key.clone(),
                    config.providers.gemini.model.clone(),
                )));
            }
            "loremflickr" => providers.push(Box::new(LoremFlickrProvider::new())),
            "picsum" => providers.push(Box::new(PicsumProvider::new())),
            "openai" => {
                if config.providers.openai.api_key.is_empty() {
                    log::warn!(
                        "OpenAI enabled but no API key configured (set {})",
                        crate::config::OPENAI_API_KEY_ENV
                    );
                    continue;
                }
                providers.push(Box::new(OpenAiProvider::new(
                    config.providers.openai.api_key.clone(),
                    config.providers.openai.model.clone(),
                )));
            }
            _ => {}
        }
    }

    FallbackChain::new(providers)
}

/// Run the chain for a raw prompt, keeping which provider answered.
///
/// This is the request-level entry point: it derives the sanitized and
/// encoded prompt forms, runs the chain, and collapses any exhaustion into
/// [`GENERATION_FAILED`] so no upstream detail leaks to the caller.
pub async fn generate_image(
    chain: &FallbackChain,
    raw_prompt: &str,
) -> Result<Generation, ErrorResponse> {
    let prompt = Prompt::new(raw_prompt);
    log::debug!(
        "Prompt: {} chars raw, sanitized {:?}",
        prompt.raw().len(),
        prompt.sanitized()
    );

    match chain.generate(&prompt).await {
        Ok(generation) => {
            log::info!("Image from {} ({:?})", generation.provider, generation.image.kind);
            Ok(generation)
        }
        Err(ChainError::AllProvidersExhausted { .. }) => Err(ErrorResponse::new(GENERATION_FAILED)),
    }
}

/// Turn a raw prompt into a photo, or the fixed failure message.
pub async fn generate_photo(
    chain: &FallbackChain,
    raw_prompt: &str,
) -> Result<ImageResponse, ErrorResponse> {
    generate_image(chain, raw_prompt)
        .await
        .map(|generation| generation.image.into())
}

/// Decode a base64 [`ImageResult`] back into bytes.
///
/// Returns `Ok(None)` for URL results.
pub fn decode_image(image: &ImageResult) -> anyhow::Result<Option<Vec<u8>>> {
    use anyhow::Context;
    use base64::Engine;

    match image.kind {
        provider::ImageKind::Url => Ok(None),
        provider::ImageKind::Base64 => base64::engine::general_purpose::STANDARD
            .decode(image.data.as_bytes())
            .map(Some)
            .context("Provider returned invalid base64"),
    }
}
