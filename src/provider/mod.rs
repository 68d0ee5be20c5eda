mod gemini;
mod loremflickr;
mod openai;
mod picsum;

pub use gemini::GeminiProvider;
pub use loremflickr::LoremFlickrProvider;
pub use openai::OpenAiProvider;
pub use picsum::PicsumProvider;

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::Prompt;

/// Browser-like User-Agent sent to the plain image endpoints. Some of them
/// reject requests carrying a default HTTP client signature.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How an [`ImageResult`] carries its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// `data` is a URL pointing at the image.
    Url,
    /// `data` is the image bytes, base64-encoded (standard alphabet, padded).
    Base64,
}

/// The image produced by a provider, normalized to a single shape.
///
/// Every provider adapter returns this type no matter what its upstream
/// response looks like, so the caller sees the same contract whichever
/// provider answered.
///
/// Serializes as `{ "kind": "url" | "base64", "data": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub kind: ImageKind,
    pub data: String,
}

impl ImageResult {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: ImageKind::Url,
            data: url.into(),
        }
    }

    /// Wrap an already base64-encoded payload.
    pub fn base64(data: impl Into<String>) -> Self {
        Self {
            kind: ImageKind::Base64,
            data: data.into(),
        }
    }

    /// Base64-encode raw image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::base64(base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

/// Why a single provider attempt failed.
///
/// These never reach the caller of the fallback chain. They only decide that
/// the next provider gets its turn, and end up in the log.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or transport failure, including timeouts.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Upstream answered with a non-2xx status (auth, quota, bad request...).
    #[error("provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Upstream answered 2xx but without the expected payload.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Unavailable(format!("timed out: {e}"))
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}

/// An upstream service that turns a prompt into an image.
///
/// The crate ships four implementations: [`GeminiProvider`],
/// [`LoremFlickrProvider`], [`PicsumProvider`] and [`OpenAiProvider`].
/// Implement this trait to plug another backend into a
/// [`FallbackChain`](crate::chain::FallbackChain).
///
/// # Example
///
/// ```rust,no_run
/// use photo_chain::prompt::Prompt;
/// use photo_chain::provider::{ImageProvider, PicsumProvider};
///
/// # async fn example() -> anyhow::Result<()> {
/// let provider = PicsumProvider::new();
/// let image = provider.generate(&Prompt::new("mountain lake")).await?;
/// println!("{:?}: {} chars", image.kind, image.data.len());
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// The display name of this provider (e.g. "Gemini", "Picsum").
    fn name(&self) -> &str;

    /// Make exactly one attempt at producing an image for `prompt`.
    ///
    /// Implementations pick whichever prompt form their upstream expects:
    /// generative models take [`Prompt::raw`], URL-keyed services take
    /// [`Prompt::encoded`].
    async fn generate(&self, prompt: &Prompt) -> Result<ImageResult, ProviderError>;
}

/// GET a plain image endpoint and base64 the body.
///
/// Any 2xx counts as success; the body is not inspected.
async fn fetch_image(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<ImageResult, ProviderError> {
    log::debug!("GET {url}");

    let resp = client
        .get(url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .timeout(timeout)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Rejected {
            status: status.as_u16(),
            body: truncate_for_log(&body, 200),
        });
    }

    let bytes = resp.bytes().await?;
    log::debug!("Image bytes received: {}", bytes.len());
    Ok(ImageResult::from_bytes(&bytes))
}

/// Shorten an upstream body so it can go into a log line or error message.
fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}… (truncated)")
}
