use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ImageProvider, ImageResult, ProviderError, truncate_for_log};
use crate::prompt::Prompt;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Generative models can take a while; this is the upper bound for one attempt.
const TIMEOUT: Duration = Duration::from_secs(60);

/// Google Gemini image generation (`models/{model}:generateContent`).
///
/// Sends the raw prompt and only accepts a response that carries inline image
/// data somewhere in the first candidate's parts. A text-only answer is a
/// [`ProviderError::MalformedResponse`].
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: TIMEOUT,
            client: Client::new(),
        }
    }

    /// Point the provider at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: [&'static str; 2],
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize, Debug)]
struct InlineData {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

/// Pull the base64 image out of a `generateContent` response body.
fn extract_inline_image(body: &str) -> Result<ImageResult, ProviderError> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::MalformedResponse(format!("invalid Gemini JSON: {e}"))
    })?;

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ProviderError::MalformedResponse("no candidates in Gemini response".into()))?;

    let inline = candidate
        .content
        .as_ref()
        .and_then(|content| {
            content
                .parts
                .iter()
                .find_map(|part| part.inline_data.as_ref().filter(|i| !i.data.is_empty()))
        })
        .ok_or_else(|| ProviderError::MalformedResponse("no inline image data in Gemini response".into()))?;

    if let Some(mime) = inline.mime_type.as_deref() {
        log::debug!("Gemini inlineData mime_type={mime}");
    }

    Ok(ImageResult::base64(inline.data.clone()))
}

#[async_trait::async_trait]
impl ImageProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<ImageResult, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt.raw() }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["TEXT", "IMAGE"],
                candidate_count: 1,
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

        log::debug!("Gemini response: {}", truncate_for_log(&text, 300));
        extract_inline_image(&text)
    }
}
