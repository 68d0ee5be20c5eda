//! Prompt sanitizing and URL encoding.
//!
//! A [`Prompt`] carries the raw text exactly as the caller sent it, plus the two
//! forms derived from it:
//!
//! - **sanitized** — only `[A-Za-z0-9 ]` survives, for providers that embed the
//!   prompt in a URL
//! - **encoded** — the sanitized form percent-encoded as a URL component
//!
//! Both derived forms are computed once in [`Prompt::new`] and cannot be changed
//! afterwards.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A request-scoped prompt with its sanitized and encoded forms.
///
/// # Example
///
/// ```rust
/// use photo_chain::prompt::Prompt;
///
/// let prompt = Prompt::new("a red apple!!");
/// assert_eq!(prompt.raw(), "a red apple!!");
/// assert_eq!(prompt.sanitized(), "a red apple");
/// assert_eq!(prompt.encoded(), "a%20red%20apple");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    raw: String,
    sanitized: String,
    encoded: String,
}

impl Prompt {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let sanitized = sanitize(&raw);
        let encoded = encode(&sanitized);
        Self {
            raw,
            sanitized,
            encoded,
        }
    }

    /// The prompt as received. Generative providers get this form.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    /// Percent-encoded sanitized prompt, safe to use as a URL path segment.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

/// Remove every character outside `[A-Za-z0-9 ]`.
///
/// Never fails; the result may be empty.
pub fn sanitize(prompt: &str) -> String {
    prompt
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

/// Percent-encode a string as a URL component (`encodeURIComponent` rules).
pub fn encode(sanitized: &str) -> String {
    utf8_percent_encode(sanitized, URI_COMPONENT).to_string()
}
