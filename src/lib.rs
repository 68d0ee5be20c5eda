//! # photo-chain
//!
//! Text-to-image with automatic provider fallback. A prompt goes in, a photo
//! (base64 bytes or a URL) comes out, produced by the first provider in the
//! chain that succeeds:
//!
//! 1. **Gemini** — generative model, raw prompt, inline base64 image
//! 2. **LoremFlickr** — keyword stock photo (800×800), sanitized prompt
//! 3. **Picsum** — deterministic placeholder (1024×1024) seeded by the prompt
//!
//! An **OpenAI** (`gpt-image-1`) provider is also available, disabled by default.
//!
//! Providers are tried strictly one after the other, once each. Individual
//! failures are logged and never reach the caller; only when every provider
//! fails does the caller get a single generic error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photo_chain::config::Config;
//! use photo_chain::pipeline::{build_provider_chain, generate_photo};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load(Some("config.json".as_ref()))?;
//!     config.apply_env();
//!
//!     let chain = build_provider_chain(&config);
//!     match generate_photo(&chain, "a red apple on a wooden table").await {
//!         Ok(response) => println!("photo: {} chars", response.photo.len()),
//!         Err(err) => eprintln!("{}", err.error),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Providers
//!
//! The chain takes any [`provider::ImageProvider`], so providers can be
//! swapped, reordered, or replaced with fakes:
//!
//! ```rust,no_run
//! use photo_chain::chain::FallbackChain;
//! use photo_chain::prompt::Prompt;
//! use photo_chain::provider::{GeminiProvider, PicsumProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let chain = FallbackChain::new(vec![
//!     Box::new(GeminiProvider::new("AIza...".into(), "gemini-2.5-flash-image".into())),
//!     Box::new(PicsumProvider::new()),
//! ]);
//! let generation = chain.generate(&Prompt::new("misty forest")).await?;
//! println!("{} answered with {:?}", generation.provider, generation.image.kind);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`prompt`] — Prompt sanitizing and URL encoding
//! - [`provider`] — Provider trait, error taxonomy, and the built-in adapters
//! - [`chain`] — Fallback state machine and orchestrator
//! - [`pipeline`] — Chain construction from config and the request-level entry point
//! - [`config`] — Configuration types and loading/saving
//! - `server` — axum HTTP routes (`server` feature)

pub mod chain;
pub mod config;
pub mod pipeline;
pub mod prompt;
pub mod provider;
#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod testing;
