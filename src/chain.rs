//! The sequential provider fallback chain.
//!
//! [`FallbackChain`] owns an ordered list of [`ImageProvider`]s and tries them
//! one at a time until one produces an image. Which provider runs next is
//! decided by [`ChainState::advance`], a pure transition function, so the
//! fallback policy can be tested without any network.

use crate::prompt::Prompt;
use crate::provider::{ImageProvider, ImageResult};

/// Where a chain run currently stands.
///
/// With providers `[A, B, C]` the reachable states are
/// `Start → Trying(0) → Trying(1) → Trying(2) → Succeeded | Failed`.
/// No transition ever goes back to a lower index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Start,
    /// Waiting on the provider at this index.
    Trying(usize),
    Succeeded,
    Failed,
}

/// Input to [`ChainState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Leave `Start`.
    Begin,
    /// The current provider produced an image.
    Success,
    /// The current provider failed, for any reason.
    Failure,
}

impl ChainState {
    /// Compute the next state for a chain of `len` providers.
    ///
    /// Events that do not apply to the current state (e.g. `Success` while in
    /// `Start`) leave it unchanged. `Succeeded` and `Failed` are terminal.
    pub fn advance(self, transition: Transition, len: usize) -> Self {
        match (self, transition) {
            (Self::Start, Transition::Begin) if len == 0 => Self::Failed,
            (Self::Start, Transition::Begin) => Self::Trying(0),
            (Self::Trying(_), Transition::Success) => Self::Succeeded,
            (Self::Trying(i), Transition::Failure) if i + 1 < len => Self::Trying(i + 1),
            (Self::Trying(_), Transition::Failure) => Self::Failed,
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// A successful chain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub image: ImageResult,
    /// Name of the provider that answered. For logging only.
    pub provider: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Every provider was tried once and none produced an image.
    #[error("all image providers failed ({attempted} attempted)")]
    AllProvidersExhausted { attempted: usize },
}

/// Ordered, strictly sequential provider fallback.
///
/// Providers are tried in the order given, each at most once per call to
/// [`generate`](Self::generate). The first success short-circuits the rest.
/// Provider failures are logged and swallowed; only exhaustion of the whole
/// chain is reported.
///
/// The chain only holds immutable providers, so one instance can be shared
/// between concurrent requests behind an `Arc`.
///
/// # Example
///
/// ```rust,no_run
/// use photo_chain::chain::FallbackChain;
/// use photo_chain::prompt::Prompt;
/// use photo_chain::provider::{LoremFlickrProvider, PicsumProvider};
///
/// # async fn example() -> anyhow::Result<()> {
/// let chain = FallbackChain::new(vec![
///     Box::new(LoremFlickrProvider::new()),
///     Box::new(PicsumProvider::new()),
/// ]);
/// let generation = chain.generate(&Prompt::new("a red apple")).await?;
/// println!("{} answered", generation.provider);
/// # Ok(())
/// # }
/// ```
pub struct FallbackChain {
    providers: Vec<Box<dyn ImageProvider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn ImageProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in the order they will be tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run the chain for one prompt.
    pub async fn generate(&self, prompt: &Prompt) -> Result<Generation, ChainError> {
        let len = self.providers.len();
        let mut state = ChainState::Start.advance(Transition::Begin, len);
        let mut attempted = 0;

        while let ChainState::Trying(index) = state {
            let provider = &self.providers[index];
            log::info!("Trying {}...", provider.name());
            attempted += 1;

            match provider.generate(prompt).await {
                Ok(image) => {
                    state = state.advance(Transition::Success, len);
                    log::info!("{} succeeded ({state:?})", provider.name());
                    return Ok(Generation {
                        image,
                        provider: provider.name().to_string(),
                    });
                }
                Err(e) => {
                    log::warn!("{} failed: {e}", provider.name());
                    state = state.advance(Transition::Failure, len);
                }
            }
        }

        log::error!("All image providers failed ({attempted} attempted)");
        Err(ChainError::AllProvidersExhausted { attempted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProvider, Script};

    // ── ChainState::advance ──────────────────────────────────────────

    #[test]
    fn start_begins_with_first_provider() {
        assert_eq!(ChainState::Start.advance(Transition::Begin, 3), ChainState::Trying(0));
    }

    #[test]
    fn start_with_empty_chain_fails() {
        assert_eq!(ChainState::Start.advance(Transition::Begin, 0), ChainState::Failed);
    }

    #[test]
    fn failure_moves_to_next_provider() {
        assert_eq!(ChainState::Trying(0).advance(Transition::Failure, 3), ChainState::Trying(1));
        assert_eq!(ChainState::Trying(1).advance(Transition::Failure, 3), ChainState::Trying(2));
    }

    #[test]
    fn failure_on_last_provider_fails() {
        assert_eq!(ChainState::Trying(2).advance(Transition::Failure, 3), ChainState::Failed);
        assert_eq!(ChainState::Trying(0).advance(Transition::Failure, 1), ChainState::Failed);
    }

    #[test]
    fn success_from_any_provider_succeeds() {
        for i in 0..3 {
            assert_eq!(ChainState::Trying(i).advance(Transition::Success, 3), ChainState::Succeeded);
        }
    }

    #[test]
    fn terminal_states_stay_put() {
        for t in [Transition::Begin, Transition::Success, Transition::Failure] {
            assert_eq!(ChainState::Succeeded.advance(t, 3), ChainState::Succeeded);
            assert_eq!(ChainState::Failed.advance(t, 3), ChainState::Failed);
        }
        assert!(ChainState::Succeeded.is_terminal());
        assert!(ChainState::Failed.is_terminal());
        assert!(!ChainState::Start.is_terminal());
        assert!(!ChainState::Trying(0).is_terminal());
    }

    #[test]
    fn out_of_place_events_ignored() {
        assert_eq!(ChainState::Start.advance(Transition::Success, 3), ChainState::Start);
        assert_eq!(ChainState::Trying(1).advance(Transition::Begin, 3), ChainState::Trying(1));
    }

    #[test]
    fn walk_never_revisits_a_provider() {
        let len = 3;
        let mut state = ChainState::Start.advance(Transition::Begin, len);
        let mut visited = Vec::new();
        while let ChainState::Trying(i) = state {
            visited.push(i);
            state = state.advance(Transition::Failure, len);
        }
        assert_eq!(visited, vec![0, 1, 2]);
        assert_eq!(state, ChainState::Failed);
    }

    // ── FallbackChain::generate ──────────────────────────────────────

    fn chain_of(providers: &[&FakeProvider]) -> FallbackChain {
        FallbackChain::new(providers.iter().map(|p| p.boxed()).collect())
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let a = FakeProvider::succeeding("A", ImageResult::base64("AAAA"));
        let b = FakeProvider::succeeding("B", ImageResult::base64("BBBB"));
        let c = FakeProvider::succeeding("C", ImageResult::base64("CCCC"));
        let chain = chain_of(&[&a, &b, &c]);

        let generation = chain.generate(&Prompt::new("sunset")).await.unwrap();
        assert_eq!(generation.image, ImageResult::base64("AAAA"));
        assert_eq!(generation.provider, "A");
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 0, 0));
    }

    #[tokio::test]
    async fn second_provider_used_when_first_fails() {
        let a = FakeProvider::new("A", Script::Malformed);
        let b = FakeProvider::succeeding("B", ImageResult::from_bytes(&[0xFF, 0xD8, 0xFF]));
        let c = FakeProvider::succeeding("C", ImageResult::base64("CCCC"));
        let chain = chain_of(&[&a, &b, &c]);

        let generation = chain.generate(&Prompt::new("a red apple!!")).await.unwrap();
        assert_eq!(generation.provider, "B");
        assert_eq!(generation.image.data, "/9j/");
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 0));

        // Every provider receives the same derived prompt forms
        assert_eq!(b.seen()[0].raw(), "a red apple!!");
        assert_eq!(b.seen()[0].encoded(), "a%20red%20apple");
    }

    #[tokio::test]
    async fn last_provider_used_when_others_fail() {
        let a = FakeProvider::new("A", Script::Rejected(403));
        let b = FakeProvider::failing("B");
        let c = FakeProvider::succeeding("C", ImageResult::base64("CCCC"));
        let chain = chain_of(&[&a, &b, &c]);

        let generation = chain.generate(&Prompt::new("")).await.unwrap();
        assert_eq!(generation.provider, "C");
        assert_eq!(c.seen()[0].encoded(), "");
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn all_failures_exhaust_chain_calling_each_once() {
        let a = FakeProvider::failing("A");
        let b = FakeProvider::failing("B");
        let c = FakeProvider::failing("C");
        let chain = chain_of(&[&a, &b, &c]);

        let err = chain.generate(&Prompt::new("anything")).await.unwrap_err();
        assert!(matches!(err, ChainError::AllProvidersExhausted { attempted: 3 }));
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn empty_chain_fails_without_calls() {
        let chain = FallbackChain::new(Vec::new());
        assert!(chain.is_empty());

        let err = chain.generate(&Prompt::new("x")).await.unwrap_err();
        assert!(matches!(err, ChainError::AllProvidersExhausted { attempted: 0 }));
    }

    #[tokio::test]
    async fn single_provider_chain() {
        let only = FakeProvider::succeeding("OpenAI", ImageResult::url("https://img.example/a.png"));
        let chain = chain_of(&[&only]);

        let generation = chain.generate(&Prompt::new("a cat")).await.unwrap();
        assert_eq!(generation.image, ImageResult::url("https://img.example/a.png"));
        assert_eq!(chain.len(), 1);
    }

    #[tokio::test]
    async fn each_request_is_independent() {
        let a = FakeProvider::failing("A");
        let b = FakeProvider::succeeding("B", ImageResult::base64("BBBB"));
        let chain = chain_of(&[&a, &b]);

        chain.generate(&Prompt::new("one")).await.unwrap();
        chain.generate(&Prompt::new("two")).await.unwrap();
        assert_eq!((a.calls(), b.calls()), (2, 2));
    }

    #[test]
    fn provider_names_in_order() {
        let a = FakeProvider::failing("Gemini");
        let b = FakeProvider::failing("LoremFlickr");
        let chain = chain_of(&[&a, &b]);
        assert_eq!(chain.provider_names(), vec!["Gemini", "LoremFlickr"]);
    }
}
