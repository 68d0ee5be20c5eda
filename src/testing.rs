//! Shared helpers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;

use crate::prompt::Prompt;
use crate::provider::{ImageProvider, ImageResult, ProviderError};

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// What a [`FakeProvider`] answers with.
#[derive(Clone)]
pub enum Script {
    Succeed(ImageResult),
    Unavailable,
    Rejected(u16),
    Malformed,
}

/// In-memory provider that counts its calls and records the prompts it saw.
#[derive(Clone)]
pub struct FakeProvider {
    name: String,
    script: Script,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Prompt>>>,
}

impl FakeProvider {
    pub fn new(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding(name: &str, image: ImageResult) -> Self {
        Self::new(name, Script::Succeed(image))
    }

    pub fn failing(name: &str) -> Self {
        Self::new(name, Script::Unavailable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Prompt> {
        self.seen.lock().unwrap().clone()
    }

    pub fn boxed(&self) -> Box<dyn ImageProvider> {
        Box::new(self.clone())
    }
}

#[async_trait::async_trait]
impl ImageProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &Prompt) -> Result<ImageResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(prompt.clone());
        match &self.script {
            Script::Succeed(image) => Ok(image.clone()),
            Script::Unavailable => Err(ProviderError::Unavailable("timed out".into())),
            Script::Rejected(status) => Err(ProviderError::Rejected {
                status: *status,
                body: "rejected".into(),
            }),
            Script::Malformed => Err(ProviderError::MalformedResponse("no inline data".into())),
        }
    }
}
