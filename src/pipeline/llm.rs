//! Summary request: one multimodal call to the generation backend.
//!
//! The request is the instruction prompt followed by every page as an inline
//! image part, in order. It is sent exactly once: no retry, no streaming, no
//! timeout beyond the transport default. Whatever text comes back is
//! returned verbatim.
//!
//! [`GenerationBackend`] is the seam to the remote API. [`LlmBackend`] is the
//! production implementation over an `edgequake_llm` provider; tests plug in
//! a recording backend instead.

use crate::config::SummaryConfig;
use crate::error::{BackendError, SummaryError};
use crate::output::Page;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// One part of a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    InlineImage { mime_type: String, data: String },
}

/// The ordered parts sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub parts: Vec<RequestPart>,
}

impl SummaryRequest {
    /// Prompt first, then one inline image per page.
    pub fn new(prompt: &str, pages: &[Page]) -> Self {
        let mut parts = Vec::with_capacity(pages.len() + 1);
        parts.push(RequestPart::Text(prompt.to_string()));
        parts.extend(pages.iter().map(|p| RequestPart::InlineImage {
            mime_type: p.mime_type.clone(),
            data: p.data.clone(),
        }));
        Self { parts }
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, RequestPart::InlineImage { .. }))
            .count()
    }
}

/// Text returned by the backend plus token accounting when available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A remote API able to generate text from an ordered list of parts.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &SummaryRequest) -> Result<Generation, BackendError>;
}

/// [`GenerationBackend`] over an `edgequake_llm` provider.
///
/// The parts become a single user message: text parts are concatenated into
/// the message text and image parts are attached in order.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SummaryConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

#[async_trait]
impl GenerationBackend for LlmBackend {
    async fn generate(&self, request: &SummaryRequest) -> Result<Generation, BackendError> {
        let messages = vec![to_chat_message(request)];
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| BackendError::new(e.to_string()))?;

        Ok(Generation {
            text: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}

fn to_chat_message(request: &SummaryRequest) -> ChatMessage {
    let mut text = String::new();
    let mut images = Vec::new();
    for part in &request.parts {
        match part {
            RequestPart::Text(t) => {
                if !text.is_empty() {
                    text.push_str("\n\n");
                }
                text.push_str(t);
            }
            RequestPart::InlineImage { mime_type, data } => {
                images.push(ImageData::new(data.clone(), mime_type.as_str()));
            }
        }
    }
    ChatMessage::user_with_images(&text, images)
}

/// Build `CompletionOptions` from the config; unset fields keep the
/// provider defaults.
fn build_options(config: &SummaryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        ..Default::default()
    }
}

/// Send the pages to the model and return the summary text.
///
/// # Errors
/// - [`SummaryError::Input`] if `pages` is empty; no call is made
/// - [`SummaryError::Generation`] on any backend failure; the cause is logged
pub async fn generate_summary(
    backend: &Arc<dyn GenerationBackend>,
    pages: &[Page],
    config: &SummaryConfig,
) -> Result<Generation, SummaryError> {
    if pages.is_empty() {
        return Err(SummaryError::Input);
    }

    let request = SummaryRequest::new(config.effective_prompt(), pages);
    info!("Requesting summary for {} page(s) from {}", pages.len(), config.model);

    let start = Instant::now();
    match backend.generate(&request).await {
        Ok(generation) => {
            debug!(
                "Summary: {} input tokens, {} output tokens, {:?}",
                generation.input_tokens,
                generation.output_tokens,
                start.elapsed()
            );
            Ok(generation)
        }
        Err(e) => {
            error!("Model API error: {}", e);
            Err(SummaryError::Generation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationBackend for Failing {
        async fn generate(&self, _request: &SummaryRequest) -> Result<Generation, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::new("HTTP 429 quota exceeded for key AIza-secret"))
        }
    }

    struct Echo;

    #[async_trait]
    impl GenerationBackend for Echo {
        async fn generate(&self, request: &SummaryRequest) -> Result<Generation, BackendError> {
            Ok(Generation::text(format!("  {} images \n", request.image_count())))
        }
    }

    #[test]
    fn request_puts_prompt_first() {
        let pages = vec![Page::new("image/png", "AAA"), Page::new("image/jpeg", "BBB")];
        let req = SummaryRequest::new("Summarise", &pages);
        assert_eq!(req.parts.len(), 3);
        assert_eq!(req.parts[0], RequestPart::Text("Summarise".into()));
        assert_eq!(
            req.parts[2],
            RequestPart::InlineImage {
                mime_type: "image/jpeg".into(),
                data: "BBB".into()
            }
        );
        assert_eq!(req.image_count(), 2);
    }

    #[test]
    fn build_options_defaults() {
        let opts = build_options(&SummaryConfig::default());
        assert_eq!(opts.temperature, None);
        assert_eq!(opts.max_tokens, None);
    }

    #[tokio::test]
    async fn empty_pages_is_input_error() {
        let backend = Arc::new(Failing {
            calls: AtomicUsize::new(0),
        });
        let dyn_backend: Arc<dyn GenerationBackend> = backend.clone();
        let err = generate_summary(&dyn_backend, &[], &SummaryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::Input));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_failure_is_generic_and_single_shot() {
        let backend = Arc::new(Failing {
            calls: AtomicUsize::new(0),
        });
        let dyn_backend: Arc<dyn GenerationBackend> = backend.clone();
        let pages = vec![Page::new("image/png", "AAA")];
        let err = generate_summary(&dyn_backend, &pages, &SummaryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::Generation));
        assert!(!err.to_string().contains("AIza"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn text_returned_verbatim() {
        let backend: Arc<dyn GenerationBackend> = Arc::new(Echo);
        let pages = vec![Page::new("image/png", "AAA"), Page::new("image/png", "BBB")];
        let generation = generate_summary(&backend, &pages, &SummaryConfig::default())
            .await
            .unwrap();
        assert_eq!(generation.text, "  2 images \n");
    }
}
