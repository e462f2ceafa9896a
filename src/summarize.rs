//! Summarize entry points: selection → pages → one model call → blocks.
//!
//! The three stages run strictly one after another. The backend is resolved
//! before any file is read, so a missing credential is reported without
//! touching the selection.

use crate::config::{SummaryConfig, DEFAULT_API_KEY_ENV, DEFAULT_PROVIDER};
use crate::error::SummaryError;
use crate::markdown::parse_blocks;
use crate::output::{SummaryOutput, SummaryStats};
use crate::pipeline::input::{self, SelectedFile};
use crate::pipeline::llm::{self, GenerationBackend, LlmBackend};
use crate::pipeline::normalize;
use crate::pipeline::render::{PdfEngine, PdfiumEngine};
use crate::progress::ProgressStatus;
use edgequake_llm::{GeminiProvider, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Alternative variable accepted for Gemini keys.
const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Summarize an ordered file selection.
///
/// # Returns
/// `Ok(SummaryOutput)` when the model answered, even if some PDF pages were
/// skipped (see `output.warnings`).
///
/// # Errors
/// - [`SummaryError::MissingCredential`] / [`SummaryError::ProviderNotConfigured`]
///   before any file is read
/// - [`SummaryError::NoContent`] when no page could be derived; no request is made
/// - [`SummaryError::Generation`] when the model call failed
/// - read and PDF-open errors
pub async fn summarize(
    files: &[SelectedFile],
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let backend = resolve_backend(config)?;
    let engine = resolve_engine(config);
    summarize_with(files, &backend, &engine, config).await
}

/// Summarize with an already-resolved backend and engine.
///
/// Used by [`crate::session::Session`], which resolves both once at startup.
pub async fn summarize_with(
    files: &[SelectedFile],
    backend: &Arc<dyn GenerationBackend>,
    engine: &Arc<dyn PdfEngine>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let total_start = Instant::now();
    info!("Starting summary of {} file(s)", files.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_status(&ProgressStatus::Preparing);
    }

    let normalize_start = Instant::now();
    let normalized = normalize::normalize_files(files, engine, config).await?;
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;

    let page_count = normalized.pages.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_status(&ProgressStatus::Generating { pages: page_count });
    }

    let generation_start = Instant::now();
    let generation = llm::generate_summary(backend, &normalized.pages, config).await?;
    let generation_duration_ms = generation_start.elapsed().as_millis() as u64;
    // Pages are not needed past the request.
    drop(normalized.pages);

    let blocks = parse_blocks(&generation.text);
    debug!("Parsed {} display block(s)", blocks.len());

    let stats = SummaryStats {
        selected_files: files.len(),
        skipped_files: normalized.skipped_files,
        pages: page_count,
        skipped_pages: normalized.warnings.len(),
        input_tokens: generation.input_tokens,
        output_tokens: generation.output_tokens,
        normalize_duration_ms,
        generation_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Summary complete: {} page(s), {} chars, {}ms total",
        page_count,
        generation.text.len(),
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_complete(page_count, generation.text.len());
    }

    Ok(SummaryOutput {
        markdown: generation.text,
        blocks,
        warnings: normalized.warnings,
        stats,
    })
}

/// Summarize a list of local paths and/or HTTP(S) URLs, in order.
///
/// # Example
/// ```rust,no_run
/// use edgequake_docsum::{summarize_inputs, SummaryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SummaryConfig::default();
/// let output = summarize_inputs(&["report.pdf", "chart.png"], &config).await?;
/// println!("{}", output.markdown);
/// # Ok(())
/// # }
/// ```
pub async fn summarize_inputs<S: AsRef<str>>(
    inputs: &[S],
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let backend = resolve_backend(config)?;
    let engine = resolve_engine(config);
    let files = input::resolve_inputs(inputs, config.download_timeout_secs).await?;
    summarize_with(&files, &backend, &engine, config).await
}

/// Synchronous wrapper around [`summarize`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    files: &[SelectedFile],
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummaryError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize(files, config))
}

/// Resolve the generation backend.
///
/// 1. **Pre-built backend** (`config.backend`) is used as-is; no credential
///    check is made.
/// 2. **Gemini**: the key is read from `config.api_key_env` (the default
///    `GEMINI_API_KEY` also accepts `GOOGLE_API_KEY`) and handed to
///    [`GeminiProvider`] directly, so a custom variable works end to end.
/// 3. **Any other provider**: [`ProviderFactory::create_llm_provider`] reads
///    that provider's own variables; a failure is `ProviderNotConfigured`.
pub fn resolve_backend(config: &SummaryConfig) -> Result<Arc<dyn GenerationBackend>, SummaryError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    let provider: Arc<dyn LLMProvider> = if is_gemini(&config.provider_name) {
        let key = lookup_api_key(&config.api_key_env, |var| std::env::var(var).ok()).ok_or_else(
            || SummaryError::MissingCredential {
                var: config.api_key_env.clone(),
            },
        )?;
        Arc::new(GeminiProvider::new(key).with_model(&config.model))
    } else {
        ProviderFactory::create_llm_provider(&config.provider_name, &config.model).map_err(|e| {
            SummaryError::ProviderNotConfigured {
                provider: config.provider_name.clone(),
                hint: format!("{e}"),
            }
        })?
    };
    info!(
        "Using provider '{}' with model '{}'",
        config.provider_name, config.model
    );

    Ok(Arc::new(LlmBackend::new(provider, config)))
}

fn is_gemini(provider_name: &str) -> bool {
    provider_name.eq_ignore_ascii_case(DEFAULT_PROVIDER)
}

/// Non-empty value of `var`, falling back to `GOOGLE_API_KEY` when `var` is
/// the default `GEMINI_API_KEY`.
fn lookup_api_key(var: &str, get: impl Fn(&str) -> Option<String>) -> Option<String> {
    let non_empty = |name: &str| get(name).filter(|v| !v.trim().is_empty());
    non_empty(var).or_else(|| {
        if var == DEFAULT_API_KEY_ENV {
            non_empty(GOOGLE_API_KEY_ENV)
        } else {
            None
        }
    })
}

/// The configured PDF engine, or pdfium.
pub fn resolve_engine(config: &SummaryConfig) -> Arc<dyn PdfEngine> {
    match config.pdf_engine {
        Some(ref engine) => Arc::clone(engine),
        None => Arc::new(PdfiumEngine::new()),
    }
}
