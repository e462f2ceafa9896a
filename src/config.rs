//! Configuration types for a summarize action.
//!
//! All behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. The model identifier and credential variable are
//! fixed once at startup; everything else has a documented default.

use crate::error::SummaryError;
use crate::pipeline::llm::GenerationBackend;
use crate::pipeline::render::PdfEngine;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default provider name passed to `edgequake_llm::ProviderFactory`.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Environment variable holding the API credential.
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Scale applied to a PDF page's natural size (in points) when rasterising.
pub const DEFAULT_RENDER_SCALE: f32 = 1.5;

/// JPEG quality for rendered PDF pages, matching a browser canvas default.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Longest edge, in pixels, of a rendered PDF page.
pub const DEFAULT_MAX_RENDERED_PIXELS: u32 = 4096;

/// Configuration for a summarize action.
///
/// # Example
/// ```rust
/// use edgequake_docsum::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .model("gemini-2.5-pro")
///     .render_scale(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-2.5-pro");
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Model identifier. Default: `gemini-2.5-flash`.
    pub model: String,

    /// Provider name for `ProviderFactory`. Default: `gemini`.
    pub provider_name: String,

    /// Environment variable that must hold the Gemini API key.
    /// Default: `GEMINI_API_KEY` (`GOOGLE_API_KEY` is accepted as well).
    ///
    /// Checked before any file is read; a missing variable is fatal. Other
    /// providers read their own variables through `ProviderFactory`.
    pub api_key_env: String,

    /// Pre-constructed generation backend. Takes precedence over
    /// `provider_name` and skips the credential check.
    pub backend: Option<Arc<dyn GenerationBackend>>,

    /// PDF engine. If None, pdfium is bound on first use.
    pub pdf_engine: Option<Arc<dyn PdfEngine>>,

    /// PDF render scale. Range: 0.25–4.0. Default: 1.5.
    pub render_scale: f32,

    /// JPEG quality for rendered PDF pages. Range: 1–100. Default: 92.
    pub jpeg_quality: u8,

    /// Cap on the longest edge of a rendered page, in pixels. Larger pages
    /// are scaled down, keeping their aspect ratio. Default: 4096.
    pub max_rendered_pixels: u32,

    /// Custom instruction prompt. If None, uses [`crate::prompts::SUMMARY_PROMPT`].
    pub prompt: Option<String>,

    /// Sampling temperature. If None, the provider default applies.
    pub temperature: Option<f32>,

    /// Maximum output tokens. If None, the provider default applies.
    pub max_tokens: Option<usize>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Progress events receiver.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: DEFAULT_PROVIDER.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            backend: None,
            pdf_engine: None,
            render_scale: DEFAULT_RENDER_SCALE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_rendered_pixels: DEFAULT_MAX_RENDERED_PIXELS,
            prompt: None,
            temperature: None,
            max_tokens: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("api_key_env", &self.api_key_env)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn GenerationBackend>"))
            .field("pdf_engine", &self.pdf_engine.as_ref().map(|_| "<dyn PdfEngine>"))
            .field("render_scale", &self.render_scale)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("prompt", &self.prompt.as_ref().map(|p| p.len()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// The prompt that will be sent ahead of the page images.
    pub fn effective_prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or(crate::prompts::SUMMARY_PROMPT)
    }
}

/// Builder for [`SummaryConfig`].
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl fmt::Debug for SummaryConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SummaryConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.config.api_key_env = var.into();
        self
    }

    pub fn backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn pdf_engine(mut self, engine: Arc<dyn PdfEngine>) -> Self {
        self.config.pdf_engine = Some(engine);
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    /// Minimum 100 px.
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SummaryError> {
        let c = &self.config;
        if !(0.25..=4.0).contains(&c.render_scale) {
            return Err(SummaryError::InvalidConfig(format!(
                "Render scale must be 0.25–4.0, got {}",
                c.render_scale
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(SummaryError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.model.trim().is_empty() {
            return Err(SummaryError::InvalidConfig("Model must not be empty".into()));
        }
        if c.api_key_env.trim().is_empty() {
            return Err(SummaryError::InvalidConfig(
                "API key variable name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
