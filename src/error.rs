//! Error types for the edgequake-docsum library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SummaryError`]: **Fatal**: the summarize action cannot finish
//!   (nothing to summarise, unreadable file, credential missing, the model
//!   call failed). Returned as `Err(SummaryError)` from the top-level
//!   `summarize*` functions and stops the pipeline.
//!
//! * [`RasterizationWarning`]: **Non-fatal**: a single PDF page could not be
//!   rendered. The page is skipped, the warning is logged and collected in
//!   [`crate::output::SummaryOutput::warnings`], and every other page still
//!   goes to the model.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-docsum library.
#[derive(Debug, Error)]
pub enum SummaryError {
    // ── Pipeline errors ───────────────────────────────────────────────────
    /// No page could be derived from the selection (empty selection, or
    /// every file was unsupported or unrenderable).
    #[error("No processable content found in the selected files.")]
    NoContent,

    /// The request stage was reached with an empty page list.
    #[error("No pages provided for summarization.")]
    Input,

    /// The remote generation call failed. The underlying cause is logged,
    /// never carried here.
    #[error("Failed to generate summary from the model API. Please check the logs for details.")]
    Generation,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but its content could not be read.
    #[error("Failed to read '{name}': {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The input string is neither an existing path nor a valid HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file claims to be a PDF but does not start with `%PDF`.
    #[error("File '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// pdfium could not load the document.
    #[error("PDF '{name}' could not be opened: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium for your platform, or point PDFIUM_LIB_PATH at an existing\n\
libpdfium (file or containing directory).\n"
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The API credential environment variable is not set.
    #[error("{var} environment variable not set.\nExport your API key, e.g. `export {var}=...`.")]
    MissingCredential { var: String },

    /// The configured provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal warning for a single PDF page that could not be rasterised.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("{file}: page {page} skipped, could not acquire a render surface: {detail}")]
pub struct RasterizationWarning {
    /// Display name of the PDF.
    pub file: String,
    /// 1-indexed page number.
    pub page: usize,
    pub detail: String,
}

/// Failure reported by a [`crate::pipeline::llm::GenerationBackend`].
///
/// Only ever logged; callers of the library see [`SummaryError::Generation`].
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
