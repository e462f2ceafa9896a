//! Progress-callback trait for summarize events.
//!
//! Inject an [`Arc<dyn SummaryProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to receive the
//! human-readable status the pipeline reports before each file, before each
//! PDF page and before the model call.
//!
//! # Example
//!
//! ```rust
//! use edgequake_docsum::{ProgressStatus, SummaryConfig, SummaryProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl SummaryProgressCallback for Printer {
//!     fn on_status(&self, status: &ProgressStatus) {
//!         eprintln!("{status}");
//!     }
//! }
//!
//! let config = SummaryConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn SummaryProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::RasterizationWarning;
use std::fmt;
use std::sync::Arc;

/// A status update emitted by the pipeline.
///
/// `Display` renders the message shown under the spinner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStatus {
    /// Pipeline started; files are about to be read.
    Preparing,
    /// About to read an image file.
    Image { name: String },
    /// About to decode a PDF file.
    Pdf { name: String },
    /// About to render one PDF page (1-indexed).
    PdfPage {
        name: String,
        page: usize,
        total: usize,
    },
    /// About to send `pages` page images to the model.
    Generating { pages: usize },
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::Preparing => write!(f, "Preparing files..."),
            ProgressStatus::Image { name } => write!(f, "Processing image: {name}"),
            ProgressStatus::Pdf { name } => write!(f, "Processing PDF: {name}"),
            ProgressStatus::PdfPage { name, page, total } => {
                write!(f, "Processing page {page} of {total} from {name}...")
            }
            ProgressStatus::Generating { pages } => {
                write!(f, "Generating summary from {pages} page(s)...")
            }
        }
    }
}

/// Called by the pipeline as it works through a summarize action.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The PDF stage runs on a blocking thread, so
/// implementations must be `Send + Sync`.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called before each stage step with a human-readable status.
    fn on_status(&self, status: &ProgressStatus) {
        let _ = status;
    }

    /// Called when a PDF page is skipped because it could not be rendered.
    fn on_page_skipped(&self, warning: &RasterizationWarning) {
        let _ = warning;
    }

    /// Called once the summary text has been received.
    ///
    /// # Arguments
    /// * `pages`      : page images that were sent
    /// * `summary_len`: byte length of the returned summary
    fn on_complete(&self, pages: usize, summary_len: usize) {
        let _ = (pages, summary_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;
