//! Result types: normalized pages and the summary output.

use crate::error::RasterizationWarning;
use crate::markdown::Block;
use serde::{Deserialize, Serialize};

/// One normalized image unit fed to the model.
///
/// `data` is plain base64 with no `data:` URL prefix. `mime_type` is always an
/// image type; PDFs are expanded into `image/jpeg` pages before they get here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub mime_type: String,
    pub data: String,
}

impl Page {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Summary of one summarize action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// Model response, verbatim.
    pub markdown: String,
    /// `markdown` parsed into display blocks.
    pub blocks: Vec<Block>,
    /// Pages skipped during PDF rasterisation.
    pub warnings: Vec<RasterizationWarning>,
    pub stats: SummaryStats,
}

/// Counters and timings for one summarize action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Files in the selection.
    pub selected_files: usize,
    /// Files dropped because their type is neither an image nor a PDF.
    pub skipped_files: usize,
    /// Page images sent to the model.
    pub pages: usize,
    /// PDF pages that could not be rendered.
    pub skipped_pages: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub normalize_duration_ms: u64,
    pub generation_duration_ms: u64,
    pub total_duration_ms: u64,
}
