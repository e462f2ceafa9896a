//! # edgequake-docsum
//!
//! Summarize PDF documents and images with a multimodal language model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! selection (PDFs, PNG/JPEG/WebP images)
//!  │
//!  ├─ 1. Normalize  images pass through, PDF pages rendered at 1.5× via pdfium
//!  │                and re-encoded as JPEG (spawn_blocking, one page at a time)
//!  ├─ 2. Request    one call: fixed prompt + every page as an inline image
//!  └─ 3. Render     markdown subset → headings, code, quotes, lists, paragraphs
//! ```
//!
//! Stages run strictly one after another. A page that cannot be rendered is
//! skipped with a [`RasterizationWarning`]; everything else that goes wrong is
//! a [`SummaryError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_docsum::{summarize_inputs, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Needs GEMINI_API_KEY in the environment.
//!     let config = SummaryConfig::default();
//!     let output = summarize_inputs(&["report.pdf", "figure.png"], &config).await?;
//!     println!("{}", output.markdown);
//!     for block in &output.blocks {
//!         eprintln!("{block:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsum` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! edgequake-docsum = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod display;
pub mod error;
pub mod markdown;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use error::{BackendError, RasterizationWarning, SummaryError};
pub use markdown::{parse_blocks, Block};
pub use output::{Page, SummaryOutput, SummaryStats};
pub use pipeline::input::SelectedFile;
pub use pipeline::llm::{Generation, GenerationBackend, LlmBackend, RequestPart, SummaryRequest};
pub use pipeline::render::{EngineError, PdfEngine, PdfiumEngine, RasterDocument, Viewport};
pub use progress::{NoopProgressCallback, ProgressCallback, ProgressStatus, SummaryProgressCallback};
pub use session::{Session, SessionState};
pub use summarize::{summarize, summarize_inputs, summarize_sync, summarize_with};
