//! Pipeline stages for document summarization.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──┬─▶ render ─▶ encode ──▶ llm
//! (path/URL)  (per file) └─▶ encode (images)      (one request)
//! ```
//!
//! 1. [`input`]     turn paths and URLs into an ordered [`input::SelectedFile`] list
//! 2. [`normalize`] expand the selection into base64 pages, strictly in order
//! 3. [`render`]    rasterise PDF pages via pdfium; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 4. [`encode`]    base64-wrap image bytes, JPEG-encode rendered pages
//! 5. [`llm`]       the single multimodal request; the only stage that talks
//!    to the model

pub mod encode;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod render;
