//! Instruction prompt sent ahead of the page images.
//!
//! Kept in its own module so the wording can change without touching the
//! request client, and so tests can assert on it directly. Callers can
//! override it via [`crate::config::SummaryConfig::prompt`].

/// Default instruction placed before the page images in the request.
///
/// The wording asks for one synthesized summary across all pages (not a
/// per-page transcript) and for markdown that the renderer in
/// [`crate::markdown`] understands: headings, bullet lists, quotes, code.
pub const SUMMARY_PROMPT: &str = r#"You are an expert document analyst. Your task is to provide a concise and comprehensive summary of the content presented in the following document pages/images.

Analyze all the provided images, which may be pages from one or more documents (PDFs, images, etc.).
Synthesize the information to create a single, coherent summary. Do NOT summarize page by page.
Focus on key points, main arguments, and important data.
The summary should be well-structured, easy to read, and capture the essence of the documents.

Format your output using markdown for clarity:
- Use #, ## and ### for headings
- Use "- " for bullet points
- Use "> " for notable quotations
- Use triple backticks for code or verbatim data"#;
