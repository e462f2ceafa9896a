//! File normalization: an ordered selection → an ordered list of pages.
//!
//! Files are handled one at a time in selection order; within a PDF, pages
//! are rendered one at a time in page order. Nothing runs in parallel, so the
//! output order is deterministic and the PDF engine is never used from two
//! threads at once.

use crate::config::SummaryConfig;
use crate::error::{RasterizationWarning, SummaryError};
use crate::output::Page;
use crate::pipeline::encode;
use crate::pipeline::input::{FileKind, SelectedFile};
use crate::pipeline::render::{EngineError, PdfEngine, RasterDocument};
use crate::progress::{ProgressCallback, ProgressStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pages derived from a selection.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPages {
    pub pages: Vec<Page>,
    /// PDF pages that could not be rendered and were skipped.
    pub warnings: Vec<RasterizationWarning>,
    /// Files dropped because of their type.
    pub skipped_files: usize,
}

/// Expand a file selection into pages.
///
/// # Errors
/// - [`SummaryError::NoContent`] when no page could be derived
/// - read, PDF-open and pdfium-binding errors, which stop the pipeline
pub async fn normalize_files(
    files: &[SelectedFile],
    engine: &Arc<dyn PdfEngine>,
    config: &SummaryConfig,
) -> Result<NormalizedPages, SummaryError> {
    let progress = config.progress_callback.as_ref();
    let mut out = NormalizedPages::default();

    for file in files {
        match file.kind() {
            FileKind::Image => {
                notify(progress, ProgressStatus::Image {
                    name: file.name.clone(),
                });
                let bytes = file.read().await?;
                out.pages.push(encode::encode_image_bytes(&file.mime_type, &bytes));
            }
            FileKind::Pdf => {
                notify(progress, ProgressStatus::Pdf {
                    name: file.name.clone(),
                });
                let bytes = file.read().await?;
                let (pages, warnings) = rasterize_pdf(file.name.clone(), bytes, engine, config).await?;
                out.pages.extend(pages);
                out.warnings.extend(warnings);
            }
            FileKind::Unsupported => {
                debug!("Skipping {} ({}): unsupported type", file.name, file.mime_type);
                out.skipped_files += 1;
            }
        }
    }

    if out.pages.is_empty() {
        return Err(SummaryError::NoContent);
    }

    info!(
        "Normalized {} file(s) into {} page(s) ({} skipped page(s))",
        files.len(),
        out.pages.len(),
        out.warnings.len()
    );
    Ok(out)
}

/// Render every page of one PDF on the blocking pool.
async fn rasterize_pdf(
    name: String,
    bytes: Vec<u8>,
    engine: &Arc<dyn PdfEngine>,
    config: &SummaryConfig,
) -> Result<(Vec<Page>, Vec<RasterizationWarning>), SummaryError> {
    if !bytes.starts_with(b"%PDF") {
        return Err(SummaryError::NotAPdf {
            name,
            magic: bytes.iter().take(4).copied().collect(),
        });
    }

    let engine = Arc::clone(engine);
    let progress = config.progress_callback.clone();
    let scale = config.render_scale;
    let quality = config.jpeg_quality;
    let max_pixels = config.max_rendered_pixels;

    tokio::task::spawn_blocking(move || {
        rasterize_pdf_blocking(
            engine.as_ref(),
            &name,
            &bytes,
            scale,
            quality,
            max_pixels,
            progress.as_ref(),
        )
    })
    .await
    .map_err(|e| SummaryError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of PDF rasterisation.
///
/// A page that fails to load, render or encode is skipped with a warning.
/// Pages whose scaled size exceeds `max_pixels` on either edge are rendered
/// at the capped size.
pub(crate) fn rasterize_pdf_blocking(
    engine: &dyn PdfEngine,
    name: &str,
    bytes: &[u8],
    scale: f32,
    quality: u8,
    max_pixels: u32,
    progress: Option<&ProgressCallback>,
) -> Result<(Vec<Page>, Vec<RasterizationWarning>), SummaryError> {
    let mut pages = Vec::new();
    let mut warnings = Vec::new();

    engine
        .open(bytes, &mut |doc: &dyn RasterDocument| {
            let total = doc.page_count();
            for index in 0..total {
                let page = index + 1;
                notify(progress, ProgressStatus::PdfPage {
                    name: name.to_string(),
                    page,
                    total,
                });

                let rendered = doc
                    .viewport(index, scale)
                    .map(|vp| vp.clamp_to(max_pixels))
                    .and_then(|vp| doc.render(index, vp))
                    .and_then(|img| encode::encode_jpeg(&img, quality).map_err(|e| e.to_string()));

                match rendered {
                    Ok(p) => pages.push(p),
                    Err(detail) => {
                        let warning = RasterizationWarning {
                            file: name.to_string(),
                            page,
                            detail,
                        };
                        warn!("{}", warning);
                        if let Some(cb) = progress {
                            cb.on_page_skipped(&warning);
                        }
                        warnings.push(warning);
                    }
                }
            }
        })
        .map_err(|e| match e {
            EngineError::Bind(detail) => SummaryError::PdfiumBindingFailed(detail),
            EngineError::Load(detail) => SummaryError::CorruptPdf {
                name: name.to_string(),
                detail,
            },
        })?;

    debug!("{}: {} page(s) rendered", name, pages.len());
    Ok((pages, warnings))
}

fn notify(progress: Option<&ProgressCallback>, status: ProgressStatus) {
    if let Some(cb) = progress {
        cb.on_status(&status);
    }
}
