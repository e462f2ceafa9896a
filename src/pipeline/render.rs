//! PDF rasterisation behind a small engine trait.
//!
//! The normalizer needs three capabilities from a PDF library: open a
//! document from bytes and report its page count, report a page's natural
//! viewport at a scale, and render a page into a raster surface. They are
//! expressed by [`PdfEngine`] and [`RasterDocument`] so the pipeline can be
//! exercised without a native pdfium library.
//!
//! ## Why a visitor?
//!
//! A pdfium document borrows the bound library and the byte buffer. Handing
//! the document to a closure keeps those borrows on the engine's stack frame
//! instead of leaking lifetimes into the trait.
//!
//! All calls are blocking; the normalizer runs them in `spawn_blocking`.

use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Pixel size of a page's raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Natural size in PDF points (1/72 in) multiplied by `scale`, floored,
    /// never smaller than one pixel.
    pub fn from_points(width_pt: f32, height_pt: f32, scale: f32) -> Self {
        let px = |v: f32| ((v * scale).floor() as u32).max(1);
        Self {
            width: px(width_pt),
            height: px(height_pt),
        }
    }

    /// Scale down so the longest edge is at most `max_edge`, keeping the
    /// aspect ratio. Viewports already within the cap are returned unchanged.
    pub fn clamp_to(self, max_edge: u32) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_edge {
            return self;
        }
        let shrink = |v: u32| ((v as u64 * max_edge as u64 / longest as u64) as u32).max(1);
        Self {
            width: shrink(self.width),
            height: shrink(self.height),
        }
    }
}

/// Failure to open a document.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The native library could not be loaded.
    #[error("{0}")]
    Bind(String),
    /// The bytes could not be parsed as a PDF.
    #[error("{0}")]
    Load(String),
}

/// An opened PDF document.
///
/// Page indices are 0-based. Per-page failures are plain strings: the
/// normalizer turns them into [`crate::error::RasterizationWarning`]s.
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    /// Natural page size at `scale`.
    fn viewport(&self, index: usize, scale: f32) -> Result<Viewport, String>;

    /// Render the page into a surface of exactly `viewport` pixels.
    fn render(&self, index: usize, viewport: Viewport) -> Result<DynamicImage, String>;
}

/// A PDF library able to open documents from bytes.
pub trait PdfEngine: Send + Sync {
    /// Open `bytes` and pass the loaded document to `visit`.
    fn open(
        &self,
        bytes: &[u8],
        visit: &mut dyn FnMut(&dyn RasterDocument),
    ) -> Result<(), EngineError>;
}

/// [`PdfEngine`] backed by pdfium through `pdfium-render`.
///
/// The library is bound on every [`PdfEngine::open`] call, inside the
/// blocking task, so no pdfium handle ever crosses threads.
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    /// Explicit library file or directory. Falls back to `PDFIUM_LIB_PATH`,
    /// then to the system library.
    pub library_path: Option<PathBuf>,
}

impl PdfiumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, EngineError> {
        let configured = self
            .library_path
            .clone()
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

        let bindings = match configured {
            Some(path) => {
                let lib = if path.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(&path)
                } else {
                    path
                };
                debug!("Binding pdfium from {}", lib.display());
                Pdfium::bind_to_library(&lib)
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| EngineError::Bind(format!("{e:?}")))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PdfEngine for PdfiumEngine {
    fn open(
        &self,
        bytes: &[u8],
        visit: &mut dyn FnMut(&dyn RasterDocument),
    ) -> Result<(), EngineError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| EngineError::Load(format!("{e:?}")))?;

        let doc = PdfiumDocument { document };
        info!("PDF loaded: {} pages", doc.page_count());
        visit(&doc);
        Ok(())
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>, String> {
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| format!("{e:?}"))
    }
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn viewport(&self, index: usize, scale: f32) -> Result<Viewport, String> {
        let page = self.page(index)?;
        Ok(Viewport::from_points(
            page.width().value,
            page.height().value,
            scale,
        ))
    }

    fn render(&self, index: usize, viewport: Viewport) -> Result<DynamicImage, String> {
        let page = self.page(index)?;
        let config = PdfRenderConfig::new()
            .set_target_width(viewport.width as i32)
            .set_target_height(viewport.height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| format!("{e:?}"))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
