//! Offline integration tests for the summarize pipeline.
//!
//! A recording `GenerationBackend` stands in for the model API and a fake
//! `PdfEngine` stands in for pdfium, so these run without network access or
//! a native library.
//!
//! Run with:
//!   cargo test --test pipeline

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_docsum::{
    parse_blocks, summarize, summarize_inputs, BackendError, Block, EngineError, Generation,
    GenerationBackend, PdfEngine, ProgressStatus, RasterDocument, RequestPart, SelectedFile,
    Session, SessionState, SummaryConfig, SummaryError, SummaryProgressCallback, SummaryRequest,
    Viewport,
};
use image::{DynamicImage, RgbImage};
use std::sync::{Arc, Mutex};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Records every request and answers with a fixed text, or fails.
struct RecordingBackend {
    reply: Result<String, String>,
    requests: Mutex<Vec<SummaryRequest>>,
}

impl RecordingBackend {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(cause: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(cause.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> SummaryRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request")
    }
}

#[async_trait]
impl GenerationBackend for RecordingBackend {
    async fn generate(&self, request: &SummaryRequest) -> Result<Generation, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(Generation {
                text: text.clone(),
                input_tokens: 1200,
                output_tokens: 40,
            }),
            Err(cause) => Err(BackendError::new(cause.clone())),
        }
    }
}

/// A PDF engine whose documents have `pages` US-Letter pages.
struct FakePdf {
    pages: usize,
    broken: Vec<usize>,
}

struct FakeDoc<'a>(&'a FakePdf);

impl RasterDocument for FakeDoc<'_> {
    fn page_count(&self) -> usize {
        self.0.pages
    }

    fn viewport(&self, _index: usize, scale: f32) -> Result<Viewport, String> {
        Ok(Viewport::from_points(612.0, 792.0, scale))
    }

    fn render(&self, index: usize, vp: Viewport) -> Result<DynamicImage, String> {
        if self.0.broken.contains(&index) {
            return Err("canvas unavailable".into());
        }
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            vp.width / 8,
            vp.height / 8,
            image::Rgb([240, 240, 240]),
        )))
    }
}

impl PdfEngine for FakePdf {
    fn open(
        &self,
        bytes: &[u8],
        visit: &mut dyn FnMut(&dyn RasterDocument),
    ) -> Result<(), EngineError> {
        if bytes.ends_with(b"corrupt") {
            return Err(EngineError::Load("xref table not found".into()));
        }
        visit(&FakeDoc(self));
        Ok(())
    }
}

#[derive(Default)]
struct StatusLog(Mutex<Vec<String>>);

impl SummaryProgressCallback for StatusLog {
    fn on_status(&self, status: &ProgressStatus) {
        self.0.lock().unwrap().push(status.to_string());
    }
}

fn config(backend: Arc<RecordingBackend>, pdf: FakePdf) -> SummaryConfig {
    SummaryConfig::builder()
        .backend(backend)
        .pdf_engine(Arc::new(pdf))
        .build()
        .unwrap()
}

fn no_pdf() -> FakePdf {
    FakePdf {
        pages: 0,
        broken: vec![],
    }
}

fn file(name: &str, mime: &str, bytes: &[u8]) -> SelectedFile {
    SelectedFile::from_bytes(name, mime, bytes.to_vec())
}

fn pdf(name: &str) -> SelectedFile {
    file(name, "application/pdf", b"%PDF-1.7\n...")
}

// ── End-to-end with mocks ────────────────────────────────────────────────────

#[tokio::test]
async fn two_images_produce_heading_and_list() {
    let backend = RecordingBackend::replying("## Result\n- a\n- b");
    let cfg = config(backend.clone(), no_pdf());
    let files = vec![
        file("one.png", "image/png", b"first-image"),
        file("two.jpg", "image/jpeg", b"second-image"),
    ];

    let output = summarize(&files, &cfg).await.unwrap();

    assert_eq!(
        output.blocks,
        vec![
            Block::Heading {
                level: 2,
                text: "Result".into()
            },
            Block::List {
                items: vec!["a".into(), "b".into()]
            },
        ]
    );

    assert_eq!(backend.calls(), 1);
    let req = backend.last();
    assert_eq!(req.parts.len(), 3);
    assert!(matches!(&req.parts[0], RequestPart::Text(t) if t == cfg.effective_prompt()));
    assert_eq!(
        req.parts[1],
        RequestPart::InlineImage {
            mime_type: "image/png".into(),
            data: STANDARD.encode(b"first-image"),
        }
    );
    assert_eq!(
        req.parts[2],
        RequestPart::InlineImage {
            mime_type: "image/jpeg".into(),
            data: STANDARD.encode(b"second-image"),
        }
    );

    assert_eq!(output.stats.pages, 2);
    assert_eq!(output.stats.input_tokens, 1200);
    assert_eq!(output.markdown, "## Result\n- a\n- b");
}

#[tokio::test]
async fn pdf_pages_follow_images_in_selection_order() {
    let backend = RecordingBackend::replying("Fine.");
    let cfg = config(
        backend.clone(),
        FakePdf {
            pages: 3,
            broken: vec![],
        },
    );
    let files = vec![
        file("cover.webp", "image/webp", b"webp"),
        pdf("body.pdf"),
        file("back.png", "image/png", b"png"),
    ];

    let output = summarize(&files, &cfg).await.unwrap();
    assert_eq!(output.stats.pages, 5);

    let mimes: Vec<String> = backend
        .last()
        .parts
        .iter()
        .filter_map(|p| match p {
            RequestPart::InlineImage { mime_type, .. } => Some(mime_type.clone()),
            RequestPart::Text(_) => None,
        })
        .collect();
    assert_eq!(
        mimes,
        vec!["image/webp", "image/jpeg", "image/jpeg", "image/jpeg", "image/png"]
    );
}

#[tokio::test]
async fn pdf_page_is_decodable_jpeg_at_scaled_size() {
    let backend = RecordingBackend::replying("ok");
    let cfg = config(
        backend.clone(),
        FakePdf {
            pages: 1,
            broken: vec![],
        },
    );
    summarize(&[pdf("letter.pdf")], &cfg).await.unwrap();

    let req = backend.last();
    let RequestPart::InlineImage { data, .. } = &req.parts[1] else {
        panic!("expected an image part");
    };
    let bytes = STANDARD.decode(data).unwrap();
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
    // 612 × 792 pt at 1.5, shrunk by the fake renderer's factor of 8.
    assert_eq!((img.width(), img.height()), (918 / 8, 1188 / 8));
}

#[tokio::test]
async fn oversized_pdf_page_is_capped_on_longest_edge() {
    let backend = RecordingBackend::replying("ok");
    let cfg = SummaryConfig::builder()
        .backend(backend.clone())
        .pdf_engine(Arc::new(FakePdf {
            pages: 1,
            broken: vec![],
        }))
        .render_scale(4.0)
        .max_rendered_pixels(1000)
        .build()
        .unwrap();
    summarize(&[pdf("letter.pdf")], &cfg).await.unwrap();

    let req = backend.last();
    let RequestPart::InlineImage { data, .. } = &req.parts[1] else {
        panic!("expected an image part");
    };
    let bytes = STANDARD.decode(data).unwrap();
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
    // 2448 × 3168 at scale 4.0 becomes 772 × 1000, then the fake's factor of 8.
    assert_eq!((img.width(), img.height()), (772 / 8, 1000 / 8));
}

#[tokio::test]
async fn skipped_pdf_page_is_reported_not_fatal() {
    let backend = RecordingBackend::replying("ok");
    let cfg = config(
        backend.clone(),
        FakePdf {
            pages: 4,
            broken: vec![2],
        },
    );
    let output = summarize(&[pdf("scan.pdf")], &cfg).await.unwrap();

    assert_eq!(output.stats.pages, 3);
    assert_eq!(output.stats.skipped_pages, 1);
    assert_eq!(output.warnings[0].file, "scan.pdf");
    assert_eq!(output.warnings[0].page, 3);
    assert_eq!(backend.last().image_count(), 3);
}

// ── Failure classification ───────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_only_selection_is_no_content_without_request() {
    let backend = RecordingBackend::replying("unused");
    let cfg = config(backend.clone(), no_pdf());
    let files = vec![
        file("notes.txt", "text/plain", b"hello"),
        file("data.csv", "text/csv", b"a,b"),
    ];

    let err = summarize(&files, &cfg).await.unwrap_err();
    assert!(matches!(err, SummaryError::NoContent));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn empty_selection_is_no_content() {
    let backend = RecordingBackend::replying("unused");
    let cfg = config(backend.clone(), no_pdf());
    let err = summarize(&[], &cfg).await.unwrap_err();
    assert!(matches!(err, SummaryError::NoContent));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn zero_page_pdf_is_no_content() {
    let backend = RecordingBackend::replying("unused");
    let cfg = config(backend.clone(), no_pdf());
    let err = summarize(&[pdf("empty.pdf")], &cfg).await.unwrap_err();
    assert!(matches!(err, SummaryError::NoContent));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn corrupt_pdf_stops_the_pipeline() {
    let backend = RecordingBackend::replying("unused");
    let cfg = config(
        backend.clone(),
        FakePdf {
            pages: 2,
            broken: vec![],
        },
    );
    let files = vec![
        file("a.png", "image/png", b"png"),
        file("bad.pdf", "application/pdf", b"%PDF-1.4 corrupt"),
    ];
    let err = summarize(&files, &cfg).await.unwrap_err();
    assert!(matches!(err, SummaryError::CorruptPdf { ref name, .. } if name == "bad.pdf"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn backend_failure_is_generic() {
    let backend = RecordingBackend::failing("503 upstream overloaded");
    let cfg = config(backend.clone(), no_pdf());
    let err = summarize(&[file("a.png", "image/png", b"png")], &cfg)
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Generation));
    assert!(!err.to_string().contains("503"));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn missing_credential_fails_before_inputs_are_resolved() {
    let cfg = SummaryConfig::builder()
        .api_key_env("DOCSUM_INTEGRATION_KEY_NEVER_SET")
        .build()
        .unwrap();
    let err = summarize_inputs(&["/no/such/file.pdf"], &cfg)
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::MissingCredential { ref var } if var == "DOCSUM_INTEGRATION_KEY_NEVER_SET"));
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_statuses_in_pipeline_order() {
    let log = Arc::new(StatusLog::default());
    let cfg = SummaryConfig::builder()
        .backend(RecordingBackend::replying("ok"))
        .pdf_engine(Arc::new(FakePdf {
            pages: 2,
            broken: vec![],
        }))
        .progress_callback(log.clone())
        .build()
        .unwrap();

    summarize(&[file("a.png", "image/png", b"png"), pdf("b.pdf")], &cfg)
        .await
        .unwrap();

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            "Preparing files...",
            "Processing image: a.png",
            "Processing PDF: b.pdf",
            "Processing page 1 of 2 from b.pdf...",
            "Processing page 2 of 2 from b.pdf...",
            "Generating summary from 3 page(s)...",
        ]
    );
}

// ── Files on disk ────────────────────────────────────────────────────────────

#[tokio::test]
async fn local_files_are_resolved_in_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.JPG");
    let ignored = dir.path().join("readme.md");
    std::fs::write(&first, b"one").unwrap();
    std::fs::write(&second, b"two").unwrap();
    std::fs::write(&ignored, b"# not an image").unwrap();

    let backend = RecordingBackend::replying("ok");
    let cfg = config(backend.clone(), no_pdf());
    let inputs = [
        second.to_string_lossy().to_string(),
        ignored.to_string_lossy().to_string(),
        first.to_string_lossy().to_string(),
    ];
    let output = summarize_inputs(&inputs, &cfg).await.unwrap();

    assert_eq!(output.stats.selected_files, 3);
    assert_eq!(output.stats.skipped_files, 1);
    let req = backend.last();
    assert_eq!(
        req.parts[1],
        RequestPart::InlineImage {
            mime_type: "image/jpeg".into(),
            data: STANDARD.encode(b"two"),
        }
    );
    assert_eq!(
        req.parts[2],
        RequestPart::InlineImage {
            mime_type: "image/png".into(),
            data: STANDARD.encode(b"one"),
        }
    );
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_error_then_retry_then_reset() {
    let backend = RecordingBackend::replying("# Title\n\nBody.");
    let mut session = Session::new(config(backend.clone(), no_pdf())).unwrap();

    session.select(vec![file("x.txt", "text/plain", b"x")]);
    let state = session.summarize().await;
    assert!(matches!(state, SessionState::Idle { error: Some(_), .. }));
    assert_eq!(state.files().len(), 1);

    session.select(vec![file("x.png", "image/png", b"x")]);
    let state = session.summarize().await;
    let output = state.output().expect("summary");
    assert_eq!(output.blocks, parse_blocks("# Title\n\nBody."));

    session.reset();
    assert!(matches!(
        session.state(),
        SessionState::Idle { files, error: None } if files.is_empty()
    ));
    assert_eq!(backend.calls(), 1);
}
