//! End-to-end tests against the live model API.
//!
//! Gated behind the `E2E_ENABLED` environment variable so they never run in
//! CI by accident. They also need `GEMINI_API_KEY`, and the PDF test needs a
//! pdfium library (system-wide or via `PDFIUM_LIB_PATH`).
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use edgequake_docsum::{summarize, Block, SelectedFile, SummaryConfig, SummaryError};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// A small PNG with a solid colour, enough for the model to describe.
fn swatch_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(64, 64, Rgb([200, 30, 30]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn test_summarize_single_image() {
    e2e_skip_unless_enabled!();

    let files = vec![SelectedFile::from_bytes("swatch.png", "image/png", swatch_png())];
    let output = summarize(&files, &SummaryConfig::default()).await.unwrap();

    println!("{}", output.markdown);
    assert!(!output.markdown.trim().is_empty());
    assert!(!output.blocks.is_empty());
    assert_eq!(output.stats.pages, 1);
}

#[tokio::test]
async fn test_summarize_pdf_from_test_cases() {
    e2e_skip_unless_enabled!();

    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/sample.pdf");
    if !path.exists() {
        println!("SKIP: test file not found: {}", path.display());
        return;
    }

    let output = summarize(&[SelectedFile::from_path(&path)], &SummaryConfig::default())
        .await
        .unwrap();
    println!("{}", output.markdown);
    assert!(output.stats.pages >= 1);
    assert!(output
        .blocks
        .iter()
        .any(|b| matches!(b, Block::Heading { .. } | Block::Paragraph { .. })));
}

#[tokio::test]
async fn test_unknown_model_is_generation_error() {
    e2e_skip_unless_enabled!();

    let config = SummaryConfig::builder()
        .model("gemini-does-not-exist")
        .build()
        .unwrap();
    let files = vec![SelectedFile::from_bytes("swatch.png", "image/png", swatch_png())];
    match summarize(&files, &config).await {
        Err(SummaryError::Generation) | Err(SummaryError::ProviderNotConfigured { .. }) => {}
        other => panic!("unexpected result: {:?}", other.map(|o| o.markdown)),
    }
}
