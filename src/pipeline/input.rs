//! Input resolution: turn user-supplied paths and URLs into a file selection.
//!
//! A [`SelectedFile`] carries a display name, a MIME type and either a local
//! path or bytes already in memory. Local files are only checked for
//! existence and readability here; their content is read by the normalizer
//! when their turn comes. URLs are downloaded eagerly so that a network
//! failure surfaces before any page is rendered.

use crate::error::SummaryError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// MIME type given to anything that is neither a supported image nor a PDF.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// MIME type of PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// File extensions offered by the picker, lower-case.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "webp"];

/// Where a selected file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A local file, read when the normalizer reaches it.
    Path(PathBuf),
    /// Bytes already in memory (downloads, library callers).
    Bytes(Vec<u8>),
}

/// How the normalizer treats a file, decided purely by MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `image/*`: one page, bytes passed through.
    Image,
    /// `application/pdf`: one page per PDF page.
    Pdf,
    /// Anything else: contributes no pages.
    Unsupported,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            FileKind::Image
        } else if mime_type == PDF_MIME {
            FileKind::Pdf
        } else {
            FileKind::Unsupported
        }
    }
}

/// One entry of the user's selection.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Display name used in progress messages and warnings.
    pub name: String,
    pub mime_type: String,
    pub source: FileSource,
}

impl SelectedFile {
    /// A local file; the MIME type is derived from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime_type: mime_for_path(&path).to_string(),
            source: FileSource::Path(path),
        }
    }

    /// An in-memory file with an explicit MIME type.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }

    /// Read the full content of the file.
    pub async fn read(&self) -> Result<Vec<u8>, SummaryError> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SummaryError::FileNotFound { path: path.clone() },
                std::io::ErrorKind::PermissionDenied => {
                    SummaryError::PermissionDenied { path: path.clone() }
                }
                _ => SummaryError::FileRead {
                    name: self.name.clone(),
                    source: e,
                },
            }),
        }
    }
}

/// MIME type for a path, from its extension (case-insensitive).
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => UNKNOWN_MIME,
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve every input, in order, into a [`SelectedFile`].
pub async fn resolve_inputs<S: AsRef<str>>(
    inputs: &[S],
    timeout_secs: u64,
) -> Result<Vec<SelectedFile>, SummaryError> {
    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        files.push(resolve_input(input.as_ref(), timeout_secs).await?);
    }
    Ok(files)
}

/// Resolve one input string to a selected file.
///
/// If the input is a URL, download it. If it is a local path, validate that
/// it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<SelectedFile, SummaryError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<SelectedFile, SummaryError> {
    if path_str.trim().is_empty() {
        return Err(SummaryError::InvalidInput {
            input: path_str.to_string(),
        });
    }
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(SummaryError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SummaryError::PermissionDenied { path });
        }
        Err(_) => return Err(SummaryError::FileNotFound { path }),
    }

    let file = SelectedFile::from_path(path);
    debug!("Resolved local file: {} ({})", file.name, file.mime_type);
    Ok(file)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<SelectedFile, SummaryError> {
    info!("Downloading: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SummaryError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SummaryError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SummaryError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(SummaryError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let name = extract_filename(url);
    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mime_type = mime_from_content_type(header_mime.as_deref(), &name);

    let bytes = response.bytes().await.map_err(|e| SummaryError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    info!("Downloaded {} ({} bytes, {})", name, bytes.len(), mime_type);
    Ok(SelectedFile::from_bytes(name, mime_type, bytes.to_vec()))
}

/// Pick a MIME type for a download: the `Content-Type` header when it names an
/// image or a PDF, otherwise the file extension.
fn mime_from_content_type(header: Option<&str>, name: &str) -> String {
    let from_header = header
        .and_then(|h| h.split(';').next())
        .map(|m| m.trim().to_lowercase())
        .filter(|m| FileKind::from_mime(m) != FileKind::Unsupported);
    from_header.unwrap_or_else(|| mime_for_path(Path::new(name)).to_string())
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "download".to_string()
}
