//! HTTP side of the submission boundary.
//!
//! The coordinator's job ends once [`UploadCoordinator::begin_submission`]
//! hands out a [`Submission`]. This module plays the part of the browser's
//! native form POST: it sends one multipart request to the conversion
//! service and reports where the service sent us afterwards. It never
//! interprets conversion progress; the service converts synchronously and
//! answers with a redirect or a results page.
//!
//! Routes used, all resolved next to the configured upload endpoint:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST upload` | multipart upload + conversion |
//! | `GET check_formats` | list of accepted inputs, targets and qualities |
//! | `GET download/<name>` | one converted file |
//! | `GET batch_download/<id>` | ZIP of a batch |
//!
//! [`UploadCoordinator::begin_submission`]: crate::coordinator::UploadCoordinator::begin_submission

use crate::config::UploadConfig;
use crate::coordinator::Submission;
use crate::error::UploadError;
use crate::format::SupportedFormat;
use crate::selection::FileRef;
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

static BATCH_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/batch_download/([0-9A-Za-z-]+)").expect("valid regex"));

static DOWNLOAD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"/download/([^"'\s<>?#/]+)"#).expect("valid regex"));

static ALERT_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="[^"]*\balert\b[^"]*"[^>]*>\s*([^<]*[^<\s])"#).expect("valid regex")
});

static DISPOSITION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).expect("valid regex")
});

// ── Public types ─────────────────────────────────────────────────────────

/// Where the service sent us after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Single file converted; the preview page names the stored result.
    Preview { filename: String },
    /// Batch converted; results page links the archive and each file.
    BatchResults { batch_id: String, files: Vec<String> },
    /// Redirected back to the form: the service refused the upload or the
    /// conversion failed. `message` is the flashed alert text, if any.
    Returned { message: Option<String> },
}

/// Summary of a completed upload request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub final_url: String,
    pub outcome: Outcome,
    pub elapsed_ms: u64,
}

impl SubmissionReceipt {
    pub fn succeeded(&self) -> bool {
        !matches!(self.outcome, Outcome::Returned { .. })
    }
}

/// Response of `GET check_formats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub conversion_formats: Vec<String>,
    #[serde(default)]
    pub quality_settings: Vec<String>,
}

impl Capabilities {
    /// Advertised targets that this client also knows, in allow-list order.
    pub fn targets(&self) -> Vec<SupportedFormat> {
        let mut out: Vec<SupportedFormat> = self
            .conversion_formats
            .iter()
            .filter_map(|s| SupportedFormat::from_extension(s))
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

// ── Entry points ─────────────────────────────────────────────────────────

/// Upload the submission as one multipart form POST.
///
/// Each file becomes a part under `config.files_field`; the target format
/// and quality are sent as text fields. Redirects are followed and the final
/// location is classified into an [`Outcome`].
///
/// # Errors
/// - [`UploadError::MissingSource`] if a file has no local path
/// - [`UploadError::FileNotFound`] / [`UploadError::ReadFailed`] for unreadable files
/// - [`UploadError::Timeout`] / [`UploadError::RequestFailed`] for transport failures
/// - [`UploadError::ServerRejected`] for non-success HTTP statuses
pub async fn submit(
    submission: &Submission,
    config: &UploadConfig,
) -> Result<SubmissionReceipt, UploadError> {
    let start = Instant::now();
    let endpoint = parse_endpoint(config)?;
    let client = build_client(config)?;

    let parts = try_join_all(submission.files.iter().map(file_part)).await?;
    let mut form = Form::new()
        .text(
            config.format_field.clone(),
            submission.target_format.extension().to_string(),
        )
        .text(config.quality_field.clone(), submission.quality.to_string());
    for part in parts {
        form = form.part(config.files_field.clone(), part);
    }

    info!(
        "POST {} ({} file(s), {} bytes, → {})",
        endpoint,
        submission.files.len(),
        submission.total_size(),
        submission.target_format
    );

    let response = client
        .post(endpoint.clone())
        .multipart(form)
        .send()
        .await
        .map_err(|e| transport_error(&endpoint, e, config.timeout_secs))?;

    let response = ensure_success(response).await?;
    let status = response.status().as_u16();
    let final_url = response.url().clone();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(&final_url, e, config.timeout_secs))?;

    let outcome = classify(&final_url, &body);
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &outcome {
        Outcome::Returned { message } => warn!(
            "Service returned to the form: {}",
            message.as_deref().unwrap_or("no message")
        ),
        other => info!("Upload finished in {}ms: {:?}", elapsed_ms, other),
    }

    Ok(SubmissionReceipt {
        status,
        final_url: final_url.to_string(),
        outcome,
        elapsed_ms,
    })
}

/// Synchronous wrapper around [`submit`].
///
/// Creates a temporary tokio runtime internally.
pub fn submit_sync(
    submission: &Submission,
    config: &UploadConfig,
) -> Result<SubmissionReceipt, UploadError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| UploadError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(submit(submission, config))
}

/// Ask the service which formats and quality settings it supports.
pub async fn fetch_capabilities(config: &UploadConfig) -> Result<Capabilities, UploadError> {
    let url = sibling(&parse_endpoint(config)?, &["check_formats"]);
    let client = build_client(config)?;
    debug!("GET {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| transport_error(&url, e, config.timeout_secs))?;
    let response = ensure_success(response).await?;
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(&url, e, config.timeout_secs))?;
    serde_json::from_str(&body).map_err(|e| UploadError::UnexpectedResponse {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

/// Download one converted file into `out_dir` and return its path.
///
/// `filename` is the stored name reported in [`Outcome::Preview`] or
/// [`Outcome::BatchResults`].
pub async fn download(
    config: &UploadConfig,
    filename: &str,
    out_dir: impl AsRef<Path>,
) -> Result<PathBuf, UploadError> {
    let url = sibling(&parse_endpoint(config)?, &["download", filename]);
    fetch_to_dir(config, url, out_dir.as_ref(), display_name(filename)).await
}

/// Download the ZIP archive of a batch into `out_dir` and return its path.
pub async fn download_batch(
    config: &UploadConfig,
    batch_id: &str,
    out_dir: impl AsRef<Path>,
) -> Result<PathBuf, UploadError> {
    let url = sibling(&parse_endpoint(config)?, &["batch_download", batch_id]);
    let short: String = batch_id.chars().take(8).collect();
    let fallback = format!("converted_documents_{short}.zip");
    fetch_to_dir(config, url, out_dir.as_ref(), &fallback).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn parse_endpoint(config: &UploadConfig) -> Result<Url, UploadError> {
    let url = Url::parse(&config.endpoint).map_err(|e| UploadError::InvalidEndpoint {
        url: config.endpoint.clone(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UploadError::InvalidEndpoint {
            url: config.endpoint.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn build_client(config: &UploadConfig) -> Result<reqwest::Client, UploadError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| UploadError::Internal(format!("HTTP client: {e}")))
}

/// Replace the last path segment of the endpoint with `segments`.
fn sibling(endpoint: &Url, segments: &[&str]) -> Url {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().pop().extend(segments);
    }
    url
}

async fn file_part(file: &FileRef) -> Result<Part, UploadError> {
    let path = file.path.as_ref().ok_or_else(|| UploadError::MissingSource {
        name: file.name.clone(),
    })?;
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => UploadError::FileNotFound { path: path.clone() },
        std::io::ErrorKind::PermissionDenied => UploadError::PermissionDenied { path: path.clone() },
        _ => UploadError::ReadFailed {
            path: path.clone(),
            source: e,
        },
    })?;
    debug!("Read {} ({} bytes)", file.name, bytes.len());

    let mime = file
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    Part::bytes(bytes)
        .file_name(file.name.clone())
        .mime_str(mime)
        .map_err(|e| UploadError::Internal(format!("invalid MIME type '{mime}': {e}")))
}

fn transport_error(url: &Url, e: reqwest::Error, timeout_secs: u64) -> UploadError {
    if e.is_timeout() {
        UploadError::Timeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        UploadError::RequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = alert_text(&body).or_else(|| status.canonical_reason().map(str::to_string));
    Err(UploadError::ServerRejected {
        status: status.as_u16(),
        message,
    })
}

/// Decide what the final page after an upload means.
///
/// Stored names produced by the service are already URL-safe, so path
/// segments are used verbatim.
fn classify(final_url: &Url, body: &str) -> Outcome {
    let segments: Vec<&str> = final_url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if let [.., "preview", name] = segments.as_slice() {
        return Outcome::Preview {
            filename: (*name).to_string(),
        };
    }

    if let Some(caps) = BATCH_LINK.captures(body) {
        let mut seen = HashSet::new();
        let files: Vec<String> = DOWNLOAD_LINK
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .filter(|name| seen.insert(name.clone()))
            .collect();
        return Outcome::BatchResults {
            batch_id: caps[1].to_string(),
            files,
        };
    }

    Outcome::Returned {
        message: alert_text(body),
    }
}

fn alert_text(body: &str) -> Option<String> {
    ALERT_TEXT
        .captures(body)
        .map(|c| c[1].split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Stored names carry a `<uuid>_` prefix; the user-facing name drops it.
fn display_name(stored: &str) -> &str {
    stored.split_once('_').map(|(_, rest)| rest).unwrap_or(stored)
}

async fn fetch_to_dir(
    config: &UploadConfig,
    url: Url,
    out_dir: &Path,
    fallback_name: &str,
) -> Result<PathBuf, UploadError> {
    let client = build_client(config)?;
    debug!("GET {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| transport_error(&url, e, config.timeout_secs))?;
    let response = ensure_success(response).await?;

    let name = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DISPOSITION_NAME.captures(v))
        .map(|c| c[1].trim().to_string());

    // The service redirects to the form page when a file has expired.
    if name.is_none() && response.url().path() != url.path() {
        let final_url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        return Err(UploadError::UnexpectedResponse {
            url: final_url,
            detail: alert_text(&body).unwrap_or_else(|| "file not found or has expired".into()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(&url, e, config.timeout_secs))?;

    let name = name.as_deref().unwrap_or(fallback_name);
    let safe_name = Path::new(name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| fallback_name.into());
    let path = out_dir.join(safe_name);

    let len = bytes.len();
    let path = write_atomically(path, bytes).await?;
    info!("Saved {} ({} bytes)", path.display(), len);
    Ok(path)
}

/// Atomic write: write to a temp file in the same directory, then rename.
///
/// Runs on the blocking pool; archives can be tens of megabytes.
async fn write_atomically(
    path: PathBuf,
    bytes: impl AsRef<[u8]> + Send + 'static,
) -> Result<PathBuf, UploadError> {
    tokio::task::spawn_blocking(move || -> Result<PathBuf, UploadError> {
        let write_err = |source: std::io::Error| UploadError::OutputWriteFailed {
            path: path.clone(),
            source,
        };
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(bytes.as_ref()).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        Ok(path)
    })
    .await
    .map_err(|e| UploadError::Internal(format!("write task failed: {e}")))?
}
