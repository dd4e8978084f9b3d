//! Error types for the docconv-upload library.
//!
//! Two distinct error families reflect two distinct failure modes:
//!
//! * [`ValidationError`]: a selection or submission was **rejected** by the
//!   coordinator. These are always recoverable: state is left untouched, a
//!   notice is raised and the user makes a new choice.
//!
//! * [`UploadError`]: the **transport** side failed: a file could not be
//!   read, the service was unreachable or refused the request. Returned from
//!   the client and input-collection functions.
//!
//! [`PartialAcceptance`] is not an error at all; it rides along with a
//! successful [`crate::coordinator::Acceptance`] so callers can report how
//! many candidates were dropped.

use crate::format::SupportedFormat;
use crate::selection::Rejection;
use std::path::PathBuf;
use thiserror::Error;

/// A selection or submission rejected by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Every candidate failed the extension or size check.
    #[error("none of the {submitted} candidate file(s) can be uploaded")]
    NoValidFiles {
        submitted: usize,
        rejections: Vec<Rejection>,
    },

    /// Single-file upload whose extension already matches the target.
    #[error("source and target format are both '{format}'")]
    SameFormat { format: SupportedFormat },

    /// Submit attempted without files or without a target format.
    #[error("submission needs files and a target format (files: {has_files}, format: {has_format})")]
    MissingSelection { has_files: bool, has_format: bool },

    /// The selection is locked while an upload is in flight.
    #[error("an upload is already in progress")]
    SubmissionInProgress,
}

/// Some candidates were dropped but at least one was accepted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PartialAcceptance {
    pub accepted: usize,
    pub submitted: usize,
    pub rejections: Vec<Rejection>,
}

impl std::fmt::Display for PartialAcceptance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} files are valid and will be processed.",
            self.accepted, self.submitted
        )
    }
}

/// All transport and I/O errors returned by the library.
#[derive(Debug, Error)]
pub enum UploadError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Candidate path does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading a file or directory failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A [`crate::selection::FileRef`] without a local path cannot be uploaded.
    #[error("No local source for '{name}'; it was described by metadata only")]
    MissingSource { name: String },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The configured endpoint is not a valid HTTP/HTTPS URL.
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The request could not be sent or the body could not be read.
    #[error("Request to '{url}' failed: {reason}\nCheck that the conversion service is running.")]
    RequestFailed { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s\nIncrease --timeout.")]
    Timeout { url: String, secs: u64 },

    /// The service answered with a non-success status.
    #[error("Conversion service rejected the request: HTTP {status}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    ServerRejected { status: u16, message: Option<String> },

    /// The service answered, but not in a shape we understand.
    #[error("Unexpected response from '{url}': {detail}")]
    UnexpectedResponse { url: String, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write a downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Validation ────────────────────────────────────────────────────────
    /// The coordinator refused the selection.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_acceptance_display() {
        let p = PartialAcceptance {
            accepted: 1,
            submitted: 2,
            rejections: vec![],
        };
        assert_eq!(p.to_string(), "1 of 2 files are valid and will be processed.");
    }

    #[test]
    fn same_format_display() {
        let e = ValidationError::SameFormat {
            format: SupportedFormat::Docx,
        };
        assert!(e.to_string().contains("docx"));
    }

    #[test]
    fn server_rejected_display_with_message() {
        let e = UploadError::ServerRejected {
            status: 413,
            message: Some("Request Entity Too Large".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("413"), "got: {msg}");
        assert!(msg.contains("Too Large"), "got: {msg}");
    }

    #[test]
    fn server_rejected_display_without_message() {
        let e = UploadError::ServerRejected {
            status: 500,
            message: None,
        };
        assert!(e.to_string().ends_with("HTTP 500"));
    }

    #[test]
    fn validation_converts_into_upload_error() {
        let e: UploadError = ValidationError::SubmissionInProgress.into();
        assert!(matches!(
            e,
            UploadError::Validation(ValidationError::SubmissionInProgress)
        ));
        assert_eq!(e.to_string(), "an upload is already in progress");
    }

    #[test]
    fn timeout_display() {
        let e = UploadError::Timeout {
            url: "http://localhost:5000/upload".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("120s"));
    }
}
