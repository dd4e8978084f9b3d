//! # docconv-upload
//!
//! Client side of a document-conversion tool: choose files, choose a target
//! format, validate, and hand off a multipart upload to the conversion
//! service.
//!
//! ## Why this crate?
//!
//! Upload forms tend to grow their rules inside event handlers: the picker
//! checks extensions, the drop zone checks them again slightly differently,
//! and the submit handler adds one more condition. Here every input path
//! goes through a single [`UploadCoordinator`], which owns the selection,
//! applies one set of rules and exposes a read-only [`SelectionView`] for
//! whatever renders it (a terminal, a web page, a test).
//!
//! ## Flow Overview
//!
//! ```text
//! paths / dropped dir
//!  │
//!  ├─ 1. Input      collect candidate FileRefs (name, size, MIME)
//!  ├─ 2. Accept     allow-list + 50 MiB limit → Single / Batch selection
//!  ├─ 3. Format     user picks the target format
//!  ├─ 4. Gate       validate_submission (missing selection, same format)
//!  ├─ 5. Upload     multipart POST to the conversion service
//!  └─ 6. Result     preview / batch results / back to the form
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docconv_upload::{collect_candidates, submit, SupportedFormat, UploadConfig, UploadCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UploadConfig::default();
//!     let mut coordinator = UploadCoordinator::new(&config);
//!
//!     coordinator.accept_candidates(collect_candidates(&["report.docx"])?)?;
//!     coordinator.select_format(SupportedFormat::Pdf)?;
//!
//!     let submission = coordinator.begin_submission()?;
//!     let receipt = submit(&submission, &config).await?;
//!     coordinator.finish_submission();
//!     println!("{:?}", receipt.outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docconv` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docconv-upload = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod input;
pub mod notice;
pub mod observer;
pub mod selection;
pub mod theme;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{
    download, download_batch, fetch_capabilities, submit, submit_sync, Capabilities, Outcome,
    SubmissionReceipt,
};
pub use config::{Quality, UploadConfig, UploadConfigBuilder, DEFAULT_ENDPOINT};
pub use coordinator::{Acceptance, Phase, Submission, UploadCoordinator};
pub use error::{PartialAcceptance, UploadError, ValidationError};
pub use format::SupportedFormat;
pub use input::collect_candidates;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use observer::{NoopObserver, SelectionObserver, SharedObserver};
pub use selection::{FileRef, RejectReason, Rejection, SelectionMode, SelectionState, MAX_FILE_SIZE};
pub use theme::{Theme, ThemeToggle};
pub use view::{format_file_size, SelectionView};
