//! Selection data: candidate file metadata and the current selection.

use crate::format::{file_extension, SupportedFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hard upper bound on the size of a single uploaded file: 50 MiB.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Read-only metadata describing one candidate file.
///
/// Built from a picker or drop event; never mutated afterwards. The optional
/// `path` is only consulted by the upload client when it streams contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FileRef {
    /// Metadata-only reference with no local source.
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: None,
            path: None,
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Describe a file on disk: name, size and a MIME type guessed from the
    /// extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = SupportedFormat::from_file_name(&name).map(|f| f.mime_type().to_string());
        Ok(Self {
            name,
            size_bytes: meta.len(),
            mime_type,
            path: Some(path.to_path_buf()),
        })
    }

    /// Raw extension text after the last dot, as typed by the user.
    pub fn extension(&self) -> Option<&str> {
        file_extension(&self.name)
    }

    /// Format implied by the extension, if it is on the allow-list.
    pub fn format(&self) -> Option<SupportedFormat> {
        SupportedFormat::from_file_name(&self.name)
    }

    /// Check this file against the allow-list and the size limit.
    ///
    /// The extension check runs first, so an oversized `.exe` reports
    /// [`RejectReason::UnsupportedExtension`].
    pub fn check(&self, max_size: u64) -> Result<SupportedFormat, RejectReason> {
        let format = self.format().ok_or_else(|| RejectReason::UnsupportedExtension {
            extension: self.extension().map(str::to_string),
        })?;
        if self.size_bytes > max_size {
            return Err(RejectReason::TooLarge {
                size_bytes: self.size_bytes,
                limit: max_size,
            });
        }
        Ok(format)
    }
}

/// Why a candidate was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    UnsupportedExtension { extension: Option<String> },
    TooLarge { size_bytes: u64, limit: u64 },
}

/// A dropped candidate together with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub name: String,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Single-file or batch upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Batch,
}

impl SelectionMode {
    /// Batch iff more than one file was accepted.
    pub fn for_count(n: usize) -> Self {
        if n > 1 {
            SelectionMode::Batch
        } else {
            SelectionMode::Single
        }
    }
}

/// What the user has picked so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub mode: SelectionMode,
    pub files: Vec<FileRef>,
    pub target_format: Option<SupportedFormat>,
}

impl SelectionState {
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn has_format(&self) -> bool {
        self.target_format.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_files() && !self.has_format()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_accepts_limit_exactly() {
        let f = FileRef::new("big.pdf", MAX_FILE_SIZE);
        assert_eq!(f.check(MAX_FILE_SIZE), Ok(SupportedFormat::Pdf));
    }

    #[test]
    fn check_rejects_one_byte_over() {
        let f = FileRef::new("big.pdf", MAX_FILE_SIZE + 1);
        assert!(matches!(
            f.check(MAX_FILE_SIZE),
            Err(RejectReason::TooLarge { .. })
        ));
    }

    #[test]
    fn check_reports_extension_before_size() {
        let f = FileRef::new("setup.EXE", MAX_FILE_SIZE * 2);
        assert_eq!(
            f.check(MAX_FILE_SIZE),
            Err(RejectReason::UnsupportedExtension {
                extension: Some("EXE".into())
            })
        );
    }

    #[test]
    fn mode_follows_count() {
        assert_eq!(SelectionMode::for_count(0), SelectionMode::Single);
        assert_eq!(SelectionMode::for_count(1), SelectionMode::Single);
        assert_eq!(SelectionMode::for_count(2), SelectionMode::Batch);
    }

    #[test]
    fn from_path_reads_size_and_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Memo.RTF");
        std::fs::write(&path, b"{\\rtf1 hello}").unwrap();

        let f = FileRef::from_path(&path).unwrap();
        assert_eq!(f.name, "Memo.RTF");
        assert_eq!(f.size_bytes, 13);
        assert_eq!(f.mime_type.as_deref(), Some("application/rtf"));
        assert_eq!(f.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn total_size_sums_files() {
        let state = SelectionState {
            mode: SelectionMode::Batch,
            files: vec![FileRef::new("a.pdf", 10), FileRef::new("b.pdf", 32)],
            target_format: None,
        };
        assert_eq!(state.total_size(), 42);
        assert!(!state.is_empty());
    }
}
