//! Candidate collection: turn user-supplied paths into [`FileRef`]s.
//!
//! The CLI has two "input gestures", mirroring the page's picker and drop
//! zone: naming files explicitly, or dropping a whole directory. Both end up
//! as a flat list of candidates for
//! [`crate::coordinator::UploadCoordinator::accept_candidates`]; no
//! allow-list or size checks happen here.

use crate::error::UploadError;
use crate::selection::FileRef;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve each path to candidate metadata.
///
/// Files are described as-is. A directory contributes its regular files
/// (not recursing, dot-files skipped), sorted by name so the batch order is
/// stable.
pub fn collect_candidates<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FileRef>, UploadError> {
    let mut out = Vec::new();
    for p in paths {
        let path = p.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| io_error(path, e))?;
        if meta.is_dir() {
            out.extend(expand_dir(path)?);
        } else {
            out.push(describe(path)?);
        }
    }
    debug!("Collected {} candidate(s) from {} path(s)", out.len(), paths.len());
    Ok(out)
}

fn expand_dir(dir: &Path) -> Result<Vec<FileRef>, UploadError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_error(dir, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    debug!("Directory {} holds {} file(s)", dir.display(), entries.len());
    entries.iter().map(|p| describe(p)).collect()
}

fn describe(path: &Path) -> Result<FileRef, UploadError> {
    FileRef::from_path(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> UploadError {
    match e.kind() {
        std::io::ErrorKind::NotFound => UploadError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => UploadError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => UploadError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_file_not_found() {
        let err = collect_candidates(&["/definitely/not/here.pdf"]).unwrap_err();
        assert!(matches!(err, UploadError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_expanded_sorted_without_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.docx"), b"bb").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"a").unwrap();
        std::fs::write(dir.path().join(".hidden.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = collect_candidates(&[dir.path()]).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.docx"]);
        assert_eq!(files[1].size_bytes, 2);
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("z.txt");
        let a = dir.path().join("a.exe");
        std::fs::write(&z, b"z").unwrap();
        std::fs::write(&a, b"a").unwrap();

        let files = collect_candidates(&[&z, &a]).unwrap();
        assert_eq!(files[0].name, "z.txt");
        assert_eq!(files[1].name, "a.exe");
        assert!(files[1].mime_type.is_none());
    }
}
