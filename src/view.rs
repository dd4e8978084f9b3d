//! Read-only projection of the selection for a presentation layer.
//!
//! Everything a renderer needs is precomputed here (headline, size line,
//! button label) so that rendering code never inspects [`SelectionState`]
//! directly.

use crate::coordinator::Phase;
use crate::format::SupportedFormat;
use crate::selection::{SelectionMode, SelectionState};
use serde::Serialize;

/// Number of file names listed in a batch preview line.
const PREVIEW_NAMES: usize = 3;

/// Snapshot of the selection, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionView {
    pub mode: SelectionMode,
    pub phase: Phase,
    pub file_names: Vec<String>,
    pub total_size: u64,
    pub format: Option<SupportedFormat>,
    pub can_submit: bool,
    /// File name, or `Batch Upload - N files`. Empty when nothing is selected.
    pub headline: String,
    /// Size/type line under the headline.
    pub detail: String,
    /// First few names of a batch; empty in single mode.
    pub preview: String,
    /// Text of the submit button.
    pub submit_label: String,
}

impl SelectionView {
    pub fn project(state: &SelectionState, phase: Phase) -> Self {
        let can_submit = state.has_files() && state.has_format();
        let total_size = state.total_size();
        let file_names: Vec<String> = state.files.iter().map(|f| f.name.clone()).collect();

        let (headline, detail, preview) = match (state.mode, state.files.as_slice()) {
            (_, []) => (String::new(), String::new(), String::new()),
            (SelectionMode::Single, [file, ..]) => (
                file.name.clone(),
                format!(
                    "{} • {}",
                    format_file_size(file.size_bytes),
                    file.mime_type.as_deref().unwrap_or("Unknown type")
                ),
                String::new(),
            ),
            (SelectionMode::Batch, files) => (
                format!("Batch Upload - {} files", files.len()),
                format!("Total: {}", format_file_size(total_size)),
                batch_preview(&file_names),
            ),
        };

        Self {
            mode: state.mode,
            phase,
            submit_label: submit_label(phase, state.mode, state.files.len(), state.target_format),
            file_names,
            total_size,
            format: state.target_format,
            can_submit,
            headline,
            detail,
            preview,
        }
    }
}

/// `a.pdf, b.doc, c.odt and 2 more...`
fn batch_preview(names: &[String]) -> String {
    let shown = names
        .iter()
        .take(PREVIEW_NAMES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > PREVIEW_NAMES {
        format!("{shown} and {} more...", names.len() - PREVIEW_NAMES)
    } else {
        shown
    }
}

/// Label of the submit button for the given state.
pub fn submit_label(
    phase: Phase,
    mode: SelectionMode,
    file_count: usize,
    format: Option<SupportedFormat>,
) -> String {
    match (phase, mode, format) {
        (Phase::Submitting, SelectionMode::Batch, _) => format!("Converting {file_count} files..."),
        (Phase::Submitting, SelectionMode::Single, _) => "Converting...".to_string(),
        (Phase::Ready, SelectionMode::Batch, Some(f)) => {
            format!("Convert {file_count} files to {}", f.label())
        }
        (Phase::Ready, SelectionMode::Single, Some(f)) => format!("Convert to {}", f.label()),
        (_, SelectionMode::Batch, _) => "Convert Documents".to_string(),
        (_, SelectionMode::Single, _) => "Convert Document".to_string(),
    }
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
///
/// Base 1024, at most two decimals with trailing zeros dropped, capped at GB.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
