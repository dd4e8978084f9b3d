//! The closed allow-list of document formats.
//!
//! [`SupportedFormat`] doubles as the set of accepted source extensions and
//! the set of selectable target formats. The conversion service advertises
//! a slightly narrower list of targets (see
//! [`SupportedFormat::is_conversion_target`]); the coordinator does not
//! enforce that distinction, it only carries the user's choice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A document format recognised by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedFormat {
    // ── OpenDocument ──────────────────────────────────────────────────────
    Odt,
    Ods,
    Odp,
    Odg,
    Odf,
    // ── PDF ───────────────────────────────────────────────────────────────
    Pdf,
    // ── Word processing ───────────────────────────────────────────────────
    Doc,
    Docx,
    Rtf,
    // ── Spreadsheets ──────────────────────────────────────────────────────
    Xls,
    Xlsx,
    Csv,
    // ── Presentations ─────────────────────────────────────────────────────
    Ppt,
    Pptx,
    // ── Plain text / markup ───────────────────────────────────────────────
    Txt,
    Html,
    Htm,
}

impl SupportedFormat {
    /// Every supported format, in allow-list order.
    pub const ALL: [SupportedFormat; 17] = [
        SupportedFormat::Odt,
        SupportedFormat::Ods,
        SupportedFormat::Odp,
        SupportedFormat::Odg,
        SupportedFormat::Odf,
        SupportedFormat::Pdf,
        SupportedFormat::Doc,
        SupportedFormat::Docx,
        SupportedFormat::Rtf,
        SupportedFormat::Xls,
        SupportedFormat::Xlsx,
        SupportedFormat::Csv,
        SupportedFormat::Ppt,
        SupportedFormat::Pptx,
        SupportedFormat::Txt,
        SupportedFormat::Html,
        SupportedFormat::Htm,
    ];

    /// Canonical lower-case extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            SupportedFormat::Odt => "odt",
            SupportedFormat::Ods => "ods",
            SupportedFormat::Odp => "odp",
            SupportedFormat::Odg => "odg",
            SupportedFormat::Odf => "odf",
            SupportedFormat::Pdf => "pdf",
            SupportedFormat::Doc => "doc",
            SupportedFormat::Docx => "docx",
            SupportedFormat::Rtf => "rtf",
            SupportedFormat::Xls => "xls",
            SupportedFormat::Xlsx => "xlsx",
            SupportedFormat::Csv => "csv",
            SupportedFormat::Ppt => "ppt",
            SupportedFormat::Pptx => "pptx",
            SupportedFormat::Txt => "txt",
            SupportedFormat::Html => "html",
            SupportedFormat::Htm => "htm",
        }
    }

    /// Upper-case label used on buttons ("Convert to PDF").
    pub fn label(self) -> String {
        self.extension().to_ascii_uppercase()
    }

    /// IANA media type for the format.
    pub fn mime_type(self) -> &'static str {
        match self {
            SupportedFormat::Odt => "application/vnd.oasis.opendocument.text",
            SupportedFormat::Ods => "application/vnd.oasis.opendocument.spreadsheet",
            SupportedFormat::Odp => "application/vnd.oasis.opendocument.presentation",
            SupportedFormat::Odg => "application/vnd.oasis.opendocument.graphics",
            SupportedFormat::Odf => "application/vnd.oasis.opendocument.formula",
            SupportedFormat::Pdf => "application/pdf",
            SupportedFormat::Doc => "application/msword",
            SupportedFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            SupportedFormat::Rtf => "application/rtf",
            SupportedFormat::Xls => "application/vnd.ms-excel",
            SupportedFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            SupportedFormat::Csv => "text/csv",
            SupportedFormat::Ppt => "application/vnd.ms-powerpoint",
            SupportedFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            SupportedFormat::Txt => "text/plain",
            SupportedFormat::Html | SupportedFormat::Htm => "text/html",
        }
    }

    /// Whether the conversion service lists this format as an output.
    ///
    /// Drawings, formulas and the short `.htm` spelling are accepted as
    /// uploads but never offered as targets.
    pub fn is_conversion_target(self) -> bool {
        !matches!(
            self,
            SupportedFormat::Odg | SupportedFormat::Odf | SupportedFormat::Htm
        )
    }

    /// All formats the service offers as conversion targets.
    pub fn conversion_targets() -> impl Iterator<Item = SupportedFormat> {
        Self::ALL.into_iter().filter(|f| f.is_conversion_target())
    }

    /// Look up a format by extension, ignoring ASCII case.
    ///
    /// A leading dot is tolerated (`".PDF"` → `Pdf`).
    pub fn from_extension(ext: &str) -> Option<SupportedFormat> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Format of a file name, judged by the text after its last `.`.
    pub fn from_file_name(name: &str) -> Option<SupportedFormat> {
        file_extension(name).and_then(Self::from_extension)
    }
}

/// The text after the last `.` of a file name, or `None` when there is no dot.
///
/// Only the final path component is considered, so `dir.v2/readme` has no
/// extension.
pub fn file_extension(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.rsplit_once('.').map(|(_, ext)| ext)
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported format '{0}'")]
pub struct UnknownFormat(pub String);

impl FromStr for SupportedFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
