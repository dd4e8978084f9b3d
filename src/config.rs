//! Configuration types for selection and upload.
//!
//! All tunable behaviour is controlled through [`UploadConfig`], built via
//! its [`UploadConfigBuilder`]. The same struct configures the coordinator
//! (size limit, notice lifetime) and the client (endpoint, form field names,
//! timeouts) so a CLI run and a library host see identical rules.

use crate::error::UploadError;
use crate::notice::DEFAULT_NOTICE_TTL;
use crate::selection::MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default upload endpoint of a locally running conversion service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/upload";

/// Configuration for selection and upload.
///
/// Built via [`UploadConfig::builder()`] or using [`UploadConfig::default()`].
///
/// # Example
/// ```rust
/// use docconv_upload::{Quality, UploadConfig};
///
/// let config = UploadConfig::builder()
///     .endpoint("http://converter.local:5000/upload")
///     .quality(Quality::High)
///     .timeout_secs(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.quality, Quality::High);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Form action URL the multipart POST is sent to.
    ///
    /// Sibling routes (`/check_formats`, `/download/<name>`,
    /// `/batch_download/<id>`) are resolved relative to this URL.
    pub endpoint: String,

    /// Per-file size limit in bytes. Default and maximum: 50 MiB.
    pub max_file_size: u64,

    /// Multipart field carrying each file. Default: `file`.
    pub files_field: String,

    /// Multipart field carrying the target format. Default: `targetFormat`.
    pub format_field: String,

    /// Multipart field carrying the quality setting. Default: `quality`.
    pub quality_field: String,

    /// Conversion quality requested from the service. Default: Medium.
    pub quality: Quality,

    /// Whole-request timeout in seconds. Default: 120.
    ///
    /// The service converts synchronously before answering, so this covers
    /// upload plus conversion time of the whole batch.
    pub timeout_secs: u64,

    /// How long a notice stays visible, in milliseconds. Default: 5000.
    pub notice_ttl_ms: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_file_size: MAX_FILE_SIZE,
            files_field: "file".to_string(),
            format_field: "targetFormat".to_string(),
            quality_field: "quality".to_string(),
            quality: Quality::default(),
            timeout_secs: 120,
            notice_ttl_ms: DEFAULT_NOTICE_TTL.as_millis() as u64,
            user_agent: concat!("docconv-upload/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl UploadConfig {
    /// Create a new builder for `UploadConfig`.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Builder for [`UploadConfig`].
#[derive(Debug)]
pub struct UploadConfigBuilder {
    config: UploadConfig,
}

impl UploadConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    /// Lower the per-file limit. [`build`](Self::build) refuses anything
    /// above 50 MiB.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn files_field(mut self, name: impl Into<String>) -> Self {
        self.config.files_field = name.into();
        self
    }

    pub fn format_field(mut self, name: impl Into<String>) -> Self {
        self.config.format_field = name.into();
        self
    }

    pub fn quality_field(mut self, name: impl Into<String>) -> Self {
        self.config.quality_field = name.into();
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.config.quality = quality;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn notice_ttl_ms(mut self, ms: u64) -> Self {
        self.config.notice_ttl_ms = ms;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<UploadConfig, UploadError> {
        let c = &self.config;
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(UploadError::InvalidConfig(format!(
                "endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if c.max_file_size == 0 {
            return Err(UploadError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        if c.max_file_size > MAX_FILE_SIZE {
            return Err(UploadError::InvalidConfig(format!(
                "max file size may only be lowered, {} bytes exceeds the {} byte limit",
                c.max_file_size, MAX_FILE_SIZE
            )));
        }
        for (what, name) in [
            ("files", &c.files_field),
            ("format", &c.format_field),
            ("quality", &c.quality_field),
        ] {
            if name.trim().is_empty() {
                return Err(UploadError::InvalidConfig(format!(
                    "{what} field name must not be empty"
                )));
            }
        }
        if c.timeout_secs == 0 {
            return Err(UploadError::InvalidConfig("timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Conversion quality hint forwarded to the service.
///
/// The service maps it to export-quality flags for formats that support
/// them (PDF) and ignores it elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    #[default]
    Medium,
    Low,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Quality::High),
            "medium" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            other => Err(UploadError::InvalidConfig(format!(
                "quality must be high, medium or low, got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let c = UploadConfig::default();
        assert_eq!(c.max_file_size, 50 * 1024 * 1024);
        assert_eq!(c.format_field, "targetFormat");
        assert_eq!(c.files_field, "file");
        assert_eq!(c.notice_ttl(), Duration::from_secs(5));
        assert_eq!(c.quality, Quality::Medium);
    }

    #[test]
    fn max_file_size_cannot_be_raised() {
        let err = UploadConfig::builder()
            .max_file_size(200 * 1024 * 1024)
            .build()
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidConfig(_)));

        let c = UploadConfig::builder()
            .max_file_size(MAX_FILE_SIZE)
            .build()
            .unwrap();
        assert_eq!(c.max_file_size, MAX_FILE_SIZE);

        let c = UploadConfig::builder().max_file_size(1024).build().unwrap();
        assert_eq!(c.max_file_size, 1024);
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = UploadConfig::builder()
            .endpoint("ftp://example.com/upload")
            .build()
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_blank_field_names() {
        let err = UploadConfig::builder().format_field("  ").build().unwrap_err();
        assert!(err.to_string().contains("format field"));
    }

    #[test]
    fn quality_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Quality>().unwrap(), Quality::High);
        assert_eq!(" low ".parse::<Quality>().unwrap(), Quality::Low);
        assert!("ultra".parse::<Quality>().is_err());
    }
}
