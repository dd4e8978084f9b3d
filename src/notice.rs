//! Transient, dismissible user notices.
//!
//! Only one notice is shown at a time: raising a new one replaces whatever
//! was there. Each notice expires after a fixed interval. Time is passed in
//! explicitly so hosts can drive expiry from their own clock and tests stay
//! deterministic.

use crate::error::{PartialAcceptance, ValidationError};
use crate::selection::RejectReason;
use crate::view::format_file_size;
use serde::Serialize;
use std::time::{Duration, Instant};

/// How long a notice stays visible unless dismissed earlier.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Danger,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.raised_at) >= ttl
    }

    /// The notice shown when the coordinator rejects something.
    pub fn for_validation(err: &ValidationError, now: Instant) -> Self {
        let (level, message) = match err {
            ValidationError::NoValidFiles {
                submitted,
                rejections,
            } => {
                let message = match (submitted, rejections.as_slice()) {
                    (1, [only]) => match only.reason {
                        RejectReason::UnsupportedExtension { .. } => {
                            "Invalid file type. Please select a supported document format."
                                .to_string()
                        }
                        RejectReason::TooLarge { limit, .. } => format!(
                            "File size too large. Please select a file smaller than {}.",
                            limit_text(limit)
                        ),
                    },
                    _ => "No valid files found. Please check file types and sizes.".to_string(),
                };
                (NoticeLevel::Danger, message)
            }
            ValidationError::SameFormat { .. } => (
                NoticeLevel::Warning,
                "Source and target formats are the same. Please choose a different output format."
                    .to_string(),
            ),
            ValidationError::MissingSelection { .. } => (
                NoticeLevel::Danger,
                "Please select files and target format.".to_string(),
            ),
            ValidationError::SubmissionInProgress => (
                NoticeLevel::Info,
                "Conversion already in progress. Please wait.".to_string(),
            ),
        };
        Self {
            level,
            message,
            raised_at: now,
        }
    }

    pub fn for_partial(partial: &PartialAcceptance, now: Instant) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: partial.to_string(),
            raised_at: now,
        }
    }
}

/// Whole mebibyte limits read `50MB`; anything else goes through
/// [`format_file_size`].
fn limit_text(limit: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format_file_size(limit)
    }
}

/// Holds the currently visible notice.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Show `notice`, replacing any notice already on the board.
    pub fn post(&mut self, notice: Notice) -> &Notice {
        self.current.insert(notice)
    }

    /// The visible notice at `now`, if it has not expired.
    pub fn active(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| !n.is_expired(now, self.ttl))
    }

    /// Drop the notice if it has expired. Returns true when one was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|n| n.is_expired(now, self.ttl));
        if expired {
            self.current = None;
        }
        expired
    }

    /// Close the notice regardless of its age.
    pub fn dismiss(&mut self) -> Option<Notice> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{Rejection, MAX_FILE_SIZE};

    fn rejection(name: &str, reason: RejectReason) -> Rejection {
        Rejection {
            name: name.into(),
            reason,
        }
    }

    #[test]
    fn single_bad_extension_message() {
        let err = ValidationError::NoValidFiles {
            submitted: 1,
            rejections: vec![rejection(
                "a.exe",
                RejectReason::UnsupportedExtension {
                    extension: Some("exe".into()),
                },
            )],
        };
        let n = Notice::for_validation(&err, Instant::now());
        assert_eq!(n.level, NoticeLevel::Danger);
        assert!(n.message.starts_with("Invalid file type"));
    }

    #[test]
    fn single_oversized_message_mentions_limit() {
        let err = ValidationError::NoValidFiles {
            submitted: 1,
            rejections: vec![rejection(
                "a.pdf",
                RejectReason::TooLarge {
                    size_bytes: 60 * 1024 * 1024,
                    limit: MAX_FILE_SIZE,
                },
            )],
        };
        let n = Notice::for_validation(&err, Instant::now());
        assert_eq!(
            n.message,
            "File size too large. Please select a file smaller than 50MB."
        );
    }

    #[test]
    fn sub_megabyte_limit_is_not_rounded_to_zero() {
        let err = ValidationError::NoValidFiles {
            submitted: 1,
            rejections: vec![rejection(
                "a.pdf",
                RejectReason::TooLarge {
                    size_bytes: 600 * 1024,
                    limit: 512 * 1024,
                },
            )],
        };
        let n = Notice::for_validation(&err, Instant::now());
        assert_eq!(
            n.message,
            "File size too large. Please select a file smaller than 512 KB."
        );
    }

    #[test]
    fn several_invalid_files_use_generic_message() {
        let reason = RejectReason::UnsupportedExtension { extension: None };
        let err = ValidationError::NoValidFiles {
            submitted: 2,
            rejections: vec![rejection("a", reason.clone()), rejection("b", reason)],
        };
        let n = Notice::for_validation(&err, Instant::now());
        assert_eq!(
            n.message,
            "No valid files found. Please check file types and sizes."
        );
    }

    #[test]
    fn notice_expires_after_ttl() {
        let start = Instant::now();
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        board.post(Notice {
            level: NoticeLevel::Warning,
            message: "hi".into(),
            raised_at: start,
        });

        assert!(board.active(start + Duration::from_millis(4_999)).is_some());
        assert!(board.active(start + Duration::from_secs(5)).is_none());
        assert!(!board.expire(start + Duration::from_secs(1)));
        assert!(board.expire(start + Duration::from_secs(6)));
        assert!(board.dismiss().is_none());
    }

    #[test]
    fn newer_notice_replaces_older() {
        let now = Instant::now();
        let mut board = NoticeBoard::default();
        board.post(Notice {
            level: NoticeLevel::Danger,
            message: "first".into(),
            raised_at: now,
        });
        board.post(Notice {
            level: NoticeLevel::Info,
            message: "second".into(),
            raised_at: now,
        });
        assert_eq!(board.active(now).map(|n| n.message.as_str()), Some("second"));
        assert_eq!(board.dismiss().map(|n| n.message), Some("second".to_string()));
        assert!(board.active(now).is_none());
    }
}
