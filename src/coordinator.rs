//! The upload coordinator: selection state, validation and the submit gate.
//!
//! One [`UploadCoordinator`] exists per page session (or CLI run). It owns
//! the [`SelectionState`] exclusively; every input path (file picker, drop
//! zone, format click, submit intent) maps to one of its operations, and a
//! presentation layer reads the result through [`UploadCoordinator::view`]
//! or an injected [`SelectionObserver`].
//!
//! ```text
//!            accept_candidates / select_format
//!   Empty ──────────────────────────────────▶ PartiallySelected
//!     ▲                                          │      ▲
//!     │ clear (no format)            select_format│      │ clear
//!     │                    accept_candidates     ▼      │
//!     └──────────────────────────────────────── Ready ──┘
//!                                                │  ▲
//!                              begin_submission  ▼  │ finish_submission
//!                                            Submitting
//! ```
//!
//! Nothing here blocks or spawns; the only asynchronous step (the upload
//! itself) lives in [`crate::client`] and starts after the gate has passed.

use crate::config::{Quality, UploadConfig};
use crate::error::{PartialAcceptance, ValidationError};
use crate::format::SupportedFormat;
use crate::notice::{Notice, NoticeBoard};
use crate::observer::{NoopObserver, SharedObserver};
use crate::selection::{FileRef, Rejection, SelectionMode, SelectionState, MAX_FILE_SIZE};
use crate::view::SelectionView;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Coarse lifecycle position of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No files and no format.
    #[default]
    Empty,
    /// Files or format chosen, but not both.
    PartiallySelected,
    /// Files and format chosen; submit is enabled.
    Ready,
    /// The gate has passed and the upload is in flight.
    Submitting,
}

/// Result of a successful [`UploadCoordinator::accept_candidates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    pub mode: SelectionMode,
    pub accepted: usize,
    pub submitted: usize,
    /// Present when some candidates were dropped.
    pub partial: Option<PartialAcceptance>,
}

/// Owned snapshot handed to the submission boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub mode: SelectionMode,
    pub files: Vec<FileRef>,
    pub target_format: SupportedFormat,
    pub quality: Quality,
}

impl Submission {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

/// Owns the selection and decides what may be submitted.
pub struct UploadCoordinator {
    state: SelectionState,
    submitting: bool,
    max_file_size: u64,
    quality: Quality,
    notices: NoticeBoard,
    observer: SharedObserver,
}

impl std::fmt::Debug for UploadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("state", &self.state)
            .field("submitting", &self.submitting)
            .field("max_file_size", &self.max_file_size)
            .field("quality", &self.quality)
            .field("observer", &"<dyn SelectionObserver>")
            .finish()
    }
}

impl UploadCoordinator {
    /// Create an empty coordinator using the limits from `config`.
    ///
    /// The size limit never exceeds [`MAX_FILE_SIZE`], whatever the config
    /// says.
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            state: SelectionState::default(),
            submitting: false,
            max_file_size: config.max_file_size.min(MAX_FILE_SIZE),
            quality: config.quality,
            notices: NoticeBoard::new(config.notice_ttl()),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach the observer that renders state changes and notices.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        if self.submitting {
            Phase::Submitting
        } else if self.can_submit() {
            Phase::Ready
        } else if self.state.is_empty() {
            Phase::Empty
        } else {
            Phase::PartiallySelected
        }
    }

    pub fn view(&self) -> SelectionView {
        SelectionView::project(&self.state, self.phase())
    }

    /// True iff at least one file is selected and a target format is set.
    pub fn can_submit(&self) -> bool {
        self.state.has_files() && self.state.has_format()
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    // ── Selection events ─────────────────────────────────────────────────

    /// Validate candidates from a picker or drop event and replace the file
    /// selection with those that pass.
    ///
    /// A candidate passes when its extension is on the allow-list
    /// (case-insensitive) and its size does not exceed the configured limit.
    /// When none pass, the previous selection is kept and
    /// [`ValidationError::NoValidFiles`] is returned. When only some pass, the
    /// accepted subset is kept and a [`PartialAcceptance`] is reported.
    ///
    /// An empty candidate list (a picker closed without choosing) changes
    /// nothing.
    pub fn accept_candidates(
        &mut self,
        raw_files: impl IntoIterator<Item = FileRef>,
    ) -> Result<Acceptance, ValidationError> {
        self.ensure_idle()?;

        let candidates: Vec<FileRef> = raw_files.into_iter().collect();
        let submitted = candidates.len();
        if submitted == 0 {
            debug!("Empty candidate list ignored");
            return Ok(Acceptance {
                mode: self.state.mode,
                accepted: 0,
                submitted: 0,
                partial: None,
            });
        }

        let mut accepted = Vec::with_capacity(submitted);
        let mut rejections = Vec::new();
        for file in candidates {
            match file.check(self.max_file_size) {
                Ok(_) => accepted.push(file),
                Err(reason) => {
                    debug!("Rejected candidate '{}': {:?}", file.name, reason);
                    rejections.push(Rejection {
                        name: file.name,
                        reason,
                    });
                }
            }
        }

        if accepted.is_empty() {
            warn!("All {} candidate(s) rejected", submitted);
            return Err(self.reject(ValidationError::NoValidFiles {
                submitted,
                rejections,
            }));
        }

        let count = accepted.len();
        let mode = SelectionMode::for_count(count);
        self.state.files = accepted;
        self.state.mode = mode;
        info!("Accepted {}/{} file(s) in {:?} mode", count, submitted, mode);

        let partial = (!rejections.is_empty()).then(|| PartialAcceptance {
            accepted: count,
            submitted,
            rejections,
        });
        if let Some(ref p) = partial {
            self.post(Notice::for_partial(p, Instant::now()));
        }
        self.notify_changed();

        Ok(Acceptance {
            mode,
            accepted: count,
            submitted,
            partial,
        })
    }

    /// Record the chosen target format. Selecting the same format again is a
    /// no-op apart from re-rendering.
    pub fn select_format(
        &mut self,
        format: SupportedFormat,
    ) -> Result<&SelectionState, ValidationError> {
        self.ensure_idle()?;
        if self.state.target_format != Some(format) {
            debug!("Target format set to {}", format);
        }
        self.state.target_format = Some(format);
        self.notify_changed();
        Ok(&self.state)
    }

    /// Drop the file selection. The chosen target format is kept.
    pub fn clear(&mut self) -> Result<&SelectionState, ValidationError> {
        self.ensure_idle()?;
        self.state.files.clear();
        self.state.mode = SelectionMode::Single;
        debug!("Selection cleared");
        self.notify_changed();
        Ok(&self.state)
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    // ── Submission gate ──────────────────────────────────────────────────

    /// Final check before hand-off. State is never modified; a failure
    /// raises a notice.
    ///
    /// Single mode refuses a file whose extension already equals the target
    /// format. Batch mode skips that check because sources may be mixed.
    pub fn validate_submission(&mut self) -> Result<(), ValidationError> {
        self.check_submission().map_err(|e| self.reject(e))
    }

    /// Validate, lock the selection and return what should be uploaded.
    ///
    /// Until [`finish_submission`](Self::finish_submission) is called every
    /// mutating operation fails with [`ValidationError::SubmissionInProgress`].
    pub fn begin_submission(&mut self) -> Result<Submission, ValidationError> {
        self.validate_submission()?;
        let target_format = self
            .state
            .target_format
            .ok_or(ValidationError::MissingSelection {
                has_files: self.state.has_files(),
                has_format: false,
            })?;

        let submission = Submission {
            mode: self.state.mode,
            files: self.state.files.clone(),
            target_format,
            quality: self.quality,
        };
        self.submitting = true;
        info!(
            "Submitting {} file(s) for conversion to {}",
            submission.files.len(),
            target_format
        );
        self.notify_changed();
        self.observer.on_submission_started(&submission);
        Ok(submission)
    }

    /// Unlock after the submission boundary has answered.
    pub fn finish_submission(&mut self) {
        if self.submitting {
            self.submitting = false;
            self.notify_changed();
        }
    }

    // ── Notices ──────────────────────────────────────────────────────────

    pub fn active_notice(&self, now: Instant) -> Option<&Notice> {
        self.notices.active(now)
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.dismiss()
    }

    /// Remove the notice if its time is up. Returns true when one was removed.
    pub fn expire_notices(&mut self, now: Instant) -> bool {
        self.notices.expire(now)
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn check_submission(&self) -> Result<(), ValidationError> {
        if self.submitting {
            return Err(ValidationError::SubmissionInProgress);
        }
        let format = match (&self.state.files[..], self.state.target_format) {
            ([], format) => {
                return Err(ValidationError::MissingSelection {
                    has_files: false,
                    has_format: format.is_some(),
                })
            }
            (_, None) => {
                return Err(ValidationError::MissingSelection {
                    has_files: true,
                    has_format: false,
                })
            }
            (_, Some(format)) => format,
        };

        if self.state.mode == SelectionMode::Single {
            let source = &self.state.files[0];
            let same = source
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));
            if same {
                return Err(ValidationError::SameFormat { format });
            }
        }
        Ok(())
    }

    fn ensure_idle(&mut self) -> Result<(), ValidationError> {
        if self.submitting {
            Err(self.reject(ValidationError::SubmissionInProgress))
        } else {
            Ok(())
        }
    }

    /// Surface `err` as a notice and hand it back for returning.
    fn reject(&mut self, err: ValidationError) -> ValidationError {
        self.post(Notice::for_validation(&err, Instant::now()));
        err
    }

    fn post(&mut self, notice: Notice) {
        let notice = self.notices.post(notice);
        self.observer.on_notice(notice);
    }

    fn notify_changed(&self) {
        self.observer.on_selection_changed(&self.view());
    }
}
