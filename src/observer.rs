//! Observer trait for selection and notice events.
//!
//! Inject an [`Arc<dyn SelectionObserver>`] via
//! [`crate::coordinator::UploadCoordinator::with_observer`] to re-render
//! whenever the selection changes. The coordinator computes state; the
//! observer only draws it.
//!
//! # Example
//!
//! ```rust
//! use docconv_upload::{FileRef, SelectionObserver, SelectionView, UploadConfig, UploadCoordinator};
//! use std::sync::{Arc, Mutex};
//!
//! struct LabelRecorder {
//!     labels: Mutex<Vec<String>>,
//! }
//!
//! impl SelectionObserver for LabelRecorder {
//!     fn on_selection_changed(&self, view: &SelectionView) {
//!         self.labels.lock().unwrap().push(view.submit_label.clone());
//!     }
//! }
//!
//! let recorder = Arc::new(LabelRecorder { labels: Mutex::new(Vec::new()) });
//! let mut coordinator = UploadCoordinator::new(&UploadConfig::default())
//!     .with_observer(recorder.clone());
//! coordinator.accept_candidates(vec![FileRef::new("report.docx", 2_000_000)]).unwrap();
//! assert_eq!(recorder.labels.lock().unwrap().as_slice(), ["Convert Document"]);
//! ```

use crate::coordinator::Submission;
use crate::notice::Notice;
use crate::view::SelectionView;
use std::sync::Arc;

/// Receives coordinator events.
///
/// All methods have default no-op implementations so implementors only
/// override what they render. The trait is `Send + Sync` so a host may
/// forward events to another thread.
pub trait SelectionObserver: Send + Sync {
    /// Called after every state change with the fresh projection.
    fn on_selection_changed(&self, view: &SelectionView) {
        let _ = view;
    }

    /// Called whenever a notice is raised.
    fn on_notice(&self, notice: &Notice) {
        let _ = notice;
    }

    /// Called once the submission gate has passed, before hand-off.
    fn on_submission_started(&self, submission: &Submission) {
        let _ = submission;
    }
}

/// Observer that ignores every event. The coordinator starts with one until
/// [`crate::coordinator::UploadCoordinator::with_observer`] replaces it.
pub struct NoopObserver;

impl SelectionObserver for NoopObserver {}

/// Convenience alias for the type stored in the coordinator.
pub type SharedObserver = Arc<dyn SelectionObserver>;
