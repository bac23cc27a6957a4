//! The user-facing surface the controller drives.
//!
//! [`ConverterView`] is the seam between the controller and whatever shows
//! its state: a DOM, a TUI, a progress bar, or nothing at all. Every method
//! has a no-op default so a view only overrides what it can display.
//!
//! [`HeadlessView`] records everything it is told. It is the view model used
//! by tests and by embedders that render the state themselves.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2img::{ConverterView, HeadlessView, StatusLine};
//!
//! let mut view = HeadlessView::default();
//! view.show_status(&StatusLine::strong("Ready"));
//! assert_eq!(view.status.text, "Ready");
//! assert!(view.preview.is_placeholder());
//! ```

use crate::preview::{PreviewArea, PreviewCard};
use crate::state::{ConversionState, StatusLine};

/// Label of the convert action while idle.
pub const CONVERT_LABEL: &str = "Convert to images";
/// Label of the convert action while a run is in flight.
pub const CONVERTING_LABEL: &str = "Converting…";
/// Browse label before a PDF is held.
pub const CHOOSE_LABEL: &str = "Choose PDF";
/// Browse label once a PDF is held.
pub const REPLACE_LABEL: &str = "Replace PDF";

/// Receives every UI update from the controller.
///
/// Calls always arrive from the task driving the controller, one at a time
/// and in order; implementations need `Send` only so the controller can be
/// moved into a spawned task.
pub trait ConverterView: Send {
    /// Called on every state transition, before the matching status line.
    fn on_state(&mut self, state: &ConversionState) {
        let _ = state;
    }

    /// Replace the status text.
    fn show_status(&mut self, status: &StatusLine) {
        let _ = status;
    }

    /// Replace the file info line (`"report.pdf · 1.2 MB"`, `"No file selected"`, …).
    fn show_file_info(&mut self, text: &str) {
        let _ = text;
    }

    /// Replace the browse button label.
    fn set_browse_label(&mut self, label: &str) {
        let _ = label;
    }

    /// Enable/disable the convert action and set its label.
    fn set_convert_action(&mut self, enabled: bool, label: &str) {
        let _ = (enabled, label);
    }

    /// Enable/disable the download-all action.
    fn set_download_all_enabled(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// Replace the page counter text (`"3 pages found"`, `"3 pages rendered"`, …).
    fn show_pages_count(&mut self, text: &str) {
        let _ = text;
    }

    /// Remove every card without showing the placeholder (a run just started).
    fn clear_preview(&mut self) {}

    /// Remove every card and show the empty placeholder.
    fn reset_preview(&mut self) {}

    /// Append a card for a freshly rendered page.
    fn append_preview(&mut self, card: &PreviewCard) {
        let _ = card;
    }
}

impl<V: ConverterView + ?Sized> ConverterView for Box<V> {
    fn on_state(&mut self, state: &ConversionState) {
        (**self).on_state(state)
    }
    fn show_status(&mut self, status: &StatusLine) {
        (**self).show_status(status)
    }
    fn show_file_info(&mut self, text: &str) {
        (**self).show_file_info(text)
    }
    fn set_browse_label(&mut self, label: &str) {
        (**self).set_browse_label(label)
    }
    fn set_convert_action(&mut self, enabled: bool, label: &str) {
        (**self).set_convert_action(enabled, label)
    }
    fn set_download_all_enabled(&mut self, enabled: bool) {
        (**self).set_download_all_enabled(enabled)
    }
    fn show_pages_count(&mut self, text: &str) {
        (**self).show_pages_count(text)
    }
    fn clear_preview(&mut self) {
        (**self).clear_preview()
    }
    fn reset_preview(&mut self) {
        (**self).reset_preview()
    }
    fn append_preview(&mut self, card: &PreviewCard) {
        (**self).append_preview(card)
    }
}

/// A view that discards every update.
pub struct NoopView;

impl ConverterView for NoopView {}

/// A view model that keeps the latest value of every UI element.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessView {
    pub state: ConversionState,
    pub status: StatusLine,
    pub file_info: String,
    pub browse_label: String,
    pub convert_enabled: bool,
    pub convert_label: String,
    pub download_all_enabled: bool,
    pub pages_count: String,
    pub preview: PreviewArea,
    /// Every state the view was shown, in order.
    pub history: Vec<ConversionState>,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self {
            state: ConversionState::Idle,
            status: ConversionState::Idle.status(),
            file_info: "No file selected".to_string(),
            browse_label: CHOOSE_LABEL.to_string(),
            convert_enabled: false,
            convert_label: CONVERT_LABEL.to_string(),
            download_all_enabled: false,
            pages_count: "0 pages rendered".to_string(),
            preview: PreviewArea::Placeholder,
            history: Vec::new(),
        }
    }
}

impl ConverterView for HeadlessView {
    fn on_state(&mut self, state: &ConversionState) {
        self.state = *state;
        self.history.push(*state);
    }

    fn show_status(&mut self, status: &StatusLine) {
        self.status = status.clone();
    }

    fn show_file_info(&mut self, text: &str) {
        self.file_info = text.to_string();
    }

    fn set_browse_label(&mut self, label: &str) {
        self.browse_label = label.to_string();
    }

    fn set_convert_action(&mut self, enabled: bool, label: &str) {
        self.convert_enabled = enabled;
        self.convert_label = label.to_string();
    }

    fn set_download_all_enabled(&mut self, enabled: bool) {
        self.download_all_enabled = enabled;
    }

    fn show_pages_count(&mut self, text: &str) {
        self.pages_count = text.to_string();
    }

    fn clear_preview(&mut self) {
        self.preview = PreviewArea::Cards(Vec::new());
    }

    fn reset_preview(&mut self) {
        self.preview = PreviewArea::Placeholder;
    }

    fn append_preview(&mut self, card: &PreviewCard) {
        self.preview.push(card.clone());
    }
}
