//! The conversion lifecycle as an explicit state machine.
//!
//! ```text
//!            select(pdf)                 read ok        count N
//!   Idle ───────────────▶ Ready ──▶ Loading ──────▶ Parsing ──────▶ Rendering{1,N} ─┐
//!    ▲  select(other)       ▲          │               │                 │  ▲        │
//!    │        │             │          ▼               ▼                 ▼  └────────┘
//!    │        ▼             │     Failed(Read)   Failed(Conversion)   Done{N} / Failed / Cancelled
//!    └── Failed(InvalidFileType)  (clear/select are accepted from every idle state)
//! ```
//!
//! The controller is the only writer. Every transition goes through
//! [`ConversionState::can_transition_to`], so an impossible UI combination
//! (e.g. "Converting…" label while Done) cannot be reached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a run ended in [`ConversionState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The selected file's declared type was not PDF.
    InvalidFileType,
    /// The payload could not be read.
    ReadFailure,
    /// Parsing or rendering failed.
    ConversionFailure,
}

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConversionState {
    /// No source held.
    #[default]
    Idle,
    /// A PDF is selected and nothing is running.
    Ready,
    /// Reading the source payload.
    Loading,
    /// Handing the payload to the renderer.
    Parsing,
    /// Rasterising `page` of `total` (1-based).
    Rendering { page: usize, total: usize },
    /// All pages rendered.
    Done { pages: usize },
    /// The last operation failed.
    Failed(FailureKind),
    /// The last run was cancelled.
    Cancelled,
}

impl ConversionState {
    /// `true` while a conversion run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Parsing | Self::Rendering { .. }
        )
    }

    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(&self, next: &ConversionState) -> bool {
        use ConversionState::*;
        match (self, next) {
            // Selection changes are accepted whenever no run is in flight.
            (from, Idle | Ready | Failed(FailureKind::InvalidFileType)) => !from.is_busy(),
            (from, Loading) => !from.is_busy() && *from != Idle,
            (Loading, Parsing) => true,
            (Loading, Failed(FailureKind::ReadFailure)) => true,
            (Parsing, Rendering { page: 1, .. }) => true,
            (Parsing, Done { pages: 0 }) => true,
            (Rendering { page, total }, Rendering { page: p, total: t }) => {
                *p == page + 1 && t == total && p <= t
            }
            (Rendering { page, total }, Done { pages }) => page == total && pages == total,
            (Parsing | Rendering { .. }, Failed(FailureKind::ConversionFailure)) => true,
            (Loading | Parsing | Rendering { .. }, Cancelled) => true,
            _ => false,
        }
    }

    /// The status line this state shows on entry.
    pub fn status(&self) -> StatusLine {
        match self {
            Self::Idle => StatusLine::normal("Waiting for a PDF…"),
            Self::Ready => StatusLine::strong("Ready to convert. Tap the button when you’re set."),
            Self::Loading => StatusLine::normal("Reading PDF…"),
            Self::Parsing => StatusLine::normal("Parsing PDF…"),
            Self::Rendering { page, total } => {
                StatusLine::normal(format!("Rendering page {} of {}…", page, total))
            }
            Self::Done { pages } => {
                StatusLine::strong(format!("Done. Converted {}.", pages_label(*pages)))
            }
            Self::Failed(FailureKind::InvalidFileType) => {
                StatusLine::strong("Please select a valid PDF file.")
            }
            Self::Failed(FailureKind::ReadFailure) => {
                StatusLine::strong("Could not read that file. Please try again.")
            }
            Self::Failed(FailureKind::ConversionFailure) => {
                StatusLine::strong("Something broke while reading the PDF. Try another file.")
            }
            Self::Cancelled => StatusLine::strong("Conversion cancelled."),
        }
    }
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Ready => write!(f, "ready"),
            Self::Loading => write!(f, "loading"),
            Self::Parsing => write!(f, "parsing"),
            Self::Rendering { page, total } => write!(f, "rendering {}/{}", page, total),
            Self::Done { pages } => write!(f, "done ({})", pages_label(*pages)),
            Self::Failed(kind) => write!(f, "failed ({:?})", kind),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A line of status text plus its emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub text: String,
    /// Rendered emphasised (the `status-strong` style).
    pub strong: bool,
}

impl StatusLine {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: false,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: true,
        }
    }
}

/// `"1 page"`, `"3 pages"`, `"0 pages"`.
pub fn pages_label(n: usize) -> String {
    if n == 1 {
        "1 page".to_string()
    } else {
        format!("{} pages", n)
    }
}
