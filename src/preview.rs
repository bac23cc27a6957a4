//! Preview grid model: one card per rendered page, or an empty placeholder.

use crate::output::{DataUrl, RenderedPage};
use serde::{Deserialize, Serialize};

/// Text shown in the preview area before anything has been rendered.
pub const EMPTY_PREVIEW_MESSAGE: &str = "Your converted pages will appear here as PNG previews.\n\
After conversion you can download each page individually or save everything as a ZIP.";

/// A thumbnail card for one rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewCard {
    /// 1-based page index.
    pub page: usize,
    /// Caption, e.g. `"Page 3"`. Also used as the thumbnail's alt text.
    pub label: String,
    /// Format tag shown next to the caption.
    pub tag: String,
    /// Self-contained image source for the thumbnail and the download link.
    pub image: DataUrl,
    /// File name offered by the per-page download link.
    pub download_name: String,
}

impl PreviewCard {
    pub fn for_page(page: &RenderedPage) -> Self {
        Self {
            page: page.page,
            label: format!("Page {}", page.page),
            tag: "PNG".to_string(),
            image: page.image.clone(),
            download_name: page.file_name(),
        }
    }
}

/// The contents of the preview area.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreviewArea {
    /// Showing [`EMPTY_PREVIEW_MESSAGE`].
    #[default]
    Placeholder,
    /// Showing zero or more cards in page order. Empty while a run has just
    /// started and no page has finished yet.
    Cards(Vec<PreviewCard>),
}

impl PreviewArea {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// The placeholder message, if the placeholder is showing.
    pub fn placeholder_text(&self) -> Option<&'static str> {
        self.is_placeholder().then_some(EMPTY_PREVIEW_MESSAGE)
    }

    pub fn cards(&self) -> &[PreviewCard] {
        match self {
            Self::Placeholder => &[],
            Self::Cards(cards) => cards,
        }
    }

    /// Append a card, replacing the placeholder if it is showing.
    pub fn push(&mut self, card: PreviewCard) {
        match self {
            Self::Placeholder => *self = Self::Cards(vec![card]),
            Self::Cards(cards) => cards.push(card),
        }
    }
}
