//! Presentation state for the product media gallery.
//!
//! The gallery is shown on two surfaces: a tab strip (desktop) keyed by media
//! id and a swipeable carousel (mobile) keyed by position. Each surface keeps
//! its own notion of the current item; selecting on one never moves the other.

use catalog_client::{MediaItem, MediaKind};
use serde::Serialize;

use crate::metadata::PLACEHOLDER_IMAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Loading {
    Eager,
    Lazy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub kind: MediaKind,
    pub url: String,
    pub loading: Loading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GalleryView {
    /// No media: a single static image, no tabs, no carousel controls.
    Placeholder { src: String },
    #[serde(rename_all = "camelCase")]
    Media {
        slides: Vec<Slide>,
        active_tab: String,
        active_index: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    items: Vec<MediaItem>,
    active_tab: String,
    active_index: usize,
}

impl GalleryState {
    pub fn new(items: Vec<MediaItem>) -> Self {
        let mut state = Self::default();
        state.replace(items);
        state
    }

    /// Points the gallery at a (possibly) new media sequence.
    ///
    /// A different sequence resets both selections to the first item; handing
    /// back the sequence already shown keeps the current selections. Returns
    /// whether a reset happened.
    pub fn sync(&mut self, items: Vec<MediaItem>) -> bool {
        if items == self.items {
            return false;
        }
        self.replace(items);
        true
    }

    fn replace(&mut self, items: Vec<MediaItem>) {
        self.active_tab = items.first().map(|m| m.id.clone()).unwrap_or_default();
        self.active_index = 0;
        self.items = items;
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active_tab(&self) -> &str {
        &self.active_tab
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Selects a tab by media id. Unknown ids are ignored.
    pub fn select_tab(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|m| m.id == id) {
            return false;
        }
        self.active_tab = id.to_string();
        true
    }

    /// Moves the carousel to `index`. Out-of-range positions are ignored.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.active_index = index;
        true
    }

    /// Advances the carousel, wrapping past the last item.
    pub fn next(&mut self) -> usize {
        if !self.items.is_empty() {
            self.active_index = (self.active_index + 1) % self.items.len();
        }
        self.active_index
    }

    /// Steps the carousel back, wrapping before the first item.
    pub fn previous(&mut self) -> usize {
        if !self.items.is_empty() {
            let len = self.items.len();
            self.active_index = (self.active_index + len - 1) % len;
        }
        self.active_index
    }

    pub fn view(&self) -> GalleryView {
        if self.items.is_empty() {
            return GalleryView::Placeholder {
                src: PLACEHOLDER_IMAGE.to_string(),
            };
        }
        let slides = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, m)| Slide {
                id: m.id.clone(),
                kind: m.media_type,
                url: m.url.clone(),
                loading: if idx == 0 { Loading::Eager } else { Loading::Lazy },
            })
            .collect();
        GalleryView::Media {
            slides,
            active_tab: self.active_tab.clone(),
            active_index: self.active_index,
        }
    }
}
