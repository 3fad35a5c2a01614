//! Search-engine and social metadata for product pages.

use catalog_client::{Catalog, Variant};
use serde::Serialize;
use tracing::warn;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder-image.jpg";
pub const NOT_FOUND_TITLE: &str = "Product Not Found";
pub const NOT_FOUND_DESCRIPTION: &str = "The requested product is not available.";

const PREVIEW_WIDTH: u32 = 900;
const PREVIEW_HEIGHT: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl PreviewImage {
    fn sized(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: PREVIEW_WIDTH,
            height: PREVIEW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenGraph {
    pub images: Vec<PreviewImage>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<PreviewImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_graph: Option<OpenGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PageMetadata {
    /// Preview image chosen for the page, if the metadata carries one.
    pub fn preview_image(&self) -> Option<&str> {
        self.open_graph
            .as_ref()
            .and_then(|og| og.images.first())
            .map(|img| img.url.as_str())
    }

    /// Appends images inherited from an enclosing layout after the page's own preview.
    pub fn with_parent_images<I>(mut self, parent: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(og) = self.open_graph.as_mut() {
            og.images.extend(parent.into_iter().map(PreviewImage::sized));
        }
        self
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Derives page metadata from a variant. Pure; the same variant always yields the same value.
pub fn derive(variant: &Variant) -> PageMetadata {
    let title = non_blank(variant.meta_title.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Buy {}", variant.name));
    let description = non_blank(variant.meta_description.as_ref())
        .or_else(|| Some(variant.description.as_str()).filter(|d| !d.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| title.clone());
    let keywords = variant.meta_keywords.clone();
    let image = non_blank(variant.open_graph_image.as_ref())
        .or_else(|| variant.images.first().map(|m| m.url.as_str()))
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string();

    PageMetadata {
        open_graph: Some(OpenGraph {
            images: vec![PreviewImage::sized(image.clone())],
            kind: "website".into(),
        }),
        twitter: Some(TwitterCard {
            card: "summary_large_image".into(),
            title: title.clone(),
            description: description.clone(),
            images: vec![PreviewImage::sized(image)],
        }),
        category: Some("ecommerce".into()),
        title,
        description,
        keywords,
    }
}

pub fn not_found() -> PageMetadata {
    PageMetadata {
        title: NOT_FOUND_TITLE.into(),
        description: NOT_FOUND_DESCRIPTION.into(),
        keywords: Vec::new(),
        open_graph: None,
        twitter: None,
        category: None,
    }
}

/// Fetches the product behind `slug` and derives its metadata.
///
/// Missing products, missing variants and store failures all produce [`not_found`].
pub async fn for_slug(catalog: &dyn Catalog, slug: &str) -> PageMetadata {
    match catalog.product_by_slug(slug).await {
        Ok(detail) => match detail.variant_for_slug(slug) {
            Some(variant) => derive(variant),
            None => not_found(),
        },
        Err(err) if err.is_not_found() => not_found(),
        Err(err) => {
            warn!(slug, error = %err, "metadata: product lookup failed");
            not_found()
        }
    }
}
