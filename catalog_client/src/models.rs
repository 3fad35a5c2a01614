use serde::{Deserialize, Serialize};

/// Kind of a gallery media item as reported by the store API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub media_type: MediaKind,
    pub url: String,
}

impl MediaItem {
    pub fn is_video(&self) -> bool {
        self.media_type == MediaKind::Video
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A purchasable variant. The slug is the external key of a product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Vec<String>,
    #[serde(default)]
    pub images: Vec<MediaItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_graph_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Category id when the product carries a usable (non-blank) one.
    pub fn category_id(&self) -> Option<&str> {
        self.category
            .as_ref()
            .map(|c| c.id.as_str())
            .filter(|id| !id.trim().is_empty())
    }

    pub fn first_variant_slug(&self) -> Option<&str> {
        self.variants
            .first()
            .map(|v| v.slug.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Response of the by-slug product lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    #[serde(default)]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub all_variants: Vec<Variant>,
}

impl ProductDetail {
    /// The variant a page for `slug` should show.
    ///
    /// Prefers the variant the API selected, as long as it really carries the
    /// requested slug, and otherwise searches the full variant list.
    pub fn variant_for_slug(&self, slug: &str) -> Option<&Variant> {
        self.variant
            .as_ref()
            .filter(|v| v.slug == slug)
            .or_else(|| self.all_variants.iter().find(|v| v.slug == slug))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total_count: u64,
}

/// Filters for the admin-scoped product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: Option<String>,
    pub limit: Option<u32>,
    pub select_fields: Vec<String>,
}

impl ProductQuery {
    pub fn limited(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn in_category(category_id: impl Into<String>, limit: u32) -> Self {
        Self {
            category_id: Some(category_id.into()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Query-string pairs; blank values are left out.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut qs = Vec::with_capacity(3);
        if let Some(cat) = self.category_id.as_deref().filter(|c| !c.trim().is_empty()) {
            qs.push(("categoryId", cat.to_string()));
        }
        if let Some(limit) = self.limit {
            qs.push(("limit", limit.to_string()));
        }
        if !self.select_fields.is_empty() {
            qs.push(("selectFields", self.select_fields.join(",")));
        }
        qs
    }
}

/// A group of serviceable pin codes sharing a delivery promise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGroup {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub pin_codes: Vec<String>,
    /// Estimated delivery time in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<u32>,
    #[serde(default)]
    pub is_cod_available: bool,
}

impl LocationGroup {
    pub fn serves(&self, pin_code: &str) -> bool {
        self.pin_codes.iter().any(|p| p.trim() == pin_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub location: String,
    pub estimated_delivery: Option<u32>,
    pub is_cod_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageCategory {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}
