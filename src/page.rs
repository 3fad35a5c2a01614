//! Product page data aggregation.
//!
//! One page load fans out three independent reads (the product itself, a
//! generic product listing and the location groups), validates the product,
//! then issues a single category-scoped listing for the related products.
//! Secondary sources degrade to empty values; anything wrong with the product
//! itself, or any unexpected failure, ends the load as "not found".

use std::sync::Arc;
use std::time::Duration;

use catalog_client::{
    Catalog, DeliveryInfo, LocationGroup, Product, ProductDetail, ProductListing, ProductQuery,
    StoreError, Variant,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct PageSettings {
    /// Cap for the generic and category-scoped listings.
    pub related_limit: u32,
    /// Upper bound for a whole page load.
    pub deadline: Duration,
    pub static_params_limit: u32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            related_limit: 10,
            deadline: Duration::from_secs(15),
            static_params_limit: 1000,
        }
    }
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error("no product for slug {slug}")]
    NotFound { slug: String },
    #[error("product {product_id} has no variant with slug {slug}")]
    MissingVariant { slug: String, product_id: String },
    #[error("product {product_id} has no variants")]
    NoVariants { product_id: String },
    #[error("store request failed: {0}")]
    Upstream(#[source] StoreError),
    #[error("page load exceeded {0:?}")]
    DeadlineExceeded(Duration),
}

/// Everything a product page needs once the product is known to be renderable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBundle {
    pub product: Product,
    pub variant: Variant,
    pub all_variants: Vec<Variant>,
    /// Same-category products, never including `product` itself.
    pub related: Vec<Product>,
    /// Generic listing fetched alongside the product, minus the product itself.
    pub featured: Vec<Product>,
    pub location_groups: Vec<LocationGroup>,
}

impl PageBundle {
    /// Builds a bundle around a variant already chosen by [`select_variant`].
    pub fn assemble(
        detail: ProductDetail,
        variant: Variant,
        related: Vec<Product>,
        featured: Vec<Product>,
        location_groups: Vec<LocationGroup>,
    ) -> Self {
        let primary = detail.product.id.as_str();
        let related = without_product(related, primary);
        let featured = without_product(featured, primary);

        Self {
            product: detail.product,
            variant,
            all_variants: detail.all_variants,
            related,
            featured,
            location_groups,
        }
    }

    pub fn delivery_for(&self, pin_code: &str) -> Option<DeliveryInfo> {
        delivery_info(&self.location_groups, pin_code)
    }
}

/// The variant a page for `slug` shows; products that cannot be rendered are refused.
pub fn select_variant(detail: &ProductDetail, slug: &str) -> Result<Variant, PageError> {
    if detail.all_variants.is_empty() {
        return Err(PageError::NoVariants {
            product_id: detail.product.id.clone(),
        });
    }
    detail
        .variant_for_slug(slug)
        .cloned()
        .ok_or_else(|| PageError::MissingVariant {
            slug: slug.to_string(),
            product_id: detail.product.id.clone(),
        })
}

fn without_product(products: Vec<Product>, product_id: &str) -> Vec<Product> {
    products.into_iter().filter(|p| p.id != product_id).collect()
}

/// Delivery promise for a pin code: the first location group serving it.
pub fn delivery_info(groups: &[LocationGroup], pin_code: &str) -> Option<DeliveryInfo> {
    let pin = pin_code.trim();
    if pin.is_empty() {
        return None;
    }
    groups.iter().find(|g| g.serves(pin)).map(|g| DeliveryInfo {
        location: pin.to_string(),
        estimated_delivery: g.estimated_delivery,
        is_cod_available: g.is_cod_available,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Ready(Box<PageBundle>),
    NotFound,
}

impl PageOutcome {
    pub fn bundle(self) -> Option<PageBundle> {
        match self {
            PageOutcome::Ready(bundle) => Some(*bundle),
            PageOutcome::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PageOutcome::NotFound)
    }
}

#[derive(Clone)]
pub struct PageAggregator {
    catalog: Arc<dyn Catalog>,
    settings: PageSettings,
}

impl PageAggregator {
    pub fn new(catalog: Arc<dyn Catalog>, settings: PageSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Loads the page for `slug`; every failure reads as [`PageOutcome::NotFound`].
    pub async fn load(&self, slug: &str) -> PageOutcome {
        match self.try_load(slug).await {
            Ok(bundle) => PageOutcome::Ready(Box::new(bundle)),
            Err(err @ (PageError::NotFound { .. }
            | PageError::MissingVariant { .. }
            | PageError::NoVariants { .. })) => {
                info!(slug, reason = %err, "page: not found");
                PageOutcome::NotFound
            }
            Err(err) => {
                error!(slug, error = %err, "page: load failed; rendering not found");
                PageOutcome::NotFound
            }
        }
    }

    /// Like [`Self::load`] but keeps the reason a page cannot be shown.
    pub async fn try_load(&self, slug: &str) -> Result<PageBundle, PageError> {
        let deadline = self.settings.deadline;
        tokio::time::timeout(deadline, self.assemble(slug))
            .await
            .map_err(|_| PageError::DeadlineExceeded(deadline))?
    }

    async fn assemble(&self, slug: &str) -> Result<PageBundle, PageError> {
        let limit = self.settings.related_limit;
        let generic_query = ProductQuery::limited(limit);

        let (detail, generic, location_groups) = tokio::join!(
            self.catalog.product_by_slug(slug),
            self.catalog.products(&generic_query),
            self.catalog.location_groups(),
        );

        let detail = detail.map_err(|err| match err {
            StoreError::NotFound { .. } => PageError::NotFound {
                slug: slug.to_string(),
            },
            other => PageError::Upstream(other),
        })?;
        let generic = generic.unwrap_or_else(|err| {
            warn!(slug, error = %err, "page: generic listing failed; using empty listing");
            ProductListing::default()
        });
        let location_groups = location_groups.unwrap_or_else(|err| {
            warn!(slug, error = %err, "page: location groups failed; delivery info hidden");
            Vec::new()
        });

        // Validate before spending a request on related products.
        let variant = select_variant(&detail, slug)?;

        let related = match detail.product.category_id() {
            Some(category_id) => {
                let query = ProductQuery::in_category(category_id, limit);
                match self.catalog.products(&query).await {
                    Ok(listing) => listing.products,
                    Err(err) => {
                        warn!(
                            slug,
                            category_id,
                            error = %err,
                            "page: related listing failed; no suggestions"
                        );
                        Vec::new()
                    }
                }
            }
            None => {
                debug!(slug, "page: product has no category; no suggestions");
                Vec::new()
            }
        };

        Ok(PageBundle::assemble(
            detail,
            variant,
            related,
            generic.products,
            location_groups,
        ))
    }

    /// Slugs of every product page worth pre-rendering: the first variant of each product.
    ///
    /// Never fails; listing problems are logged and yield an empty list.
    pub async fn static_params(&self) -> Vec<String> {
        let query =
            ProductQuery::limited(self.settings.static_params_limit).select(&["variants.slug"]);
        let listing = match self.catalog.products(&query).await {
            Ok(listing) => listing,
            Err(err) => {
                error!(error = %err, "page: static params listing failed");
                return Vec::new();
            }
        };
        if listing.products.is_empty() {
            warn!("page: static params found no products");
            return Vec::new();
        }
        listing
            .products
            .iter()
            .filter_map(|p| p.first_variant_slug().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use catalog_client::{
        Blog, Brand, CategoryRef, HomepageCategory, MediaItem, MediaKind, ProductQuery,
    };

    use super::*;

    pub fn media(id: &str, kind: MediaKind) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            media_type: kind,
            url: format!("https://cdn.example.com/{id}"),
        }
    }

    pub fn variant(slug: &str) -> Variant {
        Variant {
            id: format!("var-{slug}"),
            slug: slug.to_string(),
            name: format!("Item {slug}"),
            description: format!("About {slug}"),
            meta_title: None,
            meta_description: None,
            meta_keywords: vec![],
            images: vec![media("img1", MediaKind::Image)],
            open_graph_image: None,
        }
    }

    pub fn product(id: &str, category: Option<&str>, slugs: &[&str]) -> Product {
        Product {
            id: id.to_string(),
            category: category.map(|c| CategoryRef {
                id: c.to_string(),
                name: None,
            }),
            variants: slugs.iter().map(|s| variant(s)).collect(),
        }
    }

    pub fn detail(product: Product, slug: &str) -> ProductDetail {
        let all_variants = product.variants.clone();
        ProductDetail {
            variant: all_variants.iter().find(|v| v.slug == slug).cloned(),
            product,
            all_variants,
        }
    }

    pub fn listing(products: Vec<Product>) -> ProductListing {
        ProductListing {
            total_count: products.len() as u64,
            products,
        }
    }

    pub fn http_error(status: u16) -> StoreError {
        StoreError::Http {
            status,
            body: String::new(),
        }
    }

    /// Scripted catalog; each source answers from its own slot.
    pub struct FakeCatalog {
        pub detail: Mutex<Option<Result<ProductDetail, StoreError>>>,
        pub generic: Mutex<Option<Result<ProductListing, StoreError>>>,
        pub by_category: Mutex<Option<Result<ProductListing, StoreError>>>,
        pub groups: Mutex<Option<Result<Vec<LocationGroup>, StoreError>>>,
        pub hang_detail: bool,
        /// Latency added to each phase-1 source.
        pub delay: Duration,
        pub queries: Mutex<Vec<ProductQuery>>,
        pub detail_calls: AtomicUsize,
    }

    impl FakeCatalog {
        pub fn new(detail: Result<ProductDetail, StoreError>) -> Self {
            Self {
                detail: Mutex::new(Some(detail)),
                generic: Mutex::new(Some(Ok(ProductListing::default()))),
                by_category: Mutex::new(Some(Ok(ProductListing::default()))),
                groups: Mutex::new(Some(Ok(vec![]))),
                hang_detail: false,
                delay: Duration::ZERO,
                queries: Mutex::new(vec![]),
                detail_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_generic(self, r: Result<ProductListing, StoreError>) -> Self {
            *self.generic.lock().unwrap() = Some(r);
            self
        }

        pub fn with_category(self, r: Result<ProductListing, StoreError>) -> Self {
            *self.by_category.lock().unwrap() = Some(r);
            self
        }

        pub fn with_groups(self, r: Result<Vec<LocationGroup>, StoreError>) -> Self {
            *self.groups.lock().unwrap() = Some(r);
            self
        }

        pub fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn hanging(mut self) -> Self {
            self.hang_detail = true;
            self
        }

        pub fn category_queries(&self) -> Vec<ProductQuery> {
            self.queries
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.category_id.is_some())
                .cloned()
                .collect()
        }

        fn take<T>(slot: &Mutex<Option<Result<T, StoreError>>>) -> Result<T, StoreError> {
            slot.lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(http_error(599)))
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn product_by_slug(&self, _slug: &str) -> Result<ProductDetail, StoreError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_detail {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(self.delay).await;
            Self::take(&self.detail)
        }

        async fn products(&self, query: &ProductQuery) -> Result<ProductListing, StoreError> {
            self.queries.lock().unwrap().push(query.clone());
            if query.category_id.is_some() {
                Self::take(&self.by_category)
            } else {
                tokio::time::sleep(self.delay).await;
                Self::take(&self.generic)
            }
        }

        async fn location_groups(&self) -> Result<Vec<LocationGroup>, StoreError> {
            tokio::time::sleep(self.delay).await;
            Self::take(&self.groups)
        }

        async fn brands(&self) -> Result<Vec<Brand>, StoreError> {
            Ok(vec![Brand {
                id: "b1".into(),
                name: "Acme".into(),
                slug: None,
                image_url: None,
            }])
        }

        async fn homepage_categories(&self) -> Result<Vec<HomepageCategory>, StoreError> {
            Ok(vec![])
        }

        async fn homepage_category(&self, id: &str) -> Result<HomepageCategory, StoreError> {
            Err(StoreError::not_found(format!("homepage-category:{id}")))
        }

        async fn blog_by_slug(&self, slug: &str) -> Result<Blog, StoreError> {
            if slug == "launch" {
                Ok(Blog {
                    id: "blog1".into(),
                    slug: slug.into(),
                    title: "Launch".into(),
                    content: "Hello".into(),
                    image_url: None,
                    created_at: None,
                })
            } else {
                Err(StoreError::not_found(format!("blog:{slug}")))
            }
        }
    }
}
