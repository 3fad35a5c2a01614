use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{Lookup, ResponseCache};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{
    Blog, Brand, HomepageCategory, LocationGroup, ProductDetail, ProductListing, ProductQuery,
};

/// Read operations the storefront needs from the store API.
///
/// Lookups of a single entity report absence as [`StoreError::NotFound`].
/// Brand and homepage-category listings degrade to an empty list when the
/// store rejects the request; the remaining listings hand the error to the
/// caller so it can pick its own fallback.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn product_by_slug(&self, slug: &str) -> Result<ProductDetail, StoreError>;

    async fn products(&self, query: &ProductQuery) -> Result<ProductListing, StoreError>;

    async fn location_groups(&self) -> Result<Vec<LocationGroup>, StoreError>;

    async fn brands(&self) -> Result<Vec<Brand>, StoreError>;

    async fn homepage_categories(&self) -> Result<Vec<HomepageCategory>, StoreError>;

    async fn homepage_category(&self, id: &str) -> Result<HomepageCategory, StoreError>;

    async fn blog_by_slug(&self, slug: &str) -> Result<Blog, StoreError>;
}

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

#[derive(Clone, Debug)]
pub struct StoreClient {
    http: Client,
    cfg: Arc<StoreConfig>,
    base: Url,
    cache: Arc<ResponseCache>,
}

impl StoreClient {
    pub fn new(cfg: StoreConfig) -> Result<Self, StoreError> {
        let cache = ResponseCache::new(cfg.revalidate);
        Self::with_cache(cfg, cache)
    }

    /// Build a client around an existing cache (e.g. one driven by a manual clock).
    pub fn with_cache(cfg: StoreConfig, cache: ResponseCache) -> Result<Self, StoreError> {
        let mut base = Url::parse(cfg.base_url.trim())?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "store base url must be http(s): {}",
                cfg.base_url
            )));
        }
        if cfg.store_id.trim().is_empty() {
            return Err(StoreError::Config("store id must not be empty".into()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .default_headers(headers)
            .user_agent(cfg.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .timeout(cfg.request_timeout)
            .connect_timeout(cfg.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(50))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            cfg: Arc::new(cfg),
            base,
            cache: Arc::new(cache),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn endpoint(&self, segments: &[&str], qs: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Config(format!("cannot extend base url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        if !qs.is_empty() {
            url.query_pairs_mut().extend_pairs(qs);
        }
        Ok(url)
    }

    fn admin_endpoint(&self, tail: &[&str], qs: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut segments = vec!["api", "admin", self.cfg.store_id.as_str()];
        segments.extend_from_slice(tail);
        self.endpoint(&segments, qs)
    }

    fn classify(url: &Url, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                url: url.to_string(),
            }
        } else {
            StoreError::Net(err)
        }
    }

    async fn request(&self, url: &Url) -> Result<Bytes, StoreError> {
        debug!(url = %url, "catalog: GET");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| Self::classify(url, e))?;
        if !status.is_success() {
            let body = truncate_for_log(String::from_utf8_lossy(&bytes).into_owned(), 512);
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(bytes)
    }

    /// GET and decode through the response cache.
    ///
    /// Non-success statuses come back as [`StoreError::Http`]. A body is only
    /// cached once it decodes as `T`, so an unreadable 200 is retried on the
    /// next call instead of being replayed.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StoreError> {
        let key = url.as_str();
        let stale = match self.cache.lookup(key).await {
            Lookup::Fresh(body) => {
                debug!(url = %url, "catalog: cache hit");
                return Ok(serde_json::from_slice(&body)?);
            }
            Lookup::Stale(body) => Some(body),
            Lookup::Miss => None,
        };

        match self.request(&url).await {
            Ok(body) => {
                let value = serde_json::from_slice::<T>(&body).map_err(|err| {
                    warn!(url = %url, error = %err, "catalog: undecodable response; not cached");
                    err
                })?;
                self.cache.store(key, body).await;
                Ok(value)
            }
            Err(err) if err.is_transport() => match stale {
                Some(body) => {
                    warn!(
                        url = %url,
                        error = %err,
                        "catalog: store unreachable; serving stale response"
                    );
                    Ok(serde_json::from_slice(&body)?)
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// Single-entity lookup: any non-success status means the entity is absent.
    async fn get_entity<T: DeserializeOwned>(
        &self,
        resource: String,
        url: Url,
    ) -> Result<T, StoreError> {
        match self.get_json(url).await {
            Err(StoreError::Http { status, .. }) => {
                debug!(resource = %resource, status, "catalog: lookup returned no entity");
                Err(StoreError::NotFound { resource })
            }
            other => other,
        }
    }

    /// Listing whose rejection is expected and reads as "nothing to show".
    async fn get_list_or_empty<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, StoreError> {
        match self.get_json(url.clone()).await {
            Err(StoreError::Http { status, .. }) => {
                warn!(url = %url, status, "catalog: listing rejected; using empty list");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

#[async_trait]
impl Catalog for StoreClient {
    async fn product_by_slug(&self, slug: &str) -> Result<ProductDetail, StoreError> {
        let url = self.endpoint(&["api", "products"], &[("slug", slug.to_string())])?;
        self.get_entity(format!("product:{slug}"), url).await
    }

    async fn products(&self, query: &ProductQuery) -> Result<ProductListing, StoreError> {
        let url = self.admin_endpoint(&["products"], &query.to_pairs())?;
        self.get_json(url).await
    }

    async fn location_groups(&self) -> Result<Vec<LocationGroup>, StoreError> {
        let url = self.admin_endpoint(&["location-groups"], &[])?;
        self.get_json(url).await
    }

    async fn brands(&self) -> Result<Vec<Brand>, StoreError> {
        let url = self.admin_endpoint(&["brands"], &[])?;
        self.get_list_or_empty(url).await
    }

    async fn homepage_categories(&self) -> Result<Vec<HomepageCategory>, StoreError> {
        let url = self.admin_endpoint(&["homepage-categories"], &[])?;
        self.get_list_or_empty(url).await
    }

    async fn homepage_category(&self, id: &str) -> Result<HomepageCategory, StoreError> {
        let url = self.admin_endpoint(&["homepage-categories", id], &[])?;
        self.get_entity(format!("homepage-category:{id}"), url).await
    }

    async fn blog_by_slug(&self, slug: &str) -> Result<Blog, StoreError> {
        let url = self.endpoint(&["api", "blogs"], &[("slug", slug.to_string())])?;
        self.get_entity(format!("blog:{slug}"), url).await
    }
}
