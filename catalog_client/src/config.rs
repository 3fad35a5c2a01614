use std::time::Duration;

/// Connection settings for the store API.
///
/// Built once at process start and handed to [`crate::StoreClient::new`]; the
/// client never reads the environment itself.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    /// Store scope used by the admin listing endpoints.
    pub store_id: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Soft TTL for cached responses; zero disables caching.
    pub revalidate: Duration,
    pub user_agent: String,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            store_id: store_id.into(),
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_revalidate(mut self, ttl: Duration) -> Self {
        self.revalidate = ttl;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            store_id: String::new(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            revalidate: Duration::from_secs(600),
            user_agent: concat!("catalog-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}
