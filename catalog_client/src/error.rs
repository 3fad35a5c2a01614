use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store answered, but the requested entity does not exist (or is not visible).
    #[error("not found: {resource}")] NotFound {
        resource: String,
    },
    #[error("http {status}: {body}")] Http {
        status: u16,
        body: String,
    },
    #[error("timed out waiting for {url}")] Timeout {
        url: String,
    },
    #[error("network: {0}")] Net(#[from] reqwest::Error),
    #[error("json: {0}")] Json(#[from] serde_json::Error),
    #[error("url: {0}")] Url(#[from] url::ParseError),
    #[error("config: {0}")] Config(String),
}

impl StoreError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        StoreError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Failures where no usable response arrived at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Net(_) | StoreError::Timeout { .. })
    }
}
