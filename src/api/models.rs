// API request/response models (DTOs)

use catalog_client::DeliveryInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::PageBundle;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Some(Meta::now()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            meta: Some(Meta::now()),
        }
    }
}

/// Metadata included in all API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub uptime_seconds: u64,
}

/// Product page payload; `delivery` is only present when a pincode was given
/// and some location group serves it.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub page: PageBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub pincode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    pub tab: Option<String>,
    pub index: Option<usize>,
}
