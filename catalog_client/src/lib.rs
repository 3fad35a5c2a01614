//! Typed, cached read client for the store API behind the storefront.

mod cache;
mod client;
mod config;
mod error;
mod models;

pub use crate::cache::{
    Clock, Lookup, ManualClock, ResponseCache, SystemClock, DEFAULT_CAPACITY, STALE_FACTOR,
};
pub use crate::client::{Catalog, StoreClient};
pub use crate::config::StoreConfig;
pub use crate::error::StoreError;
pub use crate::models::*;
