//! Storefront product pages backed by a remote store API.
//!
//! The store client itself lives in the `catalog-client` crate; this crate
//! aggregates page data, derives metadata, tracks gallery state and serves it
//! all over HTTP.

pub mod api;
pub mod config;
pub mod gallery;
pub mod logging;
pub mod metadata;
pub mod page;

pub mod util {
    pub mod env;
}
