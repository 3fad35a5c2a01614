// HTTP API for the storefront: product pages, metadata, gallery and content lookups

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
