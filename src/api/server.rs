// API server implementation using actix-web

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use catalog_client::{Catalog, StoreClient};

use crate::api::handlers::AppState;
use crate::api::{middleware, routes};
use crate::config::AppConfig;
use crate::page::PageAggregator;

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub allowed_origins: String,
    state: AppState,
}

impl ApiServer {
    /// Build the server and its store client from loaded configuration.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let client = StoreClient::new(cfg.store.clone()).context("Invalid store configuration")?;
        let store = url::Url::parse(&cfg.store.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| cfg.store.base_url.clone());

        let catalog: Arc<dyn Catalog> = Arc::new(client);
        let pages = PageAggregator::new(catalog.clone(), cfg.page.clone());

        Ok(Self {
            host: cfg.server.host.clone(),
            port: cfg.server.port,
            allowed_origins: cfg.server.allowed_origins.clone(),
            state: AppState::new(catalog, pages, store),
        })
    }

    /// Start the HTTP server
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            store = %self.state.store,
            "Starting storefront API server"
        );

        let state = web::Data::new(self.state);
        let allowed_origins = self.allowed_origins.clone();

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();
            let cors = middleware::setup_cors(&allowed_origins);

            App::new()
                .app_data(state.clone())
                .wrap(logger)
                .wrap(compress)
                .wrap(cors)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
