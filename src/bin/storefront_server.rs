// HTTP API server binary for the storefront

use anyhow::Result;
use storefront::api::ApiServer;
use storefront::config::AppConfig;
use storefront::logging::init_tracing;
use storefront::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing("info,actix_web=info,catalog_client=info")?;

    tracing::info!("Initializing storefront API server");

    let cfg = AppConfig::from_env()?;
    let server = ApiServer::from_config(&cfg)?;

    server.run().await?;

    Ok(())
}
