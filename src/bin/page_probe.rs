use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use storefront::config::AppConfig;
use storefront::gallery::GalleryState;
use storefront::logging::init_tracing;
use storefront::metadata;
use storefront::page::{PageAggregator, PageOutcome};
use storefront::util::env as env_util;

use catalog_client::{Catalog, StoreClient};

#[derive(Parser, Debug)]
#[command(name = "page_probe", version, about = "Fetch storefront pages from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Load the full product page for a slug
    Page {
        slug: String,
        /// Include the delivery promise for this pincode
        #[arg(long)]
        pincode: Option<String>,
    },
    /// Print the page metadata for a slug
    Metadata { slug: String },
    /// Print the initial gallery view for a slug
    Gallery { slug: String },
    /// List the slugs that would be pre-rendered
    StaticParams,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing("warn,page_probe=info")?;
    let cli = Cli::parse();

    let cfg = AppConfig::from_env()?;
    let client = StoreClient::new(cfg.store.clone()).context("Invalid store configuration")?;
    let catalog: Arc<dyn Catalog> = Arc::new(client);
    let pages = PageAggregator::new(catalog.clone(), cfg.page.clone());

    match cli.command {
        Commands::Page { slug, pincode } => {
            let bundle = match pages.try_load(&slug).await {
                Ok(bundle) => bundle,
                Err(err) => {
                    tracing::warn!(slug = %slug, error = %err, "page_probe: page not renderable");
                    println!("not found: {slug} ({err})");
                    return Ok(());
                }
            };
            if let Some(pin) = pincode.as_deref() {
                match bundle.delivery_for(pin) {
                    Some(info) => print_json(&info)?,
                    None => println!("pincode {pin} is not serviceable"),
                }
            }
            print_json(&bundle)?;
        }
        Commands::Metadata { slug } => {
            print_json(&metadata::for_slug(catalog.as_ref(), &slug).await)?;
        }
        Commands::Gallery { slug } => match pages.load(&slug).await {
            PageOutcome::Ready(bundle) => {
                print_json(&GalleryState::new(bundle.variant.images).view())?;
            }
            PageOutcome::NotFound => println!("not found: {slug}"),
        },
        Commands::StaticParams => {
            print_json(&pages.static_params().await)?;
        }
    }

    Ok(())
}
