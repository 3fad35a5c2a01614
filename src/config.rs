//! Process configuration, read from the environment once at start-up.

use std::time::Duration;

use anyhow::{Context, Result};
use catalog_client::StoreConfig;

use crate::page::PageSettings;
use crate::util::env::{env_opt, env_parse, env_req, preflight_check};

pub const REQUIRED_KEYS: &[&str] = &["STORE_URL", "STORE_ID"];

const LOGGED_KEYS: &[&str] = &[
    "STORE_TIMEOUT_SECS",
    "STORE_REVALIDATE_SECS",
    "PAGE_DEADLINE_SECS",
    "RELATED_LIMIT",
    "API_HOST",
    "API_PORT",
    "ALLOWED_ORIGINS",
];

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            allowed_origins: "http://localhost:3000".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub page: PageSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        preflight_check("storefront", REQUIRED_KEYS, LOGGED_KEYS)?;

        let store = StoreConfig::new(env_req("STORE_URL")?, env_req("STORE_ID")?)
            .with_request_timeout(Duration::from_secs(env_parse("STORE_TIMEOUT_SECS", 10u64)))
            .with_revalidate(Duration::from_secs(env_parse("STORE_REVALIDATE_SECS", 600u64)));

        let defaults = PageSettings::default();
        let page = PageSettings {
            related_limit: env_parse("RELATED_LIMIT", defaults.related_limit),
            deadline: Duration::from_secs(env_parse(
                "PAGE_DEADLINE_SECS",
                defaults.deadline.as_secs(),
            )),
            ..defaults
        };

        let server_defaults = ServerSettings::default();
        let port = match env_opt("API_PORT") {
            Some(raw) => raw.parse().context("Invalid API_PORT")?,
            None => server_defaults.port,
        };
        let server = ServerSettings {
            host: env_opt("API_HOST").unwrap_or(server_defaults.host),
            port,
            allowed_origins: env_opt("ALLOWED_ORIGINS").unwrap_or(server_defaults.allowed_origins),
        };

        Ok(Self {
            store,
            page,
            server,
        })
    }
}
