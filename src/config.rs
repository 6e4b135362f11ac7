//! Configuration from environment (optionally seeded from `.env`)

use crate::ingestion::City;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    /// Per-city source overrides from `DATASET_URL_<KEY>`
    pub dataset_urls: HashMap<City, String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let dataset_urls = City::ALL
            .into_iter()
            .filter_map(|city| {
                let key = format!("DATASET_URL_{}", city.key().to_uppercase());
                lookup(&key)
                    .filter(|url| !url.trim().is_empty())
                    .map(|url| (city, url.trim().to_string()))
            })
            .collect();

        Ok(Config {
            host: get("HOST", "127.0.0.1")
                .parse()
                .context("HOST must be a valid IP address")?,
            port: get("PORT", "3001")
                .parse()
                .context("PORT must be a valid port number")?,
            cache_ttl: Duration::from_secs(
                get("CACHE_TTL_SECS", "600")
                    .parse()
                    .context("CACHE_TTL_SECS must be a whole number of seconds")?,
            ),
            fetch_timeout: Duration::from_secs(
                get("FETCH_TIMEOUT_SECS", "120")
                    .parse()
                    .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            dataset_urls,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
