// Library module for testable functions

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod query;
pub mod storage;

use cache::{DatasetCache, SystemClock};
use config::Config;
use ingestion::HttpDatasetSource;
use std::sync::Arc;

/// Cache backed by the real dataset host, configured from `config`
pub fn build_cache(config: &Config) -> anyhow::Result<DatasetCache> {
    let source = HttpDatasetSource::new(config.dataset_urls.clone(), config.fetch_timeout)?;

    Ok(DatasetCache::new(
        Arc::new(source),
        Arc::new(SystemClock),
        config.cache_ttl,
    ))
}
