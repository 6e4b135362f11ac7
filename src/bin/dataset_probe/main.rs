//! Dataset probe - downloads each city dataset through the ingestion
//! pipeline and reports what the normalizer makes of it

use anyhow::Result;
use rental_listings_backend::config::Config;
use rental_listings_backend::ingestion::{normalize, City, DatasetSource, HttpDatasetSource};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    info!("Starting dataset probe");

    let config = Config::from_env()?;
    let source = HttpDatasetSource::new(config.dataset_urls, config.fetch_timeout)?;

    // Cities from command line args, or all of them
    let args: Vec<String> = env::args().skip(1).collect();
    let cities: Vec<City> = if args.is_empty() {
        City::ALL.to_vec()
    } else {
        args.iter()
            .filter_map(|arg| match arg.parse() {
                Ok(city) => Some(city),
                Err(_) => {
                    warn!("Unknown city: {}", arg);
                    None
                }
            })
            .collect()
    };

    let mut failed = 0;
    for city in cities {
        info!("Probing {} ({})", city.label(), source.url_for(city));

        match source.load(city).await {
            Ok(rows) => {
                info!("✓ {} loaded {} rows", city, rows.len());
                if let Some(first) = rows.first() {
                    let listing = normalize(first, city);
                    info!(
                        "  first listing: {} | {} | price {:?} | {}",
                        listing.id, listing.name, listing.price, listing.location
                    );
                }
            }
            Err(e) => {
                failed += 1;
                error!("✗ {} failed: {}", city, e);
            }
        }
    }

    info!("Dataset probe complete ({} failed)", failed);

    Ok(())
}
