//! Per-city dataset cache with a flat TTL
//!
//! Entries are replaced wholesale once stale and never evicted otherwise;
//! the key space is the fixed set of supported cities. A failed load
//! stores nothing, so the next request simply retries.

use crate::error::IngestError;
use crate::ingestion::{City, CityDataset, DatasetSource, RawRow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Time source, injectable so freshness can be tested
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct DatasetCache {
    source: Arc<dyn DatasetSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<City, CityDataset>>,
    // One per city: concurrent cold requests wait for a single upstream load
    refresh_locks: HashMap<City, Mutex<()>>,
}

impl DatasetCache {
    pub fn new(source: Arc<dyn DatasetSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            entries: RwLock::new(HashMap::new()),
            refresh_locks: City::ALL
                .into_iter()
                .map(|city| (city, Mutex::new(())))
                .collect(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Rows for a city: the cached snapshot while fresh, otherwise a new load
    pub async fn get(&self, city: City) -> Result<Arc<Vec<RawRow>>, IngestError> {
        if let Some(rows) = self.fresh_rows(city).await {
            debug!("Cache hit for {} ({} rows)", city, rows.len());
            return Ok(rows);
        }

        let _refresh_guard = match self.refresh_locks.get(&city) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        // Another request may have refreshed while we waited
        if let Some(rows) = self.fresh_rows(city).await {
            debug!("Cache filled by concurrent refresh for {}", city);
            return Ok(rows);
        }

        let rows = match self.source.load(city).await {
            Ok(rows) => Arc::new(rows),
            Err(e) => {
                warn!("Loading {} failed, nothing cached: {}", city, e);
                return Err(e);
            }
        };

        let fetched_at = self.clock.now();
        info!("Cached {} rows for {} at {}", rows.len(), city, fetched_at);

        self.entries.write().await.insert(
            city,
            CityDataset {
                fetched_at,
                rows: Arc::clone(&rows),
            },
        );

        Ok(rows)
    }

    /// When the cached rows for a city were loaded, if any
    pub async fn fetched_at(&self, city: City) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .await
            .get(&city)
            .map(|dataset| dataset.fetched_at)
    }

    async fn fresh_rows(&self, city: City) -> Option<Arc<Vec<RawRow>>> {
        let entries = self.entries.read().await;
        let dataset = entries.get(&city)?;

        // A clock that went backwards counts as age zero
        let age = (self.clock.now() - dataset.fetched_at)
            .to_std()
            .unwrap_or_default();

        if age < self.ttl {
            Some(Arc::clone(&dataset.rows))
        } else {
            debug!("Cache entry for {} is stale ({:?} old)", city, age);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Clock that only moves when told to
    pub struct ManualClock {
        now: std::sync::Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: std::sync::Mutex::new(Utc::now()),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(by).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    /// In-memory source that counts loads per call
    pub struct FakeSource {
        rows: HashMap<City, Vec<RawRow>>,
        failing: std::sync::Mutex<Vec<City>>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeSource {
        pub fn new(rows: HashMap<City, Vec<RawRow>>) -> Self {
            Self {
                rows,
                failing: std::sync::Mutex::new(Vec::new()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_city(city: City, rows: Vec<RawRow>) -> Self {
            Self::new(HashMap::from([(city, rows)]))
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn fail(&self, city: City) {
            self.failing.lock().unwrap().push(city);
        }

        pub fn recover(&self, city: City) {
            self.failing.lock().unwrap().retain(|c| *c != city);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DatasetSource for FakeSource {
        async fn load(&self, city: City) -> Result<Vec<RawRow>, IngestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if self.failing.lock().unwrap().contains(&city) {
                return Err(IngestError::FetchFailed {
                    url: format!("https://example.test/{}.csv.gz", city),
                    status: Some(404),
                    looks_like_html: true,
                    detail: None,
                });
            }

            Ok(self.rows.get(&city).cloned().unwrap_or_default())
        }
    }
}
