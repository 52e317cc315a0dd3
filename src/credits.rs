use std::time::Duration;

use credits_http_client::CreditsApi;
use models::{CreditsCache, CreditsPayload};
use time::OffsetDateTime;

use crate::store::ConfigStore;

/// Current wall-clock time as fractional unix seconds.
pub fn unix_now() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
}

/// Credits lookup backed by the single-slot cache in the config file.
pub struct CreditFetcher<'a, A> {
    api: &'a A,
    store: &'a ConfigStore,
    cache_duration: Duration,
    clock: fn() -> f64,
}

impl<'a, A: CreditsApi> CreditFetcher<'a, A> {
    pub fn new(api: &'a A, store: &'a ConfigStore, cache_duration: Duration) -> Self {
        Self {
            api,
            store,
            cache_duration,
            clock: unix_now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the balance, or `None` when there is no cookie or the fetch failed.
    ///
    /// With `use_cache`, an entry younger than the cache duration is returned
    /// without touching the network. A successful fetch overwrites the cache;
    /// a failed one leaves it alone.
    pub async fn get_credits(
        &self,
        cookies: Option<&str>,
        use_cache: bool,
    ) -> Option<CreditsPayload> {
        let cookies = cookies.filter(|c| !c.is_empty())?;

        if use_cache {
            if let Some(hit) = self.cached((self.clock)()) {
                tracing::debug!("credits served from cache");
                return Some(hit);
            }
        }

        let entry = self.fetch_entry(cookies).await?;
        self.write_cache(&entry);
        Some(entry.data)
    }

    /// One network fetch, stamped as a cache entry but not persisted.
    ///
    /// Callers that save the document themselves put the entry in it so the
    /// file is written once per invocation.
    pub async fn fetch_entry(&self, cookies: &str) -> Option<CreditsCache> {
        if cookies.is_empty() {
            return None;
        }
        match self.api.fetch_credits(cookies).await {
            Ok(payload) => Some(self.cache_entry(&payload)),
            Err(e) => {
                tracing::error!("failed to fetch credits: {e:#}");
                None
            }
        }
    }

    /// The cached payload if it is still fresh at `now`.
    pub fn cached(&self, now: f64) -> Option<CreditsPayload> {
        let cache = self.store.load().credits_cache?;
        cache
            .is_fresh(now, self.cache_duration.as_secs_f64())
            .then_some(cache.data)
    }

    /// New cache entry stamped with the fetcher's clock.
    pub fn cache_entry(&self, payload: &CreditsPayload) -> CreditsCache {
        CreditsCache::new(payload.clone(), (self.clock)())
    }

    fn write_cache(&self, entry: &CreditsCache) {
        let mut doc = self.store.load();
        doc.credits_cache = Some(entry.clone());
        self.store.save(&doc);
    }
}
