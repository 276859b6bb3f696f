//! TTL-bounded cache for enumeration allow-lists.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::CatalogResult;
use crate::provider::FieldProvider;

const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct Slot {
    values: Option<Vec<String>>,
    fetched_at: Option<Instant>,
}

impl Slot {
    fn get(
        &mut self,
        ttl: Duration,
        fetch: impl FnOnce() -> CatalogResult<Vec<String>>,
    ) -> CatalogResult<Vec<String>> {
        let fresh = matches!(self.fetched_at, Some(at) if at.elapsed() < ttl);
        if !fresh || self.values.is_none() {
            self.values = Some(fetch()?);
            self.fetched_at = Some(Instant::now());
        }
        Ok(self.values.clone().unwrap_or_default())
    }
}

/// Caches adapter names, connection labels, and tags for a short window.
///
/// The wizard validates some values against allow-lists that live on the
/// platform. Those lookups are fetched through this cache so a batch of
/// entries costs at most one fetch per list. One instance per wizard
/// session; entries expire after the TTL (30 seconds by default).
#[derive(Debug)]
pub struct EnumCache {
    ttl: Duration,
    adapters: Mutex<Slot>,
    labels: Mutex<Slot>,
    tags: Mutex<Slot>,
}

impl Default for EnumCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl EnumCache {
    /// Creates a cache with the default 30 second TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            adapters: Mutex::new(Slot::default()),
            labels: Mutex::new(Slot::default()),
            tags: Mutex::new(Slot::default()),
        }
    }

    /// Adapter names, fetching through the provider on a cold or expired slot.
    pub fn adapter_names(&self, provider: &dyn FieldProvider) -> CatalogResult<Vec<String>> {
        let mut slot = self.adapters.lock().unwrap_or_else(|e| e.into_inner());
        slot.get(self.ttl, || provider.adapter_names())
    }

    /// Connection labels, fetching through the provider on a cold or expired slot.
    pub fn connection_labels(&self, provider: &dyn FieldProvider) -> CatalogResult<Vec<String>> {
        let mut slot = self.labels.lock().unwrap_or_else(|e| e.into_inner());
        slot.get(self.ttl, || provider.connection_labels())
    }

    /// Asset tags, fetching through the provider on a cold or expired slot.
    pub fn tags(&self, provider: &dyn FieldProvider) -> CatalogResult<Vec<String>> {
        let mut slot = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        slot.get(self.ttl, || provider.tags())
    }

    /// Drops every cached list.
    pub fn clear(&self) {
        for slot in [&self.adapters, &self.labels, &self.tags] {
            let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Slot::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryCatalog;

    #[test]
    fn test_fetches_through_provider() {
        let provider = MemoryCatalog::default().with_tags(vec!["prod".to_string()]);
        let cache = EnumCache::new();
        assert_eq!(cache.tags(&provider).unwrap(), vec!["prod".to_string()]);
    }

    #[test]
    fn test_serves_cached_values_within_ttl() {
        let provider = MemoryCatalog::default().with_adapters(vec!["aws".to_string()]);
        let cache = EnumCache::new();
        cache.adapter_names(&provider).unwrap();

        // A different provider answer is invisible until expiry.
        let changed = MemoryCatalog::default().with_adapters(vec!["gcp".to_string()]);
        assert_eq!(
            cache.adapter_names(&changed).unwrap(),
            vec!["aws".to_string()]
        );
    }

    #[test]
    fn test_expired_slot_refetches() {
        let provider = MemoryCatalog::default().with_labels(vec!["old".to_string()]);
        let cache = EnumCache::with_ttl(Duration::from_secs(0));
        cache.connection_labels(&provider).unwrap();

        let changed = MemoryCatalog::default().with_labels(vec!["new".to_string()]);
        assert_eq!(
            cache.connection_labels(&changed).unwrap(),
            vec!["new".to_string()]
        );
    }

    #[test]
    fn test_clear_forces_refetch() {
        let provider = MemoryCatalog::default().with_tags(vec!["a".to_string()]);
        let cache = EnumCache::new();
        cache.tags(&provider).unwrap();
        cache.clear();

        let changed = MemoryCatalog::default().with_tags(vec!["b".to_string()]);
        assert_eq!(cache.tags(&changed).unwrap(), vec!["b".to_string()]);
    }
}
