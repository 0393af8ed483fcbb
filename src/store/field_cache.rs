use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::model::{CaseType, FieldKey, Result, RuleSetError, Section};
use crate::store::traits::FieldSource;

/// Outcome of a field-list request
#[derive(Debug)]
pub enum FieldLookup {
    /// Served from the cache without calling the source
    Ready(Vec<String>),
    /// Fetch in flight; the cache entry is written when it completes
    Pending(JoinHandle<()>),
}

impl FieldLookup {
    pub fn ready(&self) -> Option<&[String]> {
        match self {
            FieldLookup::Ready(fields) => Some(fields),
            FieldLookup::Pending(_) => None,
        }
    }
}

/// Cache of field lists keyed by (section, case type).
///
/// Entries never expire: the source is a pure function of the key. Concurrent requests for
/// the same uncached key are not merged and each one calls the source. Fetches are not
/// cancelled when the caller loses interest.
pub struct FieldCache<S> {
    source: Arc<S>,
    entries: Arc<RwLock<HashMap<FieldKey, Vec<String>>>>,
}

impl<S: FieldSource + 'static> FieldCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Cached list for the key, without touching the source
    pub fn cached(&self, section: Section, case_type: CaseType) -> Option<Vec<String>> {
        self.entries
            .read()
            .get(&FieldKey::new(section, case_type))
            .cloned()
    }

    /// Cached keys return `Ready` synchronously. Anything else spawns a fetch on the current
    /// tokio runtime and returns `Pending`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not cached and no tokio runtime is running, since the fetch is
    /// started with `tokio::spawn`.
    pub fn request(&self, section: Section, case_type: CaseType) -> FieldLookup {
        if let Some(fields) = self.cached(section, case_type) {
            return FieldLookup::Ready(fields);
        }

        let key = FieldKey::new(section, case_type);
        let source = Arc::clone(&self.source);
        let entries = Arc::clone(&self.entries);
        debug!("Fetching field list for {}", key);

        FieldLookup::Pending(tokio::spawn(async move {
            match source.fetch_fields(section, case_type).await {
                Ok(fields) => {
                    debug!("Cached {} fields for {}", fields.len(), key);
                    entries.write().insert(key, fields);
                }
                Err(e) => warn!("Field lookup for {} failed: {}", key, e),
            }
        }))
    }

    /// Cached list, or wait for the source and cache its answer
    pub async fn fetch(&self, section: Section, case_type: CaseType) -> Result<Vec<String>> {
        if let Some(fields) = self.cached(section, case_type) {
            return Ok(fields);
        }

        let key = FieldKey::new(section, case_type);
        let fields = self
            .source
            .fetch_fields(section, case_type)
            .await
            .map_err(|e| RuleSetError::FieldLookup(format!("{}: {}", key, e)))?;

        self.entries.write().insert(key, fields.clone());
        Ok(fields)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl FieldSource for CountingSource {
        async fn fetch_fields(
            &self,
            section: Section,
            case_type: CaseType,
        ) -> anyhow::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            Ok(vec![format!("{}_{}_1", section, case_type)])
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl FieldSource for FailingSource {
        async fn fetch_fields(&self, _: Section, _: CaseType) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("service unavailable")
        }
    }

    fn counting() -> (FieldCache<CountingSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = FieldCache::new(CountingSource {
            calls: Arc::clone(&calls),
        });
        (cache, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_fills_cache_then_serves_synchronously() {
        let (cache, calls) = counting();

        let lookup = cache.request(Section::Section1, CaseType::A);
        assert!(lookup.ready().is_none());
        if let FieldLookup::Pending(handle) = lookup {
            handle.await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let lookup = cache.request(Section::Section1, CaseType::A);
        assert_eq!(lookup.ready(), Some(&["Section1_A_1".to_string()][..]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_are_not_merged() {
        let (cache, calls) = counting();

        let first = cache.request(Section::Section2, CaseType::B);
        let second = cache.request(Section::Section2, CaseType::B);
        for lookup in [first, second] {
            if let FieldLookup::Pending(handle) = lookup {
                handle.await.unwrap();
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_awaits_and_caches() {
        let (cache, calls) = counting();
        let fields = cache.fetch(Section::Section3, CaseType::C).await.unwrap();
        assert_eq!(fields, vec!["Section3_C_1".to_string()]);
        assert_eq!(
            cache.cached(Section::Section3, CaseType::C),
            Some(fields.clone())
        );
        assert_eq!(cache.fetch(Section::Section3, CaseType::C).await.unwrap(), fields);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_request_needs_no_runtime() {
        let (cache, calls) = counting();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime
            .block_on(cache.fetch(Section::Section2, CaseType::A))
            .unwrap();
        drop(runtime);

        let lookup = cache.request(Section::Section2, CaseType::A);
        assert_eq!(lookup.ready(), Some(&["Section2_A_1".to_string()][..]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic]
    fn test_uncached_request_outside_runtime_panics() {
        let (cache, _) = counting();
        let _ = cache.request(Section::Section1, CaseType::C);
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let cache = FieldCache::new(FailingSource);
        let err = cache.fetch(Section::Section1, CaseType::B).await.unwrap_err();
        assert!(matches!(err, RuleSetError::FieldLookup(ref m) if m.starts_with("Section1_B")));

        if let FieldLookup::Pending(handle) = cache.request(Section::Section1, CaseType::B) {
            handle.await.unwrap();
        }
        assert!(cache.is_empty());
    }
}
