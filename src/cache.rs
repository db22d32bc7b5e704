//! In-memory cache of loaded datasets
//!
//! Loading the dataset is by far the most expensive thing this crate does, so
//! interactive front-ends should only do it once per session. Loaded datasets
//! are immutable snapshots, keyed by the [`DatasetSource`] that they were
//! loaded from, and can be shared freely.

use crate::{
    loader::DatasetSource,
    ohw::{self, OneHitWonderTable},
    table::{self, NameTable},
    Result,
};
use std::{collections::HashMap, future::Future, sync::Arc};

/// Everything derived from one load of the dataset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    /// Annotated flat table of every record
    pub names: NameTable,

    /// Records of the names that were only given on a single year
    pub one_hit_wonders: OneHitWonderTable,
}
//
impl Dataset {
    /// Annotate a freshly loaded table and derive the one-hit wonders from it
    pub fn new(loaded: NameTable) -> Self {
        let names = table::annotate(loaded);
        let one_hit_wonders = ohw::extract(&names);
        Self {
            names,
            one_hit_wonders,
        }
    }
}

/// Loaded datasets, keyed by source
#[derive(Debug, Default)]
pub struct DatasetCache(HashMap<DatasetSource, Arc<Dataset>>);
//
impl DatasetCache {
    /// Set up an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset previously loaded from some source, if any
    pub fn get(&self, source: &DatasetSource) -> Option<Arc<Dataset>> {
        self.0.get(source).cloned()
    }

    /// Record a dataset loaded from some source, replacing any previous one
    pub fn insert(&mut self, source: DatasetSource, loaded: NameTable) -> Arc<Dataset> {
        let dataset = Arc::new(Dataset::new(loaded));
        self.0.insert(source, dataset.clone());
        dataset
    }

    /// Dataset from some source, loading it with `load` on a cache miss
    ///
    /// If loading fails, nothing is cached and the error is propagated.
    pub async fn get_or_load<F, Fut>(
        &mut self,
        source: &DatasetSource,
        load: F,
    ) -> Result<Arc<Dataset>>
    where
        F: FnOnce(DatasetSource) -> Fut,
        Fut: Future<Output = Result<NameTable>>,
    {
        if let Some(dataset) = self.get(source) {
            log::debug!("Reusing cached dataset from {}", source.url);
            return Ok(dataset);
        }
        log::debug!("No cached dataset from {}, loading it", source.url);
        let loaded = load(source.clone()).await?;
        Ok(self.insert(source.clone(), loaded))
    }

    /// Forget the dataset loaded from some source
    ///
    /// Returns truth that there was such a dataset. Snapshots handed out
    /// earlier remain valid.
    pub fn invalidate(&mut self, source: &DatasetSource) -> bool {
        self.0.remove(source).is_some()
    }

    /// Forget every loaded dataset
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        table::{NameRecord, Sex},
        Error,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loaded() -> NameTable {
        NameTable::from(vec![
            NameRecord::new("Ava", Sex::Female, 100, 1950),
            NameRecord::new("Ava", Sex::Female, 50, 1951),
            NameRecord::new("Zelenko", Sex::Male, 3, 1920),
        ])
    }

    #[test]
    fn dataset_is_annotated_and_derived() {
        let dataset = Dataset::new(loaded());
        assert!(dataset.names.records().iter().all(|r| r.pct == 1.0));
        assert_eq!(dataset.one_hit_wonders.len(), 1);
        assert_eq!(&*dataset.one_hit_wonders.records()[0].name, "Zelenko");
        assert_eq!(Dataset::new(loaded()), dataset);
    }

    #[tokio::test]
    async fn loads_once_per_source() {
        let mut cache = DatasetCache::new();
        let source = DatasetSource::default();
        let loads = AtomicUsize::new(0);
        let load = |_source: DatasetSource| async {
            loads.fetch_add(1, Ordering::Relaxed);
            Ok::<_, Error>(loaded())
        };
        let first = cache.get_or_load(&source, load).await.expect("load succeeds");
        let second = cache.get_or_load(&source, load).await.expect("cache hit");
        assert_eq!(loads.load(Ordering::Relaxed), 1);
        assert!(Arc::ptr_eq(&first, &second));

        assert!(cache.invalidate(&source));
        assert!(!cache.invalidate(&source));
        let third = cache.get_or_load(&source, load).await.expect("reload succeeds");
        assert_eq!(loads.load(Ordering::Relaxed), 2);
        assert_eq!(*first, *third);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn failed_loads_are_not_cached() {
        let mut cache = DatasetCache::new();
        let source = DatasetSource {
            url: "http://127.0.0.1:9/names.zip".into(),
        };
        let result = cache
            .get_or_load(&source, |source| async move {
                Err(Error::fetch(source.url, "unreachable"))
            })
            .await;
        assert!(matches!(result, Err(Error::Fetch { .. })));
        assert!(cache.get(&source).is_none());

        cache.insert(source.clone(), loaded());
        assert!(cache.get(&source).is_some());
        cache.clear();
        assert!(cache.get(&source).is_none());
    }
}
