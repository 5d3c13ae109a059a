//! Process-wide dataset cache.
//!
//! The dataset is loaded at most once per process. Later callers share the
//! same immutable [`Dataset`] through an [`Arc`]; nothing invalidates it
//! short of dropping the cache.

use std::sync::{Arc, Mutex, PoisonError};

use income_crime_dataset_models::Dataset;

use crate::DatasetError;
use crate::loader::{DataSource, load_dataset};
use crate::progress::ProgressCallback;

/// Loads a [`DataSource`] once and hands out the shared result.
pub struct DatasetCache {
    source: Box<dyn DataSource>,
    dataset: Mutex<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    /// Creates an empty cache over `source`.
    #[must_use]
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            dataset: Mutex::new(None),
        }
    }

    /// Returns the cached dataset, loading it on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the load fails.
    pub fn get_or_load(
        &self,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Arc<Dataset>, DatasetError> {
        let mut slot = self.dataset.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(dataset) = slot.as_ref() {
            log::debug!("Using cached dataset ({} records)", dataset.len());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_dataset(self.source.as_ref(), progress)?);
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Whether the dataset has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.dataset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Description of the underlying source.
    #[must_use]
    pub fn describe(&self) -> String {
        self.source.describe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use income_crime_dataset_models::{BRACKET_COUNT, Record};

    use super::*;
    use crate::progress::null_progress;

    struct CountingSource {
        loads: Arc<AtomicUsize>,
        rows: usize,
    }

    impl DataSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn load_records(
            &self,
            _progress: &Arc<dyn ProgressCallback>,
        ) -> Result<Vec<Record>, DatasetError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.rows)
                .map(|i| Record {
                    city: format!("City {i}"),
                    year: 2019,
                    month: 1,
                    zip: "00000".to_string(),
                    latitude: 0.0,
                    longitude: 0.0,
                    offense_category: "Theft".to_string(),
                    total_crimes: 1,
                    households: 1.0,
                    median_income: 1.0,
                    brackets: [10.0; BRACKET_COUNT],
                })
                .collect())
        }
    }

    #[test]
    fn loads_only_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(Box::new(CountingSource {
            loads: Arc::clone(&loads),
            rows: 3,
        }));

        assert!(!cache.is_loaded());
        let first = cache.get_or_load(&null_progress()).unwrap();
        let second = cache.get_or_load(&null_progress()).unwrap();

        assert!(cache.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(first.cities().len(), 3);
    }

    #[test]
    fn empty_source_fails_and_is_not_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(Box::new(CountingSource {
            loads: Arc::clone(&loads),
            rows: 0,
        }));

        assert!(matches!(
            cache.get_or_load(&null_progress()),
            Err(DatasetError::Empty { .. })
        ));
        assert!(cache.get_or_load(&null_progress()).is_err());
        assert!(!cache.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
