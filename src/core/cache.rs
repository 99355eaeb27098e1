// =============================================================================
// CACHE — Mémoïsation optionnelle des requêtes
// =============================================================================
//
// Toutes les requêtes sont référentiellement transparentes pour un Dataset
// donné : on peut donc mémoriser leur résultat, indexé par le descripteur
// `Query`. Le cache ne change jamais un résultat ; il évite seulement de
// rescanner le Dataset quand la même sélection revient.
//
// Le moteur (eval) ne connaît pas ce module : le cache est un simple
// enrobage que l'appelant choisit d'utiliser ou non.
//
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::dataset::Dataset;
use super::eval;
use super::query::{LocationTotal, Query, QueryOutput, SharedOutput, YearAmount, YearRange};

/// Compteurs du cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Enrobage mémoïsant d'un Dataset partagé.
#[derive(Debug)]
pub struct QueryCache {
    dataset: Arc<Dataset>,
    entries: Mutex<HashMap<Query, SharedOutput>>,
    /// Nombre maximal d'entrées ; au-delà, le cache est vidé
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_capacity(dataset, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(dataset: Arc<Dataset>, capacity: usize) -> Self {
        QueryCache {
            dataset,
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Évalue la requête, ou rend le résultat déjà calculé.
    ///
    /// Le verrou n'est pas tenu pendant l'évaluation : deux threads peuvent
    /// calculer la même requête en parallèle, le premier arrivé la stocke.
    pub fn get(&self, query: &Query) -> SharedOutput {
        if let Some(hit) = self.entries.lock().get(query) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%query, "cache hit");
            return Arc::clone(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let output = Arc::new(eval::run(query, &self.dataset));

        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(query) {
            debug!(entries = entries.len(), "cache plein, vidage");
            entries.clear();
        }
        Arc::clone(entries.entry(query.clone()).or_insert(output))
    }

    /// Requête A via le cache.
    pub fn aggregate_by_location(&self, years: YearRange) -> Vec<LocationTotal> {
        match &*self.get(&Query::location_totals(years)) {
            QueryOutput::Locations(rows) => rows.clone(),
            _ => Vec::new(),
        }
    }

    /// Requête B via le cache.
    pub fn aggregate_time_series(&self, item: &str, years: YearRange, country: Option<&str>) -> Vec<YearAmount> {
        match &*self.get(&Query::time_series(item, years, country)) {
            QueryOutput::Series(points) => points.clone(),
            _ => Vec::new(),
        }
    }

    pub fn list_known_items(&self) -> Vec<String> {
        match &*self.get(&Query::KnownItems) {
            QueryOutput::Items(items) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::Record;

    fn shared() -> Arc<Dataset> {
        Arc::new(
            Dataset::from_records(
                "test",
                YearRange::new(1961, 2013),
                vec![
                    Record::new("Brazil", "Eggs", -14.24, -51.93, 1990, 10.0),
                    Record::new("Brazil", "Eggs", -14.24, -51.93, 1991, 20.0),
                    Record::new("France", "Eggs", 46.23, 2.21, 1990, 5.0),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_cache_matches_engine() {
        let ds = shared();
        let cache = QueryCache::new(Arc::clone(&ds));
        let years = YearRange::new(1990, 1991);

        assert_eq!(cache.aggregate_by_location(years), eval::aggregate_by_location(&ds, years));
        assert_eq!(
            cache.aggregate_time_series("Eggs", years, Some("Brazil")),
            eval::aggregate_time_series(&ds, "Eggs", years, Some("Brazil"))
        );
        assert_eq!(cache.list_known_items(), vec!["Eggs"]);
    }

    #[test]
    fn test_repeated_query_hits() {
        let cache = QueryCache::new(shared());
        let years = YearRange::new(1990, 1991);

        let first = cache.get(&Query::location_totals(years));
        let second = cache.get(&Query::location_totals(years));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1 });
    }

    #[test]
    fn test_distinct_parameters_are_distinct_entries() {
        let cache = QueryCache::new(shared());
        let years = YearRange::new(1990, 1991);
        cache.aggregate_time_series("Eggs", years, None);
        cache.aggregate_time_series("Eggs", years, Some("Brazil"));
        cache.aggregate_time_series("Eggs", YearRange::new(1990, 1990), None);
        assert_eq!(cache.stats().entries, 3);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_capacity_bounds_entries() {
        let cache = QueryCache::with_capacity(shared(), 2);
        for y in 1990..1995 {
            cache.aggregate_by_location(YearRange::single(y));
        }
        assert!(cache.stats().entries <= 2);
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_shared_between_threads() {
        let cache = QueryCache::new(shared());
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let rows = cache.aggregate_by_location(YearRange::new(1990, 1991));
                    assert_eq!(rows.len(), 2);
                });
            }
        });
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 4);
        assert_eq!(stats.entries, 1);
    }
}
