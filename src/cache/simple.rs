//! The non-averaging caches: [`DummyCache`] and [`SimpleCache`].

use std::collections::{HashMap, HashSet};

use super::{CacheEntry, CacheSnapshot, PhenotypeCache};
use crate::search::GenomeId;

/// A cache that never stores anything.
///
/// `get`/`get_ready` always answer `None`, so every genome is evaluated
/// every generation and the caller's own value is always used for scoring.
#[derive(Debug, Default)]
pub struct DummyCache;

impl DummyCache {
    pub fn new() -> Self {
        Self
    }
}

impl PhenotypeCache for DummyCache {
    fn get_ready(&self, _id: GenomeId) -> Option<Vec<f64>> {
        None
    }

    fn get(&mut self, _id: GenomeId) -> Option<Vec<f64>> {
        None
    }

    fn set(&mut self, _id: GenomeId, _phenotype: Vec<f64>) {}

    fn clear_except(&mut self, _keep: &HashSet<GenomeId>) {}

    fn export(&self) -> CacheSnapshot {
        HashMap::new()
    }

    fn import(&mut self, _snapshot: CacheSnapshot) {}

    fn len(&self) -> usize {
        0
    }
}

/// Stores the most recently set phenotype verbatim.
///
/// A genome with a stored phenotype is "ready": it is not re-evaluated on
/// later generations until evicted.
#[derive(Debug, Default)]
pub struct SimpleCache {
    entries: HashMap<GenomeId, Vec<f64>>,
}

impl SimpleCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhenotypeCache for SimpleCache {
    fn get_ready(&self, id: GenomeId) -> Option<Vec<f64>> {
        self.entries.get(&id).cloned()
    }

    fn get(&mut self, id: GenomeId) -> Option<Vec<f64>> {
        self.entries.get(&id).cloned()
    }

    fn set(&mut self, id: GenomeId, phenotype: Vec<f64>) {
        self.entries.insert(id, phenotype);
    }

    fn clear_except(&mut self, keep: &HashSet<GenomeId>) {
        self.entries.retain(|id, _| keep.contains(id));
    }

    fn export(&self) -> CacheSnapshot {
        self.entries
            .iter()
            .map(|(&id, p)| (id, CacheEntry::Plain(p.clone())))
            .collect()
    }

    fn import(&mut self, snapshot: CacheSnapshot) {
        self.entries = snapshot
            .into_iter()
            .map(|(id, entry)| match entry {
                CacheEntry::Plain(p) => (id, p),
                // Accumulated entries collapse to their mean.
                CacheEntry::Accumulated { sum, count } => {
                    let n = count.max(1) as f64;
                    (id, sum.into_iter().map(|v| v / n).collect())
                }
            })
            .collect();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
