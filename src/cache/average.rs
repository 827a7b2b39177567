//! The averaging caches: [`AverageCache`] and [`AgeWeightedCache`].

use std::collections::{HashMap, HashSet};

use super::{CacheEntry, CacheSnapshot, PhenotypeCache};
use crate::search::GenomeId;

#[derive(Debug, Clone, PartialEq)]
struct Accumulator {
    sum: Vec<f64>,
    count: u32,
}

impl Accumulator {
    fn mean(&self) -> Vec<f64> {
        let n = self.count.max(1) as f64;
        self.sum.iter().map(|v| v / n).collect()
    }

    fn absorb(&mut self, phenotype: &[f64]) {
        for (acc, &v) in self.sum.iter_mut().zip(phenotype) {
            *acc += v;
        }
        self.count += 1;
    }
}

/// Accumulates every observed phenotype per genome; `get` returns the
/// pointwise mean of all observations.
///
/// `get_ready` always answers `None`: the engine re-evaluates every genome
/// every generation and the new observation is folded into the running
/// average before scoring. One extra evaluation per genome per generation
/// buys a smoothed fitness signal for noisy evaluators.
#[derive(Debug, Default)]
pub struct AverageCache {
    entries: HashMap<GenomeId, Accumulator>,
}

impl AverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn mean_of(&self, id: GenomeId) -> Option<Vec<f64>> {
        self.entries.get(&id).map(Accumulator::mean)
    }

    fn accumulate(&mut self, id: GenomeId, phenotype: Vec<f64>) {
        match self.entries.get_mut(&id) {
            Some(acc) => acc.absorb(&phenotype),
            None => {
                self.entries.insert(
                    id,
                    Accumulator {
                        sum: phenotype,
                        count: 1,
                    },
                );
            }
        }
    }

    fn observation_count(&self, id: GenomeId) -> u32 {
        self.entries.get(&id).map_or(0, |acc| acc.count)
    }

    fn export_entries(&self) -> CacheSnapshot {
        self.entries
            .iter()
            .map(|(&id, acc)| {
                (
                    id,
                    CacheEntry::Accumulated {
                        sum: acc.sum.clone(),
                        count: acc.count,
                    },
                )
            })
            .collect()
    }

    fn import_entries(&mut self, snapshot: CacheSnapshot) {
        self.entries = snapshot
            .into_iter()
            .map(|(id, entry)| match entry {
                // Plain entries lift to a single observation.
                CacheEntry::Plain(p) => (id, Accumulator { sum: p, count: 1 }),
                CacheEntry::Accumulated { sum, count } => (id, Accumulator { sum, count }),
            })
            .collect();
    }
}

impl PhenotypeCache for AverageCache {
    fn get_ready(&self, _id: GenomeId) -> Option<Vec<f64>> {
        None
    }

    fn get(&mut self, id: GenomeId) -> Option<Vec<f64>> {
        self.mean_of(id)
    }

    fn set(&mut self, id: GenomeId, phenotype: Vec<f64>) {
        self.accumulate(id, phenotype);
    }

    fn clear_except(&mut self, keep: &HashSet<GenomeId>) {
        self.entries.retain(|id, _| keep.contains(id));
    }

    fn export(&self) -> CacheSnapshot {
        self.export_entries()
    }

    fn import(&mut self, snapshot: CacheSnapshot) {
        self.import_entries(snapshot);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// An [`AverageCache`] whose reads are corrected toward the population-wide
/// mean phenotype, with a correction that shrinks as a genome ages.
///
/// `get(id)` returns
/// `own_mean - (own_mean - population_mean) * weight / count`:
/// a genome observed once (count = 1, weight = 1.0) reads as the population
/// mean; a long-lived genome reads as its own average, barely adjusted.
/// The population mean is recomputed lazily on the first `get` after any
/// `set`.
#[derive(Debug)]
pub struct AgeWeightedCache {
    inner: AverageCache,
    weight: f64,
    /// Invalidated by every `set`, rebuilt by the next `get`.
    population_mean: Option<Vec<f64>>,
}

impl AgeWeightedCache {
    pub fn new(weight: f64) -> Self {
        Self {
            inner: AverageCache::new(),
            weight,
            population_mean: None,
        }
    }

    /// Pointwise mean of every cached genome's average phenotype.
    fn compute_population_mean(&self) -> Option<Vec<f64>> {
        let mut iter = self.inner.entries.values();
        let first = iter.next()?;
        let mut acc = first.mean();
        let mut n = 1usize;
        for entry in iter {
            for (slot, v) in acc.iter_mut().zip(entry.mean()) {
                *slot += v;
            }
            n += 1;
        }
        for slot in acc.iter_mut() {
            *slot /= n as f64;
        }
        Some(acc)
    }

    fn population_mean(&mut self) -> Option<Vec<f64>> {
        if self.population_mean.is_none() {
            self.population_mean = self.compute_population_mean();
        }
        self.population_mean.clone()
    }
}

impl PhenotypeCache for AgeWeightedCache {
    fn get_ready(&self, id: GenomeId) -> Option<Vec<f64>> {
        self.inner.get_ready(id)
    }

    fn get(&mut self, id: GenomeId) -> Option<Vec<f64>> {
        let own = self.inner.mean_of(id)?;
        let count = self.inner.observation_count(id);
        match self.population_mean() {
            Some(pop) => {
                let shrink = self.weight / count.max(1) as f64;
                Some(
                    own.iter()
                        .zip(pop)
                        .map(|(&o, p)| o - (o - p) * shrink)
                        .collect(),
                )
            }
            // Empty cache: fall back to the plain running average.
            None => Some(own),
        }
    }

    fn set(&mut self, id: GenomeId, phenotype: Vec<f64>) {
        self.population_mean = None;
        self.inner.accumulate(id, phenotype);
    }

    fn clear_except(&mut self, keep: &HashSet<GenomeId>) {
        self.population_mean = None;
        self.inner.clear_except(keep);
    }

    fn export(&self) -> CacheSnapshot {
        self.inner.export_entries()
    }

    fn import(&mut self, snapshot: CacheSnapshot) {
        self.population_mean = None;
        self.inner.import_entries(snapshot);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
