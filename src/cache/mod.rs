//! Evaluation cache family.
//!
//! Caches memoize phenotype vectors by genome id so that expensive
//! evaluation tasks are only run when a cache cannot answer. Entries
//! persist across generations until evicted by id-exclusion
//! ([`PhenotypeCache::clear_except`]), which the engine performs at the end
//! of every step with the live population's ids — bounding cache memory to
//! the live lineage.
//!
//! # Cache kinds
//!
//! - [`DummyCache`]: never stores anything; every genome is re-evaluated
//!   every step.
//! - [`SimpleCache`]: stores the most recent phenotype verbatim.
//! - [`AverageCache`]: accumulates a running sum per genome; `get` returns
//!   the pointwise mean. It reports nothing as "ready", forcing one fresh
//!   evaluation per genome per generation in exchange for a smoothed
//!   fitness signal.
//! - [`AgeWeightedCache`]: an [`AverageCache`] that additionally pulls
//!   rarely-observed genomes toward the population-wide mean phenotype,
//!   with a correction that shrinks as a genome accumulates observations.
//!
//! # Snapshots
//!
//! [`PhenotypeCache::export`] and [`import`](PhenotypeCache::import) move
//! whole cache contents as a [`CacheSnapshot`]; caches convert entry shapes
//! on import, so an export→import round-trip into a fresh cache of the same
//! kind reproduces identical `get` results.

mod average;
mod simple;

pub use average::{AgeWeightedCache, AverageCache};
pub use simple::{DummyCache, SimpleCache};

use std::collections::{HashMap, HashSet};

use crate::search::GenomeId;

/// One exported cache entry.
///
/// `Plain` carries a phenotype verbatim; `Accumulated` carries a running
/// sum with its observation count. Caches convert between the two on
/// import: a plain entry lifts to count 1, an accumulated entry collapses
/// to its mean.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CacheEntry {
    Plain(Vec<f64>),
    Accumulated { sum: Vec<f64>, count: u32 },
}

/// Wholesale cache contents, keyed by genome id.
pub type CacheSnapshot = HashMap<GenomeId, CacheEntry>;

/// Contract shared by the cache family.
///
/// `get` is the scoring read: callers keep the freshly computed phenotype
/// around and fall back to it when `get` returns `None` (the dummy cache
/// always does). `get_ready` answers only when the cache can do so without
/// triggering a recomputation — averaging caches deliberately never can.
pub trait PhenotypeCache: Send {
    /// The phenotype for `id`, if this cache can answer without a fresh
    /// evaluation.
    fn get_ready(&self, id: GenomeId) -> Option<Vec<f64>>;

    /// The phenotype this cache reports for `id`. `None` means the caller
    /// must fall back to its own value.
    ///
    /// Takes `&mut self`: the age-weighted cache refreshes its lazily
    /// computed population mean here.
    fn get(&mut self, id: GenomeId) -> Option<Vec<f64>>;

    /// Records an observed phenotype for `id`.
    fn set(&mut self, id: GenomeId, phenotype: Vec<f64>);

    /// Evicts every entry whose id is not in `keep`.
    fn clear_except(&mut self, keep: &HashSet<GenomeId>);

    /// Exports the full cache contents.
    fn export(&self) -> CacheSnapshot;

    /// Replaces the cache contents wholesale.
    fn import(&mut self, snapshot: CacheSnapshot);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Config-level cache selector with one variant per built-in kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CacheKind {
    /// No caching: every genome is evaluated every generation.
    #[default]
    Dummy,
    /// Last observed phenotype, verbatim.
    Simple,
    /// Running average of all observed phenotypes.
    Average,
    /// Running average with an age-shrinking pull toward the population
    /// mean. `weight` scales the pull (1.0 moves a first observation all
    /// the way to the population mean).
    AgeWeighted { weight: f64 },
}

impl CacheKind {
    /// Builds a fresh cache of this kind.
    pub fn build(&self) -> Box<dyn PhenotypeCache> {
        match *self {
            CacheKind::Dummy => Box::new(DummyCache::new()),
            CacheKind::Simple => Box::new(SimpleCache::new()),
            CacheKind::Average => Box::new(AverageCache::new()),
            CacheKind::AgeWeighted { weight } => Box::new(AgeWeightedCache::new(weight)),
        }
    }
}
