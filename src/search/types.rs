//! Core trait definitions for the search engine.
//!
//! The engine is generic over an opaque, user-defined [`Genome`] type and a
//! set of pluggable capability contracts — one trait per concern, injected
//! at construction through a [`StrategySet`]. Built-in behaviors are plain
//! concrete types; there is no inheritance hierarchy, only composition over
//! these seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::RngCore;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cache::PhenotypeCache;
use crate::error::{EngineError, Result};
use crate::num::normalize_matrix;

/// Unique genome identifier. Minted by an [`IdGenerator`]; never reused
/// within a run.
pub type GenomeId = u64;

/// A candidate solution.
///
/// Genomes are opaque to the engine apart from their id, which is immutable
/// after creation. Lineage statistics are kept outside the genome, in the
/// engine's stats side table.
pub trait Genome: Clone + Send + Sync {
    fn id(&self) -> GenomeId;
}

/// One genome zipped with its evaluation results.
///
/// Exists only within a generation step's scope — produced after scoring,
/// consumed by sorting, the scheduler, and breeding. Never persisted.
#[derive(Debug, Clone)]
pub struct Evaluated<G: Genome> {
    pub genome: G,
    pub fitness: f64,
    pub phenotype: Vec<f64>,
}

/// Monotonic id source, shareable across engines.
///
/// Cloning yields a handle to the same counter: a composed search hands one
/// generator to every sub-engine so ids never collide. The counter is
/// append-only; atomic increments are the only synchronization.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: Arc<AtomicU64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next id.
    pub fn next_id(&self) -> GenomeId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Rebases the counter past every id in `existing` (max + 1), so
    /// freshly minted ids cannot collide with an injected population.
    pub fn reset<I>(&self, existing: I)
    where
        I: IntoIterator<Item = GenomeId>,
    {
        let next = existing.into_iter().max().map_or(0, |max| max + 1);
        self.next.store(next, Ordering::Relaxed);
    }

    /// The id the next call to [`next_id`](Self::next_id) would return.
    pub fn peek(&self) -> GenomeId {
        self.next.load(Ordering::Relaxed)
    }
}

/// Produces the initial population.
pub trait PopulateStrategy<G: Genome>: Send + Sync {
    fn populate(&self, size: usize, ids: &IdGenerator, rng: &mut dyn RngCore) -> Vec<G>;
}

/// Derives a mutated child from a single parent.
pub trait MutationStrategy<G: Genome>: Send + Sync {
    fn mutate(&self, parent: &G, child_id: GenomeId, rng: &mut dyn RngCore) -> G;
}

/// Combines a parent group into one child.
pub trait CrossoverStrategy<G: Genome>: Send + Sync {
    fn cross(&self, parents: &[&G], child_id: GenomeId, rng: &mut dyn RngCore) -> G;
}

/// Evaluates genomes into phenotype vectors, through the cache.
///
/// Implementors supply [`run_task`](Self::run_task) — the expensive
/// per-genome measurement. The provided [`collect`](Self::collect) owns the
/// cache protocol and is what the engine calls.
pub trait PhenotypeStrategy<G: Genome>: Send + Sync {
    /// Evaluates one genome. May run on a rayon worker; must not assume any
    /// ordering relative to other tasks.
    ///
    /// # Errors
    /// A task error fails the whole collection (and the step). The core
    /// never retries.
    fn run_task(&self, genome: &G) -> Result<Vec<f64>>;

    /// Collects the phenotype matrix for a population.
    ///
    /// Genomes the cache reports ready are skipped; the rest are evaluated
    /// (in parallel under the `parallel` feature), their results written to
    /// the cache, and every genome is then re-read *through* the cache with
    /// the freshly computed vector as fallback — so averaging caches apply
    /// their blending uniformly, including to fresh values.
    fn collect(
        &self,
        population: &[G],
        cache: &mut dyn PhenotypeCache,
    ) -> Result<Vec<Vec<f64>>> {
        let pending: Vec<&G> = population
            .iter()
            .filter(|g| cache.get_ready(g.id()).is_none())
            .collect();

        #[cfg(feature = "parallel")]
        let computed: Result<Vec<(GenomeId, Vec<f64>)>> = pending
            .par_iter()
            .map(|&g| self.run_task(g).map(|p| (g.id(), p)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let computed: Result<Vec<(GenomeId, Vec<f64>)>> = pending
            .iter()
            .map(|&g| self.run_task(g).map(|p| (g.id(), p)))
            .collect();

        let mut fresh: HashMap<GenomeId, Vec<f64>> = computed?.into_iter().collect();
        for (&id, phenotype) in &fresh {
            cache.set(id, phenotype.clone());
        }

        population
            .iter()
            .map(|g| {
                cache
                    .get(g.id())
                    .or_else(|| fresh.remove(&g.id()))
                    .ok_or_else(|| {
                        EngineError::Evaluation(format!("no phenotype for genome {}", g.id()))
                    })
            })
            .collect()
    }
}

/// Derives the fitness column from a phenotype matrix.
pub trait FitnessStrategy: Send + Sync {
    /// One fitness per matrix row, in row order.
    fn score(&self, phenotypes: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// Built-in fitness: weighted sum over the row-wise min–max-normalized
/// phenotype matrix.
#[derive(Debug, Clone)]
pub struct WeightedSumFitness {
    weights: Vec<f64>,
}

impl WeightedSumFitness {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }
}

impl FitnessStrategy for WeightedSumFitness {
    fn score(&self, phenotypes: &[Vec<f64>]) -> Result<Vec<f64>> {
        normalize_matrix(phenotypes)
            .iter()
            .map(|row| {
                if row.len() != self.weights.len() {
                    return Err(EngineError::LengthMismatch {
                        what: "phenotype row vs fitness weights",
                        expected: self.weights.len(),
                        actual: row.len(),
                    });
                }
                Ok(row.iter().zip(&self.weights).map(|(v, w)| v * w).sum())
            })
            .collect()
    }
}

/// Orders evaluated genomes into the generation's ranking (rank 0 = best).
pub trait SortStrategy<G: Genome>: Send + Sync {
    fn sort(&self, evaluated: &mut [Evaluated<G>]);
}

/// Rank by descending fitness (maximization).
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessDescending;

impl<G: Genome> SortStrategy<G> for FitnessDescending {
    fn sort(&self, evaluated: &mut [Evaluated<G>]) {
        evaluated.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }
}

/// Rank by ascending fitness (minimization).
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessAscending;

impl<G: Genome> SortStrategy<G> for FitnessAscending {
    fn sort(&self, evaluated: &mut [Evaluated<G>]) {
        evaluated.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
    }
}

/// The full pluggable strategy set of one engine.
///
/// All strategies are shared handles: cloning a `StrategySet` clones the
/// `Arc`s, which is how a composed search gives every sub-engine the
/// identical strategies.
pub struct StrategySet<G: Genome> {
    pub populate: Arc<dyn PopulateStrategy<G>>,
    pub mutation: Arc<dyn MutationStrategy<G>>,
    pub crossover: Arc<dyn CrossoverStrategy<G>>,
    pub phenotype: Arc<dyn PhenotypeStrategy<G>>,
    pub fitness: Arc<dyn FitnessStrategy>,
    pub sort: Arc<dyn SortStrategy<G>>,
}

impl<G: Genome> Clone for StrategySet<G> {
    fn clone(&self) -> Self {
        Self {
            populate: Arc::clone(&self.populate),
            mutation: Arc::clone(&self.mutation),
            crossover: Arc::clone(&self.crossover),
            phenotype: Arc::clone(&self.phenotype),
            fitness: Arc::clone(&self.fitness),
            sort: Arc::clone(&self.sort),
        }
    }
}

impl<G: Genome> StrategySet<G> {
    /// Assembles a strategy set with the default descending-fitness sort.
    pub fn new(
        populate: Arc<dyn PopulateStrategy<G>>,
        mutation: Arc<dyn MutationStrategy<G>>,
        crossover: Arc<dyn CrossoverStrategy<G>>,
        phenotype: Arc<dyn PhenotypeStrategy<G>>,
        fitness: Arc<dyn FitnessStrategy>,
    ) -> Self {
        Self {
            populate,
            mutation,
            crossover,
            phenotype,
            fitness,
            sort: Arc::new(FitnessDescending),
        }
    }

    /// Replaces the sort strategy.
    pub fn with_sort(mut self, sort: Arc<dyn SortStrategy<G>>) -> Self {
        self.sort = sort;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AverageCache, DummyCache, SimpleCache};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct TestGenome {
        pub id: GenomeId,
        pub value: f64,
    }

    impl Genome for TestGenome {
        fn id(&self) -> GenomeId {
            self.id
        }
    }

    struct SquareTask;

    impl PhenotypeStrategy<TestGenome> for SquareTask {
        fn run_task(&self, genome: &TestGenome) -> Result<Vec<f64>> {
            Ok(vec![genome.value * genome.value])
        }
    }

    struct FailingTask;

    impl PhenotypeStrategy<TestGenome> for FailingTask {
        fn run_task(&self, genome: &TestGenome) -> Result<Vec<f64>> {
            Err(EngineError::Evaluation(format!("task {} refused", genome.id)))
        }
    }

    fn population(values: &[f64]) -> Vec<TestGenome> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| TestGenome {
                id: i as GenomeId,
                value,
            })
            .collect()
    }

    // ---- IdGenerator ----

    #[test]
    fn test_id_generator_monotonic() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn test_id_generator_shared_across_clones() {
        let ids = IdGenerator::new();
        let other = ids.clone();
        ids.next_id();
        other.next_id();
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn test_id_generator_reset_past_existing() {
        let ids = IdGenerator::new();
        ids.reset([3, 17, 5]);
        assert_eq!(ids.next_id(), 18);
        ids.reset(std::iter::empty());
        assert_eq!(ids.next_id(), 0);
    }

    // ---- collect through caches ----

    #[test]
    fn test_collect_with_dummy_cache_uses_fresh_values() {
        let pop = population(&[1.0, 2.0, 3.0]);
        let mut cache = DummyCache::new();
        let matrix = SquareTask.collect(&pop, &mut cache).unwrap();
        assert_eq!(matrix, vec![vec![1.0], vec![4.0], vec![9.0]]);
    }

    #[test]
    fn test_collect_skips_ready_genomes() {
        let pop = population(&[1.0, 2.0]);
        let mut cache = SimpleCache::new();
        // Pre-seed genome 0 with a value the task would not produce.
        cache.set(0, vec![42.0]);
        let matrix = SquareTask.collect(&pop, &mut cache).unwrap();
        assert_eq!(matrix[0], vec![42.0]);
        assert_eq!(matrix[1], vec![4.0]);
    }

    #[test]
    fn test_collect_blends_through_average_cache() {
        let pop = population(&[2.0]);
        let mut cache = AverageCache::new();
        cache.set(0, vec![0.0]);
        // Fresh observation 4.0 is folded into the running average before
        // scoring: (0 + 4) / 2.
        let matrix = SquareTask.collect(&pop, &mut cache).unwrap();
        assert_eq!(matrix, vec![vec![2.0]]);
    }

    #[test]
    fn test_collect_propagates_task_failure() {
        let pop = population(&[1.0]);
        let mut cache = DummyCache::new();
        let err = FailingTask.collect(&pop, &mut cache).unwrap_err();
        assert!(matches!(err, EngineError::Evaluation(_)));
    }

    // ---- fitness ----

    #[test]
    fn test_weighted_sum_fitness() {
        let fitness = WeightedSumFitness::new(vec![1.0, 2.0]);
        let scores = fitness
            .score(&[vec![0.0, 10.0], vec![10.0, 0.0]])
            .unwrap();
        // Rows normalize to [0, 1] and [1, 0].
        assert!((scores[0] - 2.0).abs() < 1e-12);
        assert!((scores[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_sum_rejects_bad_row() {
        let fitness = WeightedSumFitness::new(vec![1.0, 2.0]);
        let err = fitness.score(&[vec![1.0]]).unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch { .. }));
    }

    // ---- sort ----

    fn evaluated(fitness: &[f64]) -> Vec<Evaluated<TestGenome>> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| Evaluated {
                genome: TestGenome {
                    id: i as GenomeId,
                    value: 0.0,
                },
                fitness: f,
                phenotype: vec![],
            })
            .collect()
    }

    #[test]
    fn test_sort_descending() {
        let mut rows = evaluated(&[1.0, 3.0, 2.0]);
        SortStrategy::sort(&FitnessDescending, &mut rows);
        let order: Vec<f64> = rows.iter().map(|e| e.fitness).collect();
        assert_eq!(order, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sort_ascending() {
        let mut rows = evaluated(&[1.0, 3.0, 2.0]);
        SortStrategy::sort(&FitnessAscending, &mut rows);
        let order: Vec<f64> = rows.iter().map(|e| e.fitness).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
    }
}
