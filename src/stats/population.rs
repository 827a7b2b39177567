//! Population-wide aggregates and stagnation tracking.

use crate::num::{range_summary, stat_summary, RangeStatSummary, StatSummary};
use crate::search::GenomeId;
use crate::stats::genome::{GenomeStatsManager, Origin};

/// Fitness summaries bucketed by genome origin.
///
/// Buckets are filtered independently from the ranked population; an empty
/// bucket is the all-zero summary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupedStatSummary {
    pub initial: StatSummary,
    pub crossover: StatSummary,
    pub mutation: StatSummary,
}

/// Snapshot of one generation's population-wide statistics.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationSummary {
    /// Fitness over the whole (stats-bearing) population, in rank order.
    pub fitness: StatSummary,
    /// Fitness bucketed by origin.
    pub grouped_fitness: GroupedStatSummary,
    /// Age range over the population.
    pub age: RangeStatSummary,
    /// Consecutive generations without a change of the rank-0 genome.
    pub stagnation: u32,
}

impl PopulationSummary {
    /// Copy with every float rounded to `digits` decimals
    /// (counts and the stagnation counter untouched).
    pub fn rounded(&self, digits: u32) -> Self {
        Self {
            fitness: self.fitness.rounded(digits),
            grouped_fitness: GroupedStatSummary {
                initial: self.grouped_fitness.initial.rounded(digits),
                crossover: self.grouped_fitness.crossover.rounded(digits),
                mutation: self.grouped_fitness.mutation.rounded(digits),
            },
            age: self.age.rounded(digits),
            stagnation: self.stagnation,
        }
    }
}

/// Per-run singleton that recomputes the [`PopulationSummary`] after each
/// generation's ranking.
///
/// The input must already be in rank order (rank 0 first) — the manager
/// never re-sorts; `best`/`second` are positional reads.
#[derive(Debug, Default)]
pub struct PopulationSummaryManager {
    summary: PopulationSummary,
    best_id: Option<GenomeId>,
}

impl PopulationSummaryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored snapshot from a ranked `(id, fitness)` column.
    ///
    /// The stagnation counter resets to 0 whenever the rank-0 id differs
    /// from the previous generation's, and increments otherwise. Genomes
    /// without a stats record are excluded from every aggregate.
    pub fn update(&mut self, ranked: &[(GenomeId, f64)], stats: &GenomeStatsManager) {
        let stagnation = match (ranked.first(), self.best_id) {
            (Some(&(id, _)), Some(prev)) if id == prev => self.summary.stagnation + 1,
            _ => 0,
        };
        self.best_id = ranked.first().map(|&(id, _)| id);

        let mut fitness_all = Vec::with_capacity(ranked.len());
        let mut by_origin: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut ages = Vec::with_capacity(ranked.len());
        for &(id, fitness) in ranked {
            let Some(record) = stats.get(id) else { continue };
            fitness_all.push(fitness);
            let bucket = match record.origin {
                Origin::Initial => 0,
                Origin::Crossover => 1,
                Origin::Mutation => 2,
            };
            by_origin[bucket].push(fitness);
            ages.push(record.age as f64);
        }

        // Single assignment: readers never observe a partial snapshot.
        self.summary = PopulationSummary {
            fitness: stat_summary(&fitness_all),
            grouped_fitness: GroupedStatSummary {
                initial: stat_summary(&by_origin[0]),
                crossover: stat_summary(&by_origin[1]),
                mutation: stat_summary(&by_origin[2]),
            },
            age: range_summary(&ages),
            stagnation,
        };
    }

    /// Owned copy of the current snapshot. Later updates are never visible
    /// through a previously returned value.
    pub fn get(&self) -> PopulationSummary {
        self.summary.clone()
    }

    /// Owned copy with floats rounded to `digits` decimals.
    pub fn get_rounded(&self, digits: u32) -> PopulationSummary {
        self.summary.rounded(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_stats(ids_fitness: &[(GenomeId, f64)], origins: &[Origin]) -> GenomeStatsManager {
        let mut mgr = GenomeStatsManager::new();
        for (&(id, _), &origin) in ids_fitness.iter().zip(origins) {
            mgr.init_item(id, origin, &[]);
        }
        let ids: Vec<_> = ids_fitness.iter().map(|&(id, _)| id).collect();
        let fitness: Vec<_> = ids_fitness.iter().map(|&(_, f)| f).collect();
        let phenotypes: Vec<_> = fitness.iter().map(|&f| vec![f]).collect();
        mgr.update(&ids, &phenotypes, &fitness).unwrap();
        mgr
    }

    #[test]
    fn test_summary_aggregates() {
        let ranked = [(1, 9.0), (2, 7.0), (3, 5.0), (4, 3.0)];
        let origins = [
            Origin::Initial,
            Origin::Crossover,
            Origin::Crossover,
            Origin::Mutation,
        ];
        let stats = ranked_stats(&ranked, &origins);

        let mut mgr = PopulationSummaryManager::new();
        mgr.update(&ranked, &stats);
        let summary = mgr.get();

        assert_eq!(summary.fitness.count, 4);
        assert!((summary.fitness.best - 9.0).abs() < 1e-12);
        assert!((summary.fitness.second - 7.0).abs() < 1e-12);
        assert!((summary.fitness.worst - 3.0).abs() < 1e-12);

        assert_eq!(summary.grouped_fitness.crossover.count, 2);
        assert!((summary.grouped_fitness.crossover.best - 7.0).abs() < 1e-12);
        assert_eq!(summary.grouped_fitness.initial.count, 1);
        // Single-element bucket: second collapses to best.
        assert!((summary.grouped_fitness.initial.second - 9.0).abs() < 1e-12);

        // All genomes evaluated once.
        assert!((summary.age.min - 1.0).abs() < 1e-12);
        assert!((summary.age.max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_bucket_is_zero() {
        let ranked = [(1, 2.0)];
        let stats = ranked_stats(&ranked, &[Origin::Initial]);
        let mut mgr = PopulationSummaryManager::new();
        mgr.update(&ranked, &stats);
        assert_eq!(mgr.get().grouped_fitness.mutation, StatSummary::default());
    }

    #[test]
    fn test_stagnation_counts_and_resets() {
        let stats = ranked_stats(&[(1, 5.0), (2, 4.0)], &[Origin::Initial, Origin::Initial]);
        let mut mgr = PopulationSummaryManager::new();

        for _ in 0..10 {
            mgr.update(&[(1, 5.0), (2, 4.0)], &stats);
        }
        // First update sees no prior best: 10 updates => counter 9.
        assert_eq!(mgr.get().stagnation, 9);

        // New best id resets.
        mgr.update(&[(2, 6.0), (1, 5.0)], &stats);
        assert_eq!(mgr.get().stagnation, 0);

        mgr.update(&[(2, 6.0), (1, 5.0)], &stats);
        assert_eq!(mgr.get().stagnation, 1);
    }

    #[test]
    fn test_genomes_without_stats_excluded() {
        let stats = ranked_stats(&[(1, 5.0)], &[Origin::Initial]);
        let mut mgr = PopulationSummaryManager::new();
        mgr.update(&[(1, 5.0), (99, 4.0)], &stats);
        assert_eq!(mgr.get().fitness.count, 1);
    }

    #[test]
    fn test_get_returns_detached_copy() {
        let stats = ranked_stats(&[(1, 5.0)], &[Origin::Initial]);
        let mut mgr = PopulationSummaryManager::new();
        mgr.update(&[(1, 5.0)], &stats);
        let before = mgr.get();
        mgr.update(&[(1, 5.0)], &stats);
        assert_eq!(before.stagnation, 0);
        assert_eq!(mgr.get().stagnation, 1);
    }

    #[test]
    fn test_get_rounded() {
        let stats = ranked_stats(&[(1, 1.23456)], &[Origin::Initial]);
        let mut mgr = PopulationSummaryManager::new();
        mgr.update(&[(1, 1.23456)], &stats);
        let rounded = mgr.get_rounded(2);
        assert!((rounded.fitness.best - 1.23).abs() < 1e-12);
        assert_eq!(rounded.fitness.count, 1);
    }

    #[test]
    fn test_empty_population_update() {
        let stats = GenomeStatsManager::new();
        let mut mgr = PopulationSummaryManager::new();
        mgr.update(&[], &stats);
        assert_eq!(mgr.get(), PopulationSummary::default());
    }
}
