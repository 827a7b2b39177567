//! Multi-population composed search.
//!
//! A [`ComposedSearch`] runs `k` independent "eliminator" engines whose
//! only role is to surface a best genome each generation, plus one "final"
//! engine that absorbs those champions. All sub-engines share one strategy
//! set and one id generator (so ids never collide); each owns its own
//! population, cache, and statistics.

use super::config::{FitOptions, FitReport, Partitions, SearchConfig};
use super::engine::GeneticSearch;
use super::types::{Genome, IdGenerator, StrategySet};
use crate::cache::CacheSnapshot;
use crate::error::{EngineError, Result};
use crate::stats::PopulationSummary;

/// Configuration for a [`ComposedSearch`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComposedConfig {
    /// Number of eliminator engines.
    pub eliminators: usize,
    /// Configuration of each eliminator engine.
    pub eliminator: SearchConfig,
    /// Configuration of the final engine.
    pub finalist: SearchConfig,
}

impl ComposedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.eliminators == 0 {
            return Err(EngineError::InvalidConfig(
                "a composed search needs at least one eliminator".into(),
            ));
        }
        self.eliminator.validate()?;
        self.finalist.validate()
    }
}

/// `k` eliminator engines feeding their champions into one final engine.
pub struct ComposedSearch<G: Genome> {
    eliminators: Vec<GeneticSearch<G>>,
    finalist: GeneticSearch<G>,
}

impl<G: Genome> ComposedSearch<G> {
    /// Builds the eliminator and final engines from one shared strategy
    /// set and a single id generator.
    pub fn new(config: ComposedConfig, strategies: StrategySet<G>) -> Result<Self> {
        config.validate()?;
        let ids = IdGenerator::new();

        let eliminators = (0..config.eliminators)
            .map(|i| {
                // Derive distinct seeds so eliminators explore independently.
                let sub = match config.eliminator.seed {
                    Some(seed) => config.eliminator.clone().with_seed(seed + i as u64),
                    None => config.eliminator.clone(),
                };
                GeneticSearch::with_id_generator(sub, strategies.clone(), ids.clone())
            })
            .collect::<Result<Vec<_>>>()?;
        let finalist = GeneticSearch::with_id_generator(config.finalist, strategies, ids)?;

        Ok(Self { eliminators, finalist })
    }

    /// The final engine (fitness, summary, and cache reporting delegate
    /// to it).
    pub fn final_engine(&self) -> &GeneticSearch<G> {
        &self.finalist
    }

    pub fn eliminators(&self) -> &[GeneticSearch<G>] {
        &self.eliminators
    }

    /// Sum of the eliminators' breeding partitions.
    pub fn partitions(&self) -> Partitions {
        self.eliminators
            .iter()
            .map(GeneticSearch::partitions)
            .fold(Partitions::default(), |acc, p| acc + p)
    }

    /// The composed population: the final population (capped at its
    /// configured size) followed by every eliminator's population.
    pub fn population(&self) -> Vec<&G> {
        let cap = self.finalist.config().population_size;
        self.finalist
            .population()
            .iter()
            .take(cap)
            .chain(self.eliminators.iter().flat_map(|e| e.population().iter()))
            .collect()
    }

    /// The best genome of the final engine's last step.
    pub fn best(&self) -> Option<&G> {
        self.finalist.best()
    }

    /// Population summary of the final engine.
    pub fn summary(&self) -> PopulationSummary {
        self.finalist.summary()
    }

    /// Evaluation-cache snapshot of the final engine.
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        self.finalist.cache_snapshot()
    }

    /// Advances every sub-engine one generation.
    ///
    /// Each eliminator runs a full step; their rank-0 genomes are merged
    /// into the final engine's buffer (de-duplicated by id, first
    /// occurrence winning), and the final engine then steps on the merged
    /// population. Returns the final engine's ranked fitness column.
    pub fn fit_step(&mut self) -> Result<Vec<f64>> {
        let mut champions = Vec::with_capacity(self.eliminators.len());
        for eliminator in &mut self.eliminators {
            eliminator.fit_step()?;
            if let Some(best) = eliminator.best() {
                champions.push(best.clone());
            }
        }
        self.finalist.merge_into_buffer(champions);
        self.finalist.fit_step()
    }

    /// Runs composed generation steps; see
    /// [`GeneticSearch::fit`] for the looping semantics. Callbacks and the
    /// stop predicate observe the final engine.
    pub fn fit(&mut self, mut options: FitOptions<'_>) -> Result<FitReport> {
        let mut steps = 0;
        loop {
            if let Some(limit) = options.generations {
                if steps >= limit {
                    break;
                }
            }
            if let Some(before) = options.before_step.as_mut() {
                before(self.finalist.generation());
            }
            let fitness_column = self.fit_step()?;
            steps += 1;
            if let Some(after) = options.after_step.as_mut() {
                after(self.finalist.generation(), &self.finalist.summary());
            }
            if let Some(stop) = options.stop_when.as_mut() {
                if stop(&fitness_column) {
                    return Ok(FitReport {
                        generations: steps,
                        stopped: true,
                    });
                }
            }
        }
        Ok(FitReport {
            generations: steps,
            stopped: false,
        })
    }
}
