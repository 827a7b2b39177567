//! The generational evolution loop.
//!
//! [`GeneticSearch`] owns one population and advances it one generation at
//! a time: promote the buffered population, evaluate through the cache,
//! score, rank, account, give the scheduler its turn, then breed the next
//! buffer from the survivors. All phases of a step are strictly
//! sequential; the only fan-out point is inside the phenotype strategy's
//! `collect`.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use super::config::{FitOptions, FitReport, Partitions, SearchConfig};
use super::types::{Evaluated, Genome, GenomeId, IdGenerator, StrategySet};
use crate::cache::{CacheSnapshot, PhenotypeCache};
use crate::error::{EngineError, Result};
use crate::schedule::Scheduler;
use crate::stats::{GenomeStatsManager, Origin, PopulationSummary, PopulationSummaryManager};

/// Single-population generational search engine.
///
/// The engine alternates between two states: *populated* (a current
/// population exists) and *buffered* (the next generation has been bred
/// into the buffer). Construction populates and mirrors the initial
/// population into the buffer; each [`fit_step`](Self::fit_step) promotes
/// the buffer, runs one generation, and refills it.
pub struct GeneticSearch<G: Genome> {
    config: SearchConfig,
    strategies: StrategySet<G>,
    cache: Box<dyn PhenotypeCache>,
    ids: IdGenerator,
    stats: GenomeStatsManager,
    summary: PopulationSummaryManager,
    scheduler: Option<Scheduler<G>>,
    population: Vec<G>,
    buffer: Vec<G>,
    generation: usize,
    rng: Pcg64Mcg,
}

impl<G: Genome> GeneticSearch<G> {
    /// Builds an engine with its own id generator.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfig`] when the configuration is malformed.
    pub fn new(config: SearchConfig, strategies: StrategySet<G>) -> Result<Self> {
        Self::with_id_generator(config, strategies, IdGenerator::new())
    }

    /// Builds an engine sharing an external id generator (used by
    /// [`ComposedSearch`](crate::search::ComposedSearch) so ids never
    /// collide across sub-engines).
    pub fn with_id_generator(
        config: SearchConfig,
        strategies: StrategySet<G>,
        ids: IdGenerator,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::seed_from_u64(rand::random()),
        };
        let cache = config.cache.build();

        let population = strategies
            .populate
            .populate(config.population_size, &ids, &mut rng);
        let mut stats = GenomeStatsManager::new();
        stats.init(population.iter().map(Genome::id), Origin::Initial);
        let buffer = population.clone();

        Ok(Self {
            config,
            strategies,
            cache,
            ids,
            stats,
            summary: PopulationSummaryManager::new(),
            scheduler: None,
            population,
            buffer,
            generation: 0,
            rng,
        })
    }

    /// Attaches a scheduler, invoked once per generation after ranking.
    pub fn attach_scheduler(&mut self, scheduler: Scheduler<G>) {
        self.scheduler = Some(scheduler);
    }

    pub fn scheduler(&self) -> Option<&Scheduler<G>> {
        self.scheduler.as_ref()
    }

    /// The current population, in the ordering produced by the last step's
    /// sort strategy (construction order before the first step).
    pub fn population(&self) -> &[G] {
        &self.population
    }

    /// The rank-0 genome of the last completed step.
    pub fn best(&self) -> Option<&G> {
        self.population.first()
    }

    /// Completed generation steps.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// The current breeding split of the configured population size.
    pub fn partitions(&self) -> Partitions {
        self.config.partitions()
    }

    /// Snapshot of the last generation's population statistics.
    pub fn summary(&self) -> PopulationSummary {
        self.summary.get()
    }

    /// Like [`summary`](Self::summary), rounded to the configured
    /// precision.
    pub fn summary_rounded(&self) -> PopulationSummary {
        self.summary.get_rounded(self.config.summary_precision)
    }

    /// Per-genome lineage records of the live population.
    pub fn stats(&self) -> &GenomeStatsManager {
        &self.stats
    }

    /// A handle to this engine's id generator.
    pub fn id_generator(&self) -> IdGenerator {
        self.ids.clone()
    }

    /// Exports the evaluation cache contents.
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        self.cache.export()
    }

    /// Replaces the evaluation cache contents wholesale.
    pub fn restore_cache(&mut self, snapshot: CacheSnapshot) {
        self.cache.import(snapshot);
    }

    /// Injects an external population into the next-generation buffer.
    ///
    /// With `reset_ids`, the id generator is rebased past the injected
    /// ids so freshly minted ids cannot collide.
    pub fn set_population(&mut self, population: Vec<G>, reset_ids: bool) {
        if reset_ids {
            self.ids.reset(population.iter().map(Genome::id));
        }
        self.buffer = population;
    }

    /// Merges genomes into the buffer, de-duplicating by id.
    ///
    /// First occurrence wins and positions are preserved: a genome already
    /// buffered shadows an incoming one with the same id.
    pub(crate) fn merge_into_buffer(&mut self, incoming: Vec<G>) {
        let mut seen: HashSet<GenomeId> = self.buffer.iter().map(Genome::id).collect();
        for genome in incoming {
            if seen.insert(genome.id()) {
                self.buffer.push(genome);
            }
        }
    }

    /// Advances one generation and returns the ranked fitness column.
    ///
    /// # Errors
    /// Strategy-contract violations ([`EngineError::LengthMismatch`]),
    /// evaluation-task failures, and scheduler action errors abort the
    /// step. Prior generations stay valid and queryable.
    pub fn fit_step(&mut self) -> Result<Vec<f64>> {
        // Promote the buffer; it is refilled at the end of the step.
        self.population = std::mem::take(&mut self.buffer);
        if self.population.is_empty() {
            return Err(EngineError::EmptyPopulation);
        }

        let matrix = self
            .strategies
            .phenotype
            .collect(&self.population, self.cache.as_mut())?;
        if matrix.len() != self.population.len() {
            return Err(EngineError::LengthMismatch {
                what: "phenotype matrix",
                expected: self.population.len(),
                actual: matrix.len(),
            });
        }

        let fitness = self.strategies.fitness.score(&matrix)?;
        if fitness.len() != self.population.len() {
            return Err(EngineError::LengthMismatch {
                what: "fitness column",
                expected: self.population.len(),
                actual: fitness.len(),
            });
        }

        let ids: Vec<GenomeId> = self.population.iter().map(Genome::id).collect();
        self.stats.update(&ids, &matrix, &fitness)?;

        let mut evaluated: Vec<Evaluated<G>> = self
            .population
            .drain(..)
            .zip(fitness)
            .zip(matrix)
            .map(|((genome, fitness), phenotype)| Evaluated {
                genome,
                fitness,
                phenotype,
            })
            .collect();
        self.strategies.sort.sort(&mut evaluated);

        let ranked: Vec<(GenomeId, f64)> = evaluated
            .iter()
            .map(|e| (e.genome.id(), e.fitness))
            .collect();
        self.summary.update(&ranked, &self.stats);

        if let Some(mut scheduler) = self.scheduler.take() {
            let snapshot = self.summary.get();
            let outcome = scheduler.step(&mut self.config, &mut evaluated, &snapshot);
            self.scheduler = Some(scheduler);
            outcome?;
        }

        self.breed(&evaluated);

        let fitness_column: Vec<f64> = evaluated.iter().map(|e| e.fitness).collect();
        self.population = evaluated.into_iter().map(|e| e.genome).collect();
        self.generation += 1;
        self.prune_lineage();

        log::debug!(
            target: "evosearch::engine",
            "generation {} complete, best fitness {:?}",
            self.generation,
            fitness_column.first()
        );
        Ok(fitness_column)
    }

    /// Fills the buffer with survivors plus bred children.
    fn breed(&mut self, evaluated: &[Evaluated<G>]) {
        let partitions = self.config.partitions();
        // The scheduler may have culled below the configured size.
        let survive = partitions.survive.min(evaluated.len());
        let survivors = &evaluated[..survive];

        let mut next: Vec<G> = survivors.iter().map(|e| e.genome.clone()).collect();
        if survivors.is_empty() {
            // Nothing to breed from; the next step reports the empty
            // population instead of panicking inside selection.
            self.buffer = next;
            return;
        }

        let groups = self.config.selection.parent_groups(
            survivors,
            partitions.cross,
            self.config.crossover_parents,
            &mut self.rng,
        );
        for parents in groups {
            let child_id = self.ids.next_id();
            let parent_ids: Vec<GenomeId> = parents.iter().map(|p| p.id()).collect();
            let child = self
                .strategies
                .crossover
                .cross(&parents, child_id, &mut self.rng);
            self.stats
                .init_item(child.id(), Origin::Crossover, &parent_ids);
            next.push(child);
        }

        for parent in self
            .config
            .selection
            .pick(survivors, partitions.mutate, &mut self.rng)
        {
            let child_id = self.ids.next_id();
            let child = self.strategies.mutation.mutate(parent, child_id, &mut self.rng);
            self.stats.init_item(child.id(), Origin::Mutation, &[parent.id()]);
            next.push(child);
        }

        self.buffer = next;
    }

    /// Evicts cache entries and stats records outside the live lineage
    /// (current population plus buffer).
    fn prune_lineage(&mut self) {
        let keep: HashSet<GenomeId> = self
            .population
            .iter()
            .chain(self.buffer.iter())
            .map(Genome::id)
            .collect();
        self.cache.clear_except(&keep);
        self.stats.retain(&keep);
    }

    /// Runs generation steps until a bound or stop condition is hit.
    ///
    /// Steps run up to `options.generations` times (unbounded when `None`),
    /// invoking the optional before/after callbacks around each step and
    /// the optional stop predicate on each step's ranked fitness column.
    pub fn fit(&mut self, mut options: FitOptions<'_>) -> Result<FitReport> {
        let mut steps = 0;
        loop {
            if let Some(limit) = options.generations {
                if steps >= limit {
                    break;
                }
            }
            if let Some(before) = options.before_step.as_mut() {
                before(self.generation);
            }
            let fitness_column = self.fit_step()?;
            steps += 1;
            if let Some(after) = options.after_step.as_mut() {
                after(self.generation, &self.summary.get());
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
