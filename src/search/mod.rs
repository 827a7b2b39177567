//! The generational search engine.
//!
//! A generic, trait-seamed evolutionary loop. Users define their problem by
//! implementing the strategy contracts in [`types`] — populate, mutate,
//! cross, evaluate, score, sort — and inject them as a [`StrategySet`];
//! the engine owns the generational state machine, the evaluation cache,
//! statistics, and scheduler dispatch.
//!
//! # Core Traits
//!
//! - [`Genome`]: an opaque candidate solution with a unique id
//! - [`PopulateStrategy`] / [`MutationStrategy`] / [`CrossoverStrategy`]:
//!   how genomes come to exist
//! - [`PhenotypeStrategy`]: per-genome evaluation through the cache
//! - [`FitnessStrategy`] / [`SortStrategy`]: scoring and ranking
//!
//! # Key Types
//!
//! - [`SearchConfig`]: engine parameters (sizes, rates, selection, cache)
//! - [`GeneticSearch`]: the single-population generation state machine
//! - [`ComposedSearch`]: eliminator engines feeding a final engine
//! - [`Selection`]: rank-based parent selection (random / tournament)

mod composed;
mod config;
mod engine;
mod selection;
mod types;

pub use composed::{ComposedConfig, ComposedSearch};
pub use config::{FitOptions, FitReport, Partitions, SearchConfig};
pub use engine::GeneticSearch;
pub use selection::Selection;
pub use types::{
    CrossoverStrategy, Evaluated, FitnessAscending, FitnessDescending, FitnessStrategy, Genome,
    GenomeId, IdGenerator, MutationStrategy, PhenotypeStrategy, PopulateStrategy, SortStrategy,
    StrategySet, WeightedSumFitness,
};
