//! Generational evolutionary-search engine.
//!
//! Given a population of candidate solutions ("genomes"), the engine
//! iteratively evaluates, ranks, and regenerates the population toward
//! higher fitness. The problem-specific pieces — how to generate, mutate,
//! cross, evaluate, score, and rank genomes — are pluggable strategies;
//! the engine owns the generational loop, population bookkeeping, caching
//! of expensive evaluations, statistics, and mid-run control:
//!
//! - **[`search`]**: the [`GeneticSearch`](search::GeneticSearch) state
//!   machine, the multi-population
//!   [`ComposedSearch`](search::ComposedSearch), strategy seams, and
//!   configuration.
//! - **[`cache`]**: the evaluation cache family — dummy, simple, running
//!   average, and age-weighted average.
//! - **[`stats`]**: per-genome lineage records and population-wide
//!   summaries with stagnation tracking.
//! - **[`schedule`]**: ordered rule actions that observe run history and
//!   mutate parameters and the live population between ranking and
//!   breeding.
//! - **[`num`]**: summary statistics, normalization, and the filtered
//!   array-mutation helper.
//!
//! # Cargo features
//!
//! - `parallel` (default): fan per-genome evaluation tasks across a rayon
//!   worker pool.
//! - `serde`: `Serialize`/`Deserialize` derives on configs, summaries,
//!   stats, and cache snapshots.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use evosearch::search::{FitOptions, GeneticSearch, SearchConfig, StrategySet};
//!
//! let strategies = StrategySet::new(
//!     Arc::new(MyPopulate),
//!     Arc::new(MyMutation),
//!     Arc::new(MyCrossover),
//!     Arc::new(MyEvaluator),
//!     Arc::new(MyFitness),
//! );
//! let config = SearchConfig::default().with_population_size(200).with_seed(42);
//! let mut search = GeneticSearch::new(config, strategies)?;
//! search.fit(FitOptions::new().with_generations(100))?;
//! println!("best: {:?}", search.best());
//! ```

pub mod cache;
pub mod error;
pub mod num;
pub mod schedule;
pub mod search;
pub mod stats;

pub use error::{EngineError, Result};
