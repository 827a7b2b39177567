//! Engine configuration.
//!
//! [`SearchConfig`] holds the macro parameters of one engine. It is also
//! the object scheduler actions mutate mid-run, so every field stays plain
//! data. [`FitOptions`] controls one call to
//! [`GeneticSearch::fit`](crate::search::GeneticSearch::fit).

use crate::cache::CacheKind;
use crate::error::{EngineError, Result};
use crate::search::selection::Selection;
use crate::stats::PopulationSummary;

/// Configuration for one [`GeneticSearch`](crate::search::GeneticSearch).
///
/// # Defaults
///
/// ```
/// use evosearch::search::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert!((config.survival_rate - 0.5).abs() < 1e-10);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use evosearch::cache::CacheKind;
/// use evosearch::search::{SearchConfig, Selection};
///
/// let config = SearchConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Tournament(5))
///     .with_cache(CacheKind::Average)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Number of genomes in the population.
    pub population_size: usize,

    /// Fraction of the ranked population carried into the next generation
    /// unchanged (0.0–1.0).
    pub survival_rate: f64,

    /// Fraction of the replaced genomes bred by crossover rather than
    /// mutation (0.0–1.0).
    pub crossover_rate: f64,

    /// Parents per crossover group.
    pub crossover_parents: usize,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Which evaluation cache the engine builds at construction.
    pub cache: CacheKind,

    /// Decimal digits for the rounded summary view.
    pub summary_precision: u32,

    /// Random seed for reproducibility. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            survival_rate: 0.5,
            crossover_rate: 0.5,
            crossover_parents: 2,
            selection: Selection::default(),
            cache: CacheKind::default(),
            summary_precision: 3,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the survival rate.
    pub fn with_survival_rate(mut self, rate: f64) -> Self {
        self.survival_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the number of parents per crossover group.
    pub fn with_crossover_parents(mut self, n: usize) -> Self {
        self.crossover_parents = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the cache kind.
    pub fn with_cache(mut self, cache: CacheKind) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the rounded-summary precision.
    pub fn with_summary_precision(mut self, digits: u32) -> Self {
        self.summary_precision = digits;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// Malformed rates and sizes are rejected here, at construction time,
    /// never from inside a generation step.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(EngineError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.survival_rate) {
            return Err(EngineError::InvalidConfig(
                "survival_rate must be within [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(EngineError::InvalidConfig(
                "crossover_rate must be within [0, 1]".into(),
            ));
        }
        if self.crossover_parents < 2 {
            return Err(EngineError::InvalidConfig(
                "crossover_parents must be at least 2".into(),
            ));
        }
        let partitions = self.partitions();
        if partitions.survive == 0 {
            return Err(EngineError::InvalidConfig(
                "survival_rate leaves no survivors to breed from".into(),
            ));
        }
        Ok(())
    }

    /// Splits the population size into survivors and replacements.
    ///
    /// `survive = round(size · survival_rate)`; the remainder is split by
    /// `cross = round(to_die · crossover_rate)` with mutation taking the
    /// rest. The two roundings are independent and deliberately
    /// uncorrected: the totals may drift from `size` by at most one.
    pub fn partitions(&self) -> Partitions {
        let size = self.population_size;
        let survive = ((size as f64) * self.survival_rate).round() as usize;
        let survive = survive.min(size);
        let to_die = size - survive;
        let cross = ((to_die as f64) * self.crossover_rate).round() as usize;
        let cross = cross.min(to_die);
        Partitions {
            survive,
            cross,
            mutate: to_die - cross,
        }
    }
}

/// How one generation's ranked population is split for breeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partitions {
    /// Genomes carried over unchanged.
    pub survive: usize,
    /// Children bred by crossover.
    pub cross: usize,
    /// Children bred by mutation.
    pub mutate: usize,
}

impl Partitions {
    pub fn total(&self) -> usize {
        self.survive + self.cross + self.mutate
    }
}

impl std::ops::Add for Partitions {
    type Output = Partitions;

    fn add(self, rhs: Partitions) -> Partitions {
        Partitions {
            survive: self.survive + rhs.survive,
            cross: self.cross + rhs.cross,
            mutate: self.mutate + rhs.mutate,
        }
    }
}

/// Options for one [`fit`](crate::search::GeneticSearch::fit) run.
///
/// `generations: None` loops until the stop predicate fires — with neither
/// a bound nor a predicate the run is unbounded by design.
#[derive(Default)]
pub struct FitOptions<'a> {
    /// Maximum generation steps for this run.
    pub generations: Option<usize>,
    /// Invoked before each step with the generation counter.
    pub before_step: Option<Box<dyn FnMut(usize) + 'a>>,
    /// Invoked after each step with the generation counter and the fresh
    /// population summary.
    pub after_step: Option<Box<dyn FnMut(usize, &PopulationSummary) + 'a>>,
    /// Evaluated on each step's ranked fitness column; `true` ends the run.
    pub stop_when: Option<Box<dyn FnMut(&[f64]) -> bool + 'a>>,
}

impl<'a> FitOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the run to `n` generation steps.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = Some(n);
        self
    }

    pub fn with_before_step(mut self, f: impl FnMut(usize) + 'a) -> Self {
        self.before_step = Some(Box::new(f));
        self
    }

    pub fn with_after_step(mut self, f: impl FnMut(usize, &PopulationSummary) + 'a) -> Self {
        self.after_step = Some(Box::new(f));
        self
    }

    /// Installs the stop predicate, evaluated on the ranked fitness column.
    pub fn with_stop_when(mut self, f: impl FnMut(&[f64]) -> bool + 'a) -> Self {
        self.stop_when = Some(Box::new(f));
        self
    }
}

/// Outcome of one [`fit`](crate::search::GeneticSearch::fit) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitReport {
    /// Generation steps executed by this run.
    pub generations: usize,
    /// Whether the stop predicate ended the run early.
    pub stopped: bool,
}
