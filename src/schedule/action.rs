//! The scheduler action contract.

use std::collections::VecDeque;

use crate::error::Result;
use crate::num::ArrayManager;
use crate::search::{Evaluated, Genome, SearchConfig};
use crate::stats::PopulationSummary;

/// What an action did this generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// The action ran and (possibly) mutated the run.
    Applied,
    /// The action's conditions were not met; nothing happened. Local to
    /// this action — the scheduler moves on to the next one.
    Skipped,
}

/// Per-step log sink shared by all actions of one scheduler step.
///
/// Entries accumulate during a step and are cleared at the start of the
/// next; they are also forwarded through `log::debug!`.
#[derive(Debug, Default)]
pub struct StepLog {
    entries: Vec<String>,
}

impl StepLog {
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn record(&mut self, entry: String) {
        log::debug!(target: "evosearch::schedule", "{entry}");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Everything an action may observe and mutate during one generation.
pub struct ActionContext<'a, G: Genome> {
    /// The run's macro parameters. Changes take effect in the same step's
    /// breeding phase (partitions are computed after the scheduler runs).
    pub config: &'a mut SearchConfig,
    /// The evaluated, ranked population, behind a mutable collection
    /// handle supporting filtered update and ordered removal.
    pub population: ArrayManager<'a, Evaluated<G>>,
    /// Up to `max_history` summaries of prior generations, oldest first.
    /// The last entry is the current generation's summary.
    pub history: &'a VecDeque<PopulationSummary>,
    /// The current generation's summary.
    pub summary: &'a PopulationSummary,
    log: &'a mut StepLog,
}

impl<'a, G: Genome> ActionContext<'a, G> {
    pub(crate) fn new(
        config: &'a mut SearchConfig,
        population: &'a mut Vec<Evaluated<G>>,
        history: &'a VecDeque<PopulationSummary>,
        summary: &'a PopulationSummary,
        log: &'a mut StepLog,
    ) -> Self {
        Self {
            config,
            population: ArrayManager::new(population),
            history,
            summary,
            log,
        }
    }

    /// Appends an entry to the step log.
    pub fn log(&mut self, entry: impl Into<String>) {
        self.log.record(entry.into());
    }
}

/// One scheduler rule, executed every generation in list order.
pub trait ScheduleAction<G: Genome>: Send {
    /// Stable name used in logs and error reports.
    fn name(&self) -> &str;

    /// Runs the action against the live generation.
    ///
    /// Return [`ActionStatus::Skipped`] when preconditions do not hold;
    /// return an error only for genuine failures — it aborts the step.
    fn run(&mut self, ctx: &mut ActionContext<'_, G>) -> Result<ActionStatus>;
}
