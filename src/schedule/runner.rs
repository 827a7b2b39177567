//! Scheduler execution.

use std::collections::VecDeque;

use super::action::{ActionContext, ActionStatus, ScheduleAction, StepLog};
use crate::error::{EngineError, Result};
use crate::search::{Evaluated, Genome, SearchConfig};
use crate::stats::PopulationSummary;

/// Ordered actions plus a rolling window of population summaries.
pub struct Scheduler<G: Genome> {
    actions: Vec<Box<dyn ScheduleAction<G>>>,
    history: VecDeque<PopulationSummary>,
    max_history: usize,
    log: StepLog,
}

impl<G: Genome> Scheduler<G> {
    /// Creates a scheduler keeping at most `max_history` summary snapshots.
    pub fn new(max_history: usize) -> Self {
        Self {
            actions: Vec::new(),
            history: VecDeque::new(),
            max_history: max_history.max(1),
            log: StepLog::default(),
        }
    }

    /// Appends an action; actions run in insertion order.
    pub fn with_action(mut self, action: Box<dyn ScheduleAction<G>>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn push_action(&mut self, action: Box<dyn ScheduleAction<G>>) {
        self.actions.push(action);
    }

    /// Summary snapshots of recent generations, oldest first.
    pub fn history(&self) -> &VecDeque<PopulationSummary> {
        &self.history
    }

    /// Log entries of the most recent step.
    pub fn log_entries(&self) -> &[String] {
        self.log.entries()
    }

    /// Runs every action against this generation's evaluated population.
    ///
    /// Called by the engine after ranking and summary update. The step log
    /// is cleared first, then the fresh summary joins the history window
    /// (oldest snapshot evicted beyond `max_history`). A skipped action is
    /// a no-op; an action error aborts the whole generation step.
    pub fn step(
        &mut self,
        config: &mut SearchConfig,
        evaluated: &mut Vec<Evaluated<G>>,
        summary: &PopulationSummary,
    ) -> Result<()> {
        self.log.clear();

        self.history.push_back(summary.clone());
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }

        for action in &mut self.actions {
            let mut ctx =
                ActionContext::new(config, evaluated, &self.history, summary, &mut self.log);
            match action.run(&mut ctx) {
                Ok(ActionStatus::Applied) => {
                    self.log.record(format!("action '{}' applied", action.name()));
                }
                Ok(ActionStatus::Skipped) => {
                    self.log.record(format!("action '{}' skipped", action.name()));
                }
                Err(source) => {
                    return Err(EngineError::Action {
                        action: action.name().to_string(),
                        message: source.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::RemoveOrder;
    use crate::search::{Genome, GenomeId};

    #[derive(Debug, Clone)]
    struct Plain {
        id: GenomeId,
    }

    impl Genome for Plain {
        fn id(&self) -> GenomeId {
            self.id
        }
    }

    fn evaluated(fitness: &[f64]) -> Vec<Evaluated<Plain>> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| Evaluated {
                genome: Plain { id: i as GenomeId },
                fitness: f,
                phenotype: vec![],
            })
            .collect()
    }

    struct CullBelow {
        threshold: f64,
    }

    impl ScheduleAction<Plain> for CullBelow {
        fn name(&self) -> &str {
            "cull-below"
        }

        fn run(&mut self, ctx: &mut ActionContext<'_, Plain>) -> Result<ActionStatus> {
            let threshold = self.threshold;
            let removed = ctx.population.remove(
                |e| e.fitness < threshold,
                None,
                RemoveOrder::FromEnd,
            );
            if removed.is_empty() {
                return Ok(ActionStatus::Skipped);
            }
            ctx.log(format!("culled {} genomes", removed.len()));
            Ok(ActionStatus::Applied)
        }
    }

    struct RaiseSurvival;

    impl ScheduleAction<Plain> for RaiseSurvival {
        fn name(&self) -> &str {
            "raise-survival"
        }

        fn run(&mut self, ctx: &mut ActionContext<'_, Plain>) -> Result<ActionStatus> {
            if ctx.summary.stagnation < 3 {
                return Ok(ActionStatus::Skipped);
            }
            ctx.config.survival_rate = (ctx.config.survival_rate + 0.1).min(0.9);
            Ok(ActionStatus::Applied)
        }
    }

    struct Exploding;

    impl ScheduleAction<Plain> for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn run(&mut self, _ctx: &mut ActionContext<'_, Plain>) -> Result<ActionStatus> {
            Err(EngineError::EmptyPopulation)
        }
    }

    #[test]
    fn test_action_mutates_population() {
        let mut scheduler = Scheduler::new(5).with_action(Box::new(CullBelow { threshold: 2.0 }));
        let mut config = SearchConfig::default();
        let mut pop = evaluated(&[5.0, 3.0, 1.0, 0.5]);
        let summary = PopulationSummary::default();

        scheduler.step(&mut config, &mut pop, &summary).unwrap();
        assert_eq!(pop.len(), 2);
        assert!(scheduler
            .log_entries()
            .iter()
            .any(|e| e.contains("culled 2 genomes")));
    }

    #[test]
    fn test_skipped_action_is_noop_for_that_action_only() {
        let mut scheduler = Scheduler::new(5)
            .with_action(Box::new(CullBelow { threshold: -1.0 })) // nothing matches
            .with_action(Box::new(RaiseSurvival));
        let mut config = SearchConfig::default().with_survival_rate(0.5);
        let mut pop = evaluated(&[5.0]);
        let summary = PopulationSummary {
            stagnation: 4,
            ..PopulationSummary::default()
        };

        scheduler.step(&mut config, &mut pop, &summary).unwrap();
        // First action skipped, second still ran.
        assert!((config.survival_rate - 0.6).abs() < 1e-10);
        assert!(scheduler
            .log_entries()
            .iter()
            .any(|e| e.contains("'cull-below' skipped")));
    }

    #[test]
    fn test_action_error_aborts_step() {
        let mut scheduler = Scheduler::new(5)
            .with_action(Box::new(Exploding))
            .with_action(Box::new(RaiseSurvival));
        let mut config = SearchConfig::default().with_survival_rate(0.5);
        let mut pop = evaluated(&[5.0]);
        let summary = PopulationSummary {
            stagnation: 9,
            ..PopulationSummary::default()
        };

        let err = scheduler.step(&mut config, &mut pop, &summary).unwrap_err();
        assert!(matches!(err, EngineError::Action { .. }));
        // The later action never ran.
        assert!((config.survival_rate - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_history_window_evicts_oldest() {
        let mut scheduler: Scheduler<Plain> = Scheduler::new(3);
        let mut config = SearchConfig::default();
        for stagnation in 0..5 {
            let summary = PopulationSummary {
                stagnation,
                ..PopulationSummary::default()
            };
            let mut pop = evaluated(&[1.0]);
            scheduler.step(&mut config, &mut pop, &summary).unwrap();
        }
        let kept: Vec<u32> = scheduler.history().iter().map(|s| s.stagnation).collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn test_log_cleared_each_step() {
        let mut scheduler = Scheduler::new(5).with_action(Box::new(CullBelow { threshold: 0.0 }));
        let mut config = SearchConfig::default();
        let summary = PopulationSummary::default();

        let mut pop = evaluated(&[1.0]);
        scheduler.step(&mut config, &mut pop, &summary).unwrap();
        let first_len = scheduler.log_entries().len();

        let mut pop = evaluated(&[1.0]);
        scheduler.step(&mut config, &mut pop, &summary).unwrap();
        assert_eq!(scheduler.log_entries().len(), first_len);
    }
}
