//! Rule-based mid-run scheduler.
//!
//! A [`Scheduler`] attached to an engine runs an ordered list of
//! [`ScheduleAction`]s once per generation, after ranking and summary
//! update but before breeding. Actions observe the run's recent history
//! and may mutate both the macro configuration and the live evaluated
//! population — culling genomes, adjusting rates, and so on.
//!
//! An action signals "conditions not met this generation" by returning
//! [`ActionStatus::Skipped`]: a no-op for that action only, not an error
//! and not an exit from the step. An `Err` is fatal for the whole step.

mod action;
mod runner;

pub use action::{ActionContext, ActionStatus, ScheduleAction, StepLog};
pub use runner::Scheduler;
