//! Orchestration interfaces: the external capabilities a stage drives and
//! the observer that watches it.

use std::path::Path;

use resoscan_core::distribution::NamedDistributions;
use resoscan_core::observable::ColumnExpr;

use crate::errors::{ExtractError, TaskError};
use crate::operation::ResolvedCommand;
use crate::report::StageReport;
use crate::stage::Stage;
use crate::task::TaskOutcome;

/// Runs an external program to completion.
pub trait CommandRunner: Send + Sync {
    /// Run `command`; a non-zero exit is an error.
    fn run(&self, command: &ResolvedCommand) -> Result<(), TaskError>;
}

/// Evaluates column expressions against a response file.
pub trait FeatureExtractor: Send + Sync {
    /// One distribution per requested column, keyed by column name.
    fn extract(
        &self,
        columns: &[ColumnExpr],
        source: &Path,
    ) -> Result<NamedDistributions, ExtractError>;
}

/// Trait for following stage progress.
pub trait StageObserver: Send + Sync {
    /// A stage planned `tasks` tasks and is about to run them.
    fn stage_started(&self, stage: Stage, tasks: usize);

    /// One task finished. Called from worker threads.
    fn task_finished(&self, stage: Stage, outcome: &TaskOutcome);

    /// Every task of the stage has finished.
    fn stage_finished(&self, report: &StageReport);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl StageObserver for NoOpObserver {
    fn stage_started(&self, _stage: Stage, _tasks: usize) {}
    fn task_finished(&self, _stage: Stage, _outcome: &TaskOutcome) {}
    fn stage_finished(&self, _report: &StageReport) {}
}
