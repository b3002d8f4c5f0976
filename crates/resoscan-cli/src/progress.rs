//! Progress bar driven by stage events.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;

use resoscan_orchestration::interfaces::StageObserver;
use resoscan_orchestration::report::StageReport;
use resoscan_orchestration::stage::Stage;
use resoscan_orchestration::task::TaskOutcome;

const TEMPLATE: &str = "{prefix:>10.bold} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg} ({elapsed})";

/// One progress bar per running stage, drawn on stderr.
pub struct ProgressObserver {
    bar: Mutex<Option<ProgressBar>>,
    failures: Mutex<usize>,
    hidden: bool,
}

impl ProgressObserver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            failures: Mutex::new(0),
            hidden: false,
        }
    }

    /// Observer that tracks progress without drawing.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::new()
        }
    }

    /// Tasks finished so far in the current stage.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.lock().as_ref().map_or(0, ProgressBar::position)
    }

    fn new_bar(&self, stage: Stage, tasks: usize) -> ProgressBar {
        let bar = ProgressBar::with_draw_target(
            Some(u64::try_from(tasks).unwrap_or(u64::MAX)),
            if self.hidden {
                ProgressDrawTarget::hidden()
            } else {
                ProgressDrawTarget::stderr()
            },
        );
        match ProgressStyle::with_template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("=> ")),
            Err(e) => tracing::debug!(error = %e, "invalid progress template"),
        }
        bar.set_prefix(stage.name());
        bar
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl StageObserver for ProgressObserver {
    fn stage_started(&self, stage: Stage, tasks: usize) {
        *self.failures.lock() = 0;
        *self.bar.lock() = Some(self.new_bar(stage, tasks));
    }

    fn task_finished(&self, _stage: Stage, outcome: &TaskOutcome) {
        let failures = {
            let mut failures = self.failures.lock();
            if outcome.is_failed() {
                *failures += 1;
            }
            *failures
        };
        if let Some(bar) = self.bar.lock().as_ref() {
            if failures > 0 {
                bar.set_message(format!("{failures} failed, last {}", outcome.identity));
            } else {
                bar.set_message(outcome.identity.clone());
            }
            bar.inc(1);
        }
    }

    fn stage_finished(&self, _report: &StageReport) {
        if let Some(bar) = self.bar.lock().as_ref() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resoscan_orchestration::task::TaskStatus;
    use std::path::PathBuf;
    use std::time::Duration;

    fn outcome(identity: &str, status: TaskStatus) -> TaskOutcome {
        TaskOutcome {
            identity: identity.into(),
            output: PathBuf::from(identity),
            status,
            error: None,
            operations: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn counts_finished_tasks() {
        let observer = ProgressObserver::hidden();
        assert_eq!(observer.position(), 0);
        observer.stage_started(Stage::Simulate, 3);
        observer.task_finished(Stage::Simulate, &outcome("a", TaskStatus::Done));
        observer.task_finished(Stage::Simulate, &outcome("b", TaskStatus::Failed));
        assert_eq!(observer.position(), 2);
        assert_eq!(*observer.failures.lock(), 1);

        let report = StageReport::new(Stage::Simulate, false, Vec::new(), Duration::ZERO);
        observer.stage_finished(&report);

        observer.stage_started(Stage::Extract, 1);
        assert_eq!(observer.position(), 0);
        assert_eq!(*observer.failures.lock(), 0);
    }

    #[test]
    fn events_without_a_stage_are_ignored() {
        let observer = ProgressObserver::hidden();
        observer.task_finished(Stage::Generate, &outcome("a", TaskStatus::Done));
        assert_eq!(observer.position(), 0);
    }
}
