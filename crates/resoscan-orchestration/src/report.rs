//! Per-stage summary produced after the join barrier.

use std::time::Duration;

use crate::stage::Stage;
use crate::task::{TaskOutcome, TaskStatus};

/// Aggregate result of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub dry_run: bool,
    /// Every task outcome, sorted by identity.
    pub outcomes: Vec<TaskOutcome>,
    pub elapsed: Duration,
}

impl StageReport {
    #[must_use]
    pub fn new(stage: Stage, dry_run: bool, mut outcomes: Vec<TaskOutcome>, elapsed: Duration) -> Self {
        outcomes.sort_by(|a, b| a.identity.cmp(&b.identity));
        Self {
            stage,
            dry_run,
            outcomes,
            elapsed,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(TaskStatus::Done)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TaskStatus::Failed)
    }

    /// `(identity, error)` of each failed task.
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(|o| (o.identity.as_str(), o.error.as_deref().unwrap_or("")))
            .collect()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome(identity: &str, status: TaskStatus, error: Option<&str>) -> TaskOutcome {
        TaskOutcome {
            identity: identity.into(),
            output: PathBuf::from(identity),
            status,
            error: error.map(str::to_string),
            operations: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn counts_and_order() {
        let report = StageReport::new(
            Stage::Simulate,
            false,
            vec![
                outcome("c", TaskStatus::Done, None),
                outcome("a", TaskStatus::Failed, Some("exit 1")),
                outcome("b", TaskStatus::Done, None),
            ],
            Duration::from_secs(1),
        );
        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures(), [("a", "exit 1")]);
        assert!(!report.is_success());
        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.identity.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn empty_stage_is_success() {
        let report = StageReport::new(Stage::Extract, false, Vec::new(), Duration::ZERO);
        assert!(report.is_success());
        assert_eq!(report.total(), 0);
    }
}
