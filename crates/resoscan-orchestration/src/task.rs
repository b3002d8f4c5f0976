//! Tasks: one unit of work per input item of a stage.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::TaskError;
use crate::operation::Operation;
use crate::stage::Stage;

/// Lifecycle of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Planned, not started. Dry-run tasks stay here.
    Pending,
    Running,
    Done,
    Failed,
}

/// A planned unit of work.
#[derive(Debug, Clone)]
pub struct Task {
    pub stage: Stage,
    /// Point name or observable key; unique within the stage.
    pub identity: String,
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub operations: Vec<Operation>,
    status: TaskStatus,
}

impl Task {
    #[must_use]
    pub fn new(
        stage: Stage,
        identity: impl Into<String>,
        input: Option<PathBuf>,
        output: PathBuf,
        operations: Vec<Operation>,
    ) -> Self {
        Self {
            stage,
            identity: identity.into(),
            input,
            output,
            operations,
            status: TaskStatus::Pending,
        }
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub(crate) fn start(&mut self) {
        self.status = TaskStatus::Running;
    }

    /// Outcome of a task that was only planned.
    #[must_use]
    pub fn planned(self) -> TaskOutcome {
        TaskOutcome {
            identity: self.identity,
            output: self.output,
            status: self.status,
            error: None,
            operations: self.operations,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn finish(mut self, result: Result<(), TaskError>, elapsed: Duration) -> TaskOutcome {
        let error = match result {
            Ok(()) => {
                self.status = TaskStatus::Done;
                None
            }
            Err(e) => {
                self.status = TaskStatus::Failed;
                Some(e.to_string())
            }
        };
        TaskOutcome {
            elapsed,
            error,
            ..self.planned()
        }
    }
}

/// What happened to one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub identity: String,
    pub output: PathBuf,
    pub status: TaskStatus,
    /// Error text when `status` is `Failed`.
    pub error: Option<String>,
    pub operations: Vec<Operation>,
    pub elapsed: Duration,
}

impl TaskOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new(
            Stage::Generate,
            "mu_minus_theta_30_p_10",
            None,
            PathBuf::from("out/generated/mu_minus_theta_30_p_10.hepmc"),
            Vec::new(),
        )
    }

    #[test]
    fn lifecycle() {
        let mut t = task();
        assert_eq!(t.status(), TaskStatus::Pending);
        t.start();
        assert_eq!(t.status(), TaskStatus::Running);
        let outcome = t.finish(Ok(()), Duration::from_millis(5));
        assert_eq!(outcome.status, TaskStatus::Done);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.elapsed, Duration::from_millis(5));
    }

    #[test]
    fn failure_keeps_message() {
        let outcome = task().finish(Err(TaskError::Panic("boom".into())), Duration::ZERO);
        assert!(outcome.is_failed());
        assert_eq!(outcome.error.as_deref(), Some("task panicked: boom"));
    }

    #[test]
    fn planned_stays_pending() {
        let outcome = task().planned();
        assert_eq!(outcome.status, TaskStatus::Pending);
        assert!(!outcome.is_failed());
    }
}
