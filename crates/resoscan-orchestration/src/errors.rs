//! Orchestration errors.

use std::path::PathBuf;

use resoscan_core::errors::{AggregationError, ConfigError, EstimateError};

/// Failure of the feature-extraction capability.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The extraction tool could not run or exited with an error.
    #[error("extraction tool failed: {0}")]
    Tool(String),

    /// Extraction output could not be read.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extraction output is not a valid set of named distributions.
    #[error("cannot decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
}

/// Failure of one task. Recorded in the stage report, never fatal to the stage.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The external program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program exited unsuccessfully.
    #[error("{program} exited with {status}{}", tail_suffix(.stderr))]
    Exit {
        program: String,
        status: String,
        /// Last lines of standard error.
        stderr: String,
    },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Extraction did not produce the column an observable reads.
    #[error("column {0} missing from extracted distributions")]
    MissingColumn(String),

    #[error("estimating {observable}: {source}")]
    Estimate {
        observable: String,
        #[source]
        source: EstimateError,
    },

    #[error(transparent)]
    Aggregate(#[from] AggregationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The task panicked.
    #[error("task panicked: {0}")]
    Panic(String),
}

fn tail_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

impl TaskError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure that stops a stage (or the whole run) before tasks execute.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream artifacts could not be listed.
    #[error("cannot list {}: {source}", .path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("failed to create worker pool: {0}")]
    Pool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_message_includes_stderr_tail() {
        let err = TaskError::Exit {
            program: "DelphesHepMC_EDM4HEP".into(),
            status: "exit status: 1".into(),
            stderr: "card not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "DelphesHepMC_EDM4HEP exited with exit status: 1: card not found"
        );
        let quiet = TaskError::Exit {
            program: "gun".into(),
            status: "exit status: 2".into(),
            stderr: String::new(),
        };
        assert_eq!(quiet.to_string(), "gun exited with exit status: 2");
    }

    #[test]
    fn config_errors_convert() {
        let err: OrchestrationError = ConfigError::InvalidStages("none".into()).into();
        assert!(err.to_string().contains("none"));
    }
}
