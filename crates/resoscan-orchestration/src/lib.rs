//! # resoscan-orchestration
//!
//! Stage planning, bounded parallel execution, and external tool invocation.
//!
//! A [`PipelineOrchestrator`] turns a [`ScanConfig`] and [`RunSettings`]
//! into tasks per [`Stage`], runs them on a fixed-size worker pool, and
//! returns one [`StageReport`] per stage.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod layout;
pub mod operation;
pub mod orchestrator;
pub mod pool;
pub mod report;
pub mod runner;
pub mod stage;
pub mod task;

pub use config::{RunSettings, ScanConfig, ToolConfig};
pub use errors::{ExtractError, OrchestrationError, TaskError};
pub use interfaces::{CommandRunner, FeatureExtractor, NoOpObserver, StageObserver};
pub use layout::RunLayout;
pub use operation::{CommandTemplate, Operation, ResolvedCommand};
pub use orchestrator::PipelineOrchestrator;
pub use report::StageReport;
pub use runner::{CommandExtractor, ProcessRunner};
pub use stage::Stage;
pub use task::{Task, TaskOutcome, TaskStatus};
