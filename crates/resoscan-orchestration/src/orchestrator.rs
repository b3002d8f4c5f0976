//! Pipeline orchestrator: plans the tasks of each stage, fans them out on
//! the worker pool, and reports after the join barrier.
//!
//! Stages communicate only through the output tree. Generate plans one task
//! per grid point; Simulate and Extract one per upstream artifact found on
//! disk; Summarize and Compare one per observable. A failing task is logged
//! and recorded, and its siblings run to completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use resoscan_core::curve::{build_curves, compare, CurveArchive};
use resoscan_core::distribution::NamedDistributions;
use resoscan_core::errors::{AggregationError, ConfigError};
use resoscan_core::grid::ParameterGrid;
use resoscan_core::observable::{ColumnExpr, Observable};
use resoscan_core::record::{read_json, write_json, ResolutionRecord};
use resoscan_core::resolution::estimate;

use crate::config::{RunSettings, ScanConfig};
use crate::errors::{OrchestrationError, TaskError};
use crate::interfaces::{CommandRunner, FeatureExtractor, NoOpObserver, StageObserver};
use crate::layout::{discover, RunLayout, EVENTS_EXT, RESPONSE_EXT};
use crate::operation::Operation;
use crate::pool;
use crate::report::StageReport;
use crate::stage::Stage;
use crate::task::{Task, TaskOutcome};

/// Drives the stages of one scan.
pub struct PipelineOrchestrator {
    scan: ScanConfig,
    grid: ParameterGrid,
    settings: RunSettings,
    layout: RunLayout,
    runner: Arc<dyn CommandRunner>,
    extractor: Arc<dyn FeatureExtractor>,
    observer: Arc<dyn StageObserver>,
}

impl PipelineOrchestrator {
    /// Validate the configuration and bind the external capabilities.
    pub fn new(
        scan: ScanConfig,
        settings: RunSettings,
        runner: Arc<dyn CommandRunner>,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Result<Self, ConfigError> {
        scan.validate()?;
        let grid = scan.grid()?;
        if settings.workers == 0 {
            return Err(ConfigError::InvalidScanConfig(
                "worker count must be at least 1".into(),
            ));
        }
        for label in std::iter::once(&settings.card).chain(&settings.compare_with) {
            if label.is_empty() || label.contains(['/', '\\']) {
                return Err(ConfigError::InvalidScanConfig(format!(
                    "configuration label '{label}' must be a plain name"
                )));
            }
        }
        // Tools may run in another working directory, so paths are absolute.
        let root = std::path::absolute(&settings.output_root).map_err(|e| {
            ConfigError::InvalidScanConfig(format!(
                "output root {}: {e}",
                settings.output_root.display()
            ))
        })?;

        Ok(Self {
            scan,
            grid,
            layout: RunLayout::new(root),
            settings,
            runner,
            extractor,
            observer: Arc::new(NoOpObserver),
        })
    }

    /// Report stage progress to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    #[must_use]
    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    #[must_use]
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Reject stage selections that cannot run, before anything executes.
    pub fn check(&self, stages: &[Stage]) -> Result<(), ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::InvalidStages(
                "no stage requested (generate, simulate, extract, summarize, compare)".into(),
            ));
        }
        if stages.contains(&Stage::Simulate) {
            let card = self.settings.card_path();
            if !card.is_file() {
                return Err(ConfigError::MissingCard(card));
            }
        }
        if stages.contains(&Stage::Compare) && self.settings.compare_with.is_none() {
            return Err(ConfigError::InvalidStages(
                "compare needs a second configuration to compare with".into(),
            ));
        }
        Ok(())
    }

    /// Run `stages` in pipeline order, one after another.
    pub fn run(&self, stages: &[Stage]) -> Result<Vec<StageReport>, OrchestrationError> {
        let stages = Stage::ordered(stages);
        self.check(&stages)?;
        stages.into_iter().map(|s| self.run_stage(s)).collect()
    }

    /// Plan and execute one stage, returning once every task has finished.
    pub fn run_stage(&self, stage: Stage) -> Result<StageReport, OrchestrationError> {
        self.check(&[stage])?;
        let start = Instant::now();
        let tasks = self.plan(stage)?;
        let dry_run = self.settings.dry_run;

        tracing::info!(stage = %stage, tasks = tasks.len(), dry_run, "stage started");
        if tasks.is_empty() {
            tracing::info!(stage = %stage, "no inputs found");
        }
        self.observer.stage_started(stage, tasks.len());

        let outcomes = if dry_run {
            tasks.into_iter().map(Task::planned).collect()
        } else {
            let jobs: Vec<_> = tasks
                .into_iter()
                .map(|task| move || self.run_task(task))
                .collect();
            pool::execute_tasks(jobs, self.settings.workers)?
        };

        let report = StageReport::new(stage, dry_run, outcomes, start.elapsed());
        tracing::info!(
            stage = %stage,
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis(),
            "stage finished"
        );
        self.observer.stage_finished(&report);
        Ok(report)
    }

    fn run_task(&self, mut task: Task) -> TaskOutcome {
        let stage = task.stage;
        task.start();
        tracing::debug!(stage = %stage, task = %task.identity, "task started");

        let start = Instant::now();
        let result =
            pool::isolate(|| self.execute(&task)).unwrap_or_else(|msg| Err(TaskError::Panic(msg)));
        if let Err(e) = &result {
            tracing::warn!(stage = %stage, task = %task.identity, error = %e, "task failed");
        }

        let outcome = task.finish(result, start.elapsed());
        self.observer.task_finished(stage, &outcome);
        outcome
    }

    // ---- planning ----

    fn plan(&self, stage: Stage) -> Result<Vec<Task>, OrchestrationError> {
        let card = &self.settings.card;
        let tasks = match stage {
            Stage::Generate => self
                .grid
                .enumerate()
                .map(|point| {
                    let name = self.grid.name(&point);
                    let descriptor = self.layout.descriptor_path(&name);
                    let events = self.layout.events_path(&name);
                    let cmd = self
                        .scan
                        .tools
                        .generator
                        .resolve(&descriptor, &events, None)?
                        .in_dir(self.layout.generated_dir());
                    let ops = vec![
                        Operation::WriteDescriptor {
                            path: descriptor.clone(),
                            contents: self.grid.descriptor(&point).render(),
                        },
                        Operation::Exec(cmd),
                    ];
                    Ok(Task::new(stage, name, Some(descriptor), events, ops))
                })
                .collect::<Result<Vec<_>, ConfigError>>()?,

            Stage::Simulate => {
                let card_path = self.settings.card_path();
                self.upstream(&self.layout.generated_dir(), EVENTS_EXT, |n| {
                    self.layout.events_path(n)
                })?
                .into_iter()
                .map(|(name, events)| {
                    let response = self.layout.response_path(card, &name);
                    let cmd = self.scan.tools.simulator.resolve(
                        &events,
                        &response,
                        Some(&card_path),
                    )?;
                    Ok(Task::new(stage, name, Some(events), response, vec![Operation::Exec(cmd)]))
                })
                .collect::<Result<Vec<_>, ConfigError>>()?
            }

            Stage::Extract => {
                let columns: Vec<ColumnExpr> =
                    self.scan.observables.iter().map(Observable::column_expr).collect();
                self.upstream(&self.layout.response_dir(card), RESPONSE_EXT, |n| {
                    self.layout.response_path(card, n)
                })?
                .into_iter()
                .map(|(name, response)| {
                    let output = self.layout.distributions_path(card, &name);
                    let mut ops = vec![Operation::Extract {
                        source: response.clone(),
                        columns: columns.clone(),
                        output: output.clone(),
                    }];
                    ops.extend(self.scan.observables.iter().map(|obs| Operation::Estimate {
                        observable: obs.key.clone(),
                        column: obs.column.clone(),
                        record: self.layout.record_path(card, &obs.key, &name),
                    }));
                    Task::new(stage, name, Some(response), output, ops)
                })
                .collect()
            }

            Stage::Summarize => self
                .scan
                .observables
                .iter()
                .map(|obs| {
                    let output = self.layout.archive_path(card, &obs.key);
                    Task::new(
                        stage,
                        obs.key.clone(),
                        Some(self.layout.extracted_dir(card)),
                        output.clone(),
                        vec![Operation::BuildCurves {
                            config: card.clone(),
                            observable: obs.key.clone(),
                            output,
                        }],
                    )
                })
                .collect(),

            Stage::Compare => {
                let Some(other) = &self.settings.compare_with else {
                    return Err(ConfigError::InvalidStages(
                        "compare needs a second configuration to compare with".into(),
                    )
                    .into());
                };
                self.scan
                    .observables
                    .iter()
                    .map(|obs| {
                        let left = self.layout.archive_path(card, &obs.key);
                        let output = self.layout.comparison_path(card, other, &obs.key);
                        Task::new(
                            stage,
                            obs.key.clone(),
                            Some(left.clone()),
                            output.clone(),
                            vec![Operation::Compare {
                                left,
                                right: self.layout.archive_path(other, &obs.key),
                                output,
                            }],
                        )
                    })
                    .collect()
            }
        };
        Ok(tasks)
    }

    /// Upstream artifacts of a stage. A dry run plans from the grid, since
    /// nothing upstream was actually produced.
    fn upstream(
        &self,
        dir: &Path,
        ext: &str,
        path_for: impl Fn(&str) -> PathBuf,
    ) -> Result<Vec<(String, PathBuf)>, OrchestrationError> {
        if self.settings.dry_run {
            return Ok(self
                .grid
                .enumerate()
                .map(|p| {
                    let name = self.grid.name(&p);
                    let path = path_for(&name);
                    (name, path)
                })
                .collect());
        }
        discover(dir, ext).map_err(|source| OrchestrationError::Discover {
            path: dir.to_path_buf(),
            source,
        })
    }

    // ---- execution ----

    fn execute(&self, task: &Task) -> Result<(), TaskError> {
        ensure_parent(&task.output)?;

        let mut extracted: Option<NamedDistributions> = None;
        let mut deferred: Option<TaskError> = None;
        for op in &task.operations {
            match op {
                Operation::WriteDescriptor { path, contents } => {
                    ensure_parent(path)?;
                    std::fs::write(path, contents).map_err(|e| TaskError::io(path, e))?;
                }
                Operation::Exec(cmd) => {
                    if let Some(dir) = &cmd.cwd {
                        std::fs::create_dir_all(dir).map_err(|e| TaskError::io(dir, e))?;
                    }
                    self.runner.run(cmd)?;
                }
                Operation::Extract {
                    source,
                    columns,
                    output,
                } => {
                    let dists = self.extractor.extract(columns, source)?;
                    write_json(output, &dists)?;
                    extracted = Some(dists);
                }
                Operation::Estimate {
                    observable,
                    column,
                    record,
                } => {
                    // One bad observable does not block the records of the others.
                    if let Err(e) =
                        self.estimate_one(extracted.as_ref(), observable, column, record)
                    {
                        tracing::debug!(
                            task = %task.identity,
                            observable = %observable,
                            error = %e,
                            "estimate failed"
                        );
                        deferred.get_or_insert(e);
                    }
                }
                Operation::BuildCurves {
                    config,
                    observable,
                    output,
                } => {
                    let obs = self.observable(observable)?;
                    let archive =
                        build_curves(config, obs, &self.grid, &self.layout.records(config))?;
                    write_json(output, &archive)?;
                }
                Operation::Compare {
                    left,
                    right,
                    output,
                } => {
                    let a: CurveArchive = read_json(left, AggregationError::MissingArchive)?;
                    let b: CurveArchive = read_json(right, AggregationError::MissingArchive)?;
                    write_json(output, &compare(&a, &b)?)?;
                }
            }
        }
        deferred.map_or(Ok(()), Err)
    }

    fn estimate_one(
        &self,
        extracted: Option<&NamedDistributions>,
        observable: &str,
        column: &str,
        record: &Path,
    ) -> Result<(), TaskError> {
        let dist = extracted
            .and_then(|d| d.get(column))
            .ok_or_else(|| TaskError::MissingColumn(column.to_string()))?;
        let result = estimate(dist, &self.scan.estimator).map_err(|source| TaskError::Estimate {
            observable: observable.to_string(),
            source,
        })?;
        write_json(record, &ResolutionRecord::from(&result))?;
        Ok(())
    }

    fn observable(&self, key: &str) -> Result<&Observable, TaskError> {
        self.scan
            .observables
            .iter()
            .find(|o| o.key == key)
            .ok_or_else(|| {
                TaskError::Config(ConfigError::InvalidScanConfig(format!(
                    "unknown observable {key}"
                )))
            })
    }
}

fn ensure_parent(path: &Path) -> Result<(), TaskError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| TaskError::io(dir, e))
        }
        _ => Ok(()),
    }
}
