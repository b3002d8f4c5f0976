//! Process-backed implementations of the external capabilities.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tempfile::NamedTempFile;

use resoscan_core::distribution::NamedDistributions;
use resoscan_core::observable::ColumnExpr;

use crate::errors::{ExtractError, TaskError};
use crate::interfaces::{CommandRunner, FeatureExtractor};
use crate::operation::{CommandTemplate, ResolvedCommand};

const STDERR_TAIL_LINES: usize = 5;

/// Spawns commands with `std::process`, capturing output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &ResolvedCommand) -> Result<(), TaskError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null());
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| TaskError::Spawn {
            program: command.program.clone(),
            source,
        })?;
        if output.status.success() {
            return Ok(());
        }
        Err(TaskError::Exit {
            program: command.program.clone(),
            status: output.status.to_string(),
            stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
        })
    }
}

fn tail(text: &str, lines: usize) -> String {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    kept[kept.len().saturating_sub(lines)..].join(" | ")
}

/// Runs an extraction tool and reads the JSON distributions it writes.
///
/// The tool is invoked as the template with `{input}` bound to the response
/// file and `{output}` to a scratch JSON path, followed by one
/// `--column name=expr` pair per requested column.
pub struct CommandExtractor {
    template: CommandTemplate,
    runner: Arc<dyn CommandRunner>,
    scratch_dir: PathBuf,
}

impl CommandExtractor {
    #[must_use]
    pub fn new(template: CommandTemplate, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            template,
            runner,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Write scratch output under `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// A uniquely named scratch file, removed when dropped.
    fn scratch_file(&self, source: &Path) -> Result<NamedTempFile, ExtractError> {
        let stem = source
            .file_stem()
            .map_or_else(|| "columns".into(), |s| s.to_string_lossy());
        tempfile::Builder::new()
            .prefix(&format!("{stem}."))
            .suffix(".columns.json")
            .tempfile_in(&self.scratch_dir)
            .map_err(|source| ExtractError::Io {
                path: self.scratch_dir.clone(),
                source,
            })
    }

    /// The command that extracts `columns` from `source` into `output`.
    pub fn command(
        &self,
        columns: &[ColumnExpr],
        source: &Path,
        output: &Path,
    ) -> Result<ResolvedCommand, ExtractError> {
        let mut cmd = self
            .template
            .resolve(source, output, None)
            .map_err(|e| ExtractError::Tool(e.to_string()))?;
        for c in columns {
            cmd.args.push("--column".into());
            cmd.args.push(c.to_string());
        }
        Ok(cmd)
    }
}

impl FeatureExtractor for CommandExtractor {
    fn extract(
        &self,
        columns: &[ColumnExpr],
        source: &Path,
    ) -> Result<NamedDistributions, ExtractError> {
        let scratch = self.scratch_file(source)?;
        let out = scratch.path();
        let cmd = self.command(columns, source, out)?;
        self.runner
            .run(&cmd)
            .map_err(|e| ExtractError::Tool(e.to_string()))?;

        let content = std::fs::read_to_string(out).map_err(|source| ExtractError::Io {
            path: out.to_path_buf(),
            source,
        })?;
        let parsed = serde_json::from_str(&content).map_err(|e| ExtractError::Decode {
            path: out.to_path_buf(),
            reason: e.to_string(),
        });
        if let Err(e) = scratch.close() {
            tracing::debug!(error = %e, "could not remove scratch file");
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use resoscan_core::distribution::SampledDistribution;
    use tempfile::TempDir;

    /// Writes a fixed JSON payload to the `{output}` argument.
    struct WritingRunner {
        payload: String,
        seen: Mutex<Vec<ResolvedCommand>>,
    }

    impl CommandRunner for WritingRunner {
        fn run(&self, command: &ResolvedCommand) -> Result<(), TaskError> {
            self.seen.lock().push(command.clone());
            let out = &command.args[1];
            std::fs::write(out, &self.payload).map_err(|e| TaskError::io(out, e))
        }
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\n\nc\nd\n", 2), "c | d");
        assert_eq!(tail("", 3), "");
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_reports_exit_status() {
        let ok = ResolvedCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "exit 0".into()],
            cwd: None,
        };
        assert!(ProcessRunner.run(&ok).is_ok());

        let bad = ResolvedCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "echo boom >&2; exit 3".into()],
            cwd: None,
        };
        match ProcessRunner.run(&bad) {
            Err(TaskError::Exit { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn process_runner_spawn_failure() {
        let cmd = ResolvedCommand {
            program: "resoscan-definitely-not-installed".into(),
            args: Vec::new(),
            cwd: None,
        };
        assert!(matches!(ProcessRunner.run(&cmd), Err(TaskError::Spawn { .. })));
    }

    #[test]
    fn extractor_passes_columns_and_reads_output() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(WritingRunner {
            payload: r#"{"RP_TRK_D0_um":{"samples":[1.0,2.0]}}"#.into(),
            seen: Mutex::new(Vec::new()),
        });
        let template = CommandTemplate::parse("resoscan-extract {input} {output}").unwrap();
        let extractor = CommandExtractor::new(template, runner.clone()).with_scratch_dir(dir.path());
        let columns = [ColumnExpr {
            name: "RP_TRK_D0_um".into(),
            expression: "RP_TRK_D0 * 1000.0".into(),
        }];

        let dists = extractor.extract(&columns, Path::new("resp/a.root")).unwrap();
        assert_eq!(
            dists["RP_TRK_D0_um"],
            SampledDistribution::Samples(vec![1.0, 2.0])
        );

        let seen = runner.seen.lock();
        assert_eq!(seen[0].args[0], "resp/a.root");
        assert_eq!(seen[0].args[2..], ["--column", "RP_TRK_D0_um=RP_TRK_D0 * 1000.0"]);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none(), "scratch left behind");
    }

    /// Writes partial output, then fails.
    struct CrashingRunner;

    impl CommandRunner for CrashingRunner {
        fn run(&self, command: &ResolvedCommand) -> Result<(), TaskError> {
            let out = &command.args[1];
            std::fs::write(out, "{").map_err(|e| TaskError::io(out, e))?;
            Err(TaskError::Exit {
                program: command.program.clone(),
                status: "exit status: 1".into(),
                stderr: "segfault".into(),
            })
        }
    }

    #[test]
    fn extractor_failure_removes_scratch() {
        let dir = TempDir::new().unwrap();
        let template = CommandTemplate::parse("x {input} {output}").unwrap();
        let extractor =
            CommandExtractor::new(template, Arc::new(CrashingRunner)).with_scratch_dir(dir.path());
        let err = extractor.extract(&[], Path::new("a.root")).unwrap_err();
        assert!(matches!(err, ExtractError::Tool(ref m) if m.contains("segfault")));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none(), "scratch left behind");
    }

    #[test]
    fn extractor_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(WritingRunner {
            payload: "not json".into(),
            seen: Mutex::new(Vec::new()),
        });
        let template = CommandTemplate::parse("x {input} {output}").unwrap();
        let extractor = CommandExtractor::new(template, runner).with_scratch_dir(dir.path());
        let err = extractor.extract(&[], Path::new("a.root")).unwrap_err();
        assert!(matches!(err, ExtractError::Decode { .. }));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none(), "scratch left behind");
    }
}
