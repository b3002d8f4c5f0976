//! Stage report presenter.
//!
//! Rendering is kept separate from printing so the text can be tested.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use console::style;

use resoscan_orchestration::report::StageReport;
use resoscan_orchestration::task::TaskStatus;

use crate::output::{display_path, format_duration, plural, shorten};

/// Whether color output is disabled via the `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

/// Print an error message on stderr.
pub fn print_error(text: &str) {
    if is_color_disabled() {
        eprintln!("[ERROR] {text}");
    } else {
        eprintln!("{} {text}", style("[ERROR]").red().bold());
    }
}

/// Prints stage reports and dry-run plans.
pub struct StagePresenter {
    root: PathBuf,
    verbose: bool,
    quiet: bool,
    color: bool,
}

impl StagePresenter {
    /// Paths below `root` are shown relative to it.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, verbose: bool, quiet: bool) -> Self {
        Self {
            root: root.into(),
            verbose,
            quiet,
            color: !is_color_disabled(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Print one finished (or planned) stage.
    pub fn present_report(&self, report: &StageReport) {
        let text = if report.dry_run {
            self.render_plan(report)
        } else if self.quiet {
            self.render_failures(report)
        } else {
            self.render_report(report)
        };
        if !text.is_empty() {
            print!("{text}");
        }
    }

    /// Print the closing line of a run.
    pub fn present_summary(&self, reports: &[StageReport]) {
        if !self.quiet {
            println!("{}", self.render_summary(reports));
        }
    }

    /// Header, failures, and in verbose mode every task.
    #[must_use]
    pub fn render_report(&self, report: &StageReport) -> String {
        let mut out = String::new();
        let header = format!(
            "=== {}: {}, {} succeeded, {} failed ({}) ===",
            report.stage,
            plural(report.total(), "task"),
            report.succeeded(),
            report.failed(),
            format_duration(report.elapsed)
        );
        let _ = writeln!(out, "{}", self.header(&header, report.is_success()));

        if report.total() == 0 {
            let _ = writeln!(out, "  no inputs found");
        }
        if self.verbose {
            for o in report.outcomes.iter().filter(|o| o.status == TaskStatus::Done) {
                let _ = writeln!(
                    out,
                    "  {} {} -> {} ({})",
                    self.tag("[OK]", true),
                    o.identity,
                    self.path(&o.output),
                    format_duration(o.elapsed)
                );
            }
        }
        out.push_str(&self.render_failures(report));
        out
    }

    /// One line per failed task.
    #[must_use]
    pub fn render_failures(&self, report: &StageReport) -> String {
        let mut out = String::new();
        for (identity, error) in report.failures() {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                self.tag("[FAILED]", false),
                identity,
                shorten(error, &self.root)
            );
        }
        out
    }

    /// Every planned task with the operations it would perform.
    #[must_use]
    pub fn render_plan(&self, report: &StageReport) -> String {
        let mut out = String::new();
        let header = format!(
            "=== {} (dry run): {} ===",
            report.stage,
            plural(report.total(), "task")
        );
        let _ = writeln!(out, "{}", self.header(&header, true));
        for o in &report.outcomes {
            let _ = writeln!(out, "{} -> {}", o.identity, self.path(&o.output));
            for op in &o.operations {
                let _ = writeln!(out, "    {}", shorten(&op.to_string(), &self.root));
            }
        }
        out
    }

    #[must_use]
    pub fn render_summary(&self, reports: &[StageReport]) -> String {
        let failed: usize = reports.iter().map(StageReport::failed).sum();
        if reports.iter().any(|r| r.dry_run) {
            let planned: usize = reports.iter().map(StageReport::total).sum();
            format!("dry run: {} planned, nothing executed", plural(planned, "task"))
        } else if failed == 0 {
            let text = format!("{} completed", plural(reports.len(), "stage"));
            self.tag(&text, true)
        } else {
            let stages = reports.iter().filter(|r| !r.is_success()).count();
            let text = format!(
                "{} in {}",
                plural(failed, "failed task"),
                plural(stages, "stage")
            );
            self.tag(&text, false)
        }
    }

    fn path(&self, path: &Path) -> String {
        display_path(path, &self.root)
    }

    fn header(&self, text: &str, ok: bool) -> String {
        match (self.color, ok) {
            (false, _) => text.to_string(),
            (true, true) => style(text).bold().cyan().to_string(),
            (true, false) => style(text).bold().yellow().to_string(),
        }
    }

    fn tag(&self, text: &str, ok: bool) -> String {
        match (self.color, ok) {
            (false, _) => text.to_string(),
            (true, true) => style(text).green().bold().to_string(),
            (true, false) => style(text).red().bold().to_string(),
        }
    }
}
