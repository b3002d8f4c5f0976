//! Application entry point and dispatch.

use std::sync::Arc;

use anyhow::Result;

use resoscan_cli::presenter::StagePresenter;
use resoscan_cli::progress::ProgressObserver;
use resoscan_core::constants::exit_codes;
use resoscan_orchestration::interfaces::CommandRunner;
use resoscan_orchestration::orchestrator::PipelineOrchestrator;
use resoscan_orchestration::runner::{CommandExtractor, ProcessRunner};
use resoscan_orchestration::stage::Stage;

use crate::config::AppConfig;
use crate::errors::reports_exit_code;

/// Run the application and return the process exit code.
pub fn run(config: &AppConfig) -> Result<i32> {
    if let Some(shell) = config.completion {
        let cmd = <AppConfig as clap::CommandFactory>::command();
        resoscan_cli::completion::write_completion(cmd, shell, &mut std::io::stdout())?;
        return Ok(exit_codes::SUCCESS);
    }

    let scan = config.scan()?;
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
    let extractor = Arc::new(CommandExtractor::new(
        scan.tools.extractor.clone(),
        Arc::clone(&runner),
    ));
    let mut orchestrator =
        PipelineOrchestrator::new(scan, config.run_settings(), runner, extractor)?;

    let stages = Stage::ordered(&config.stages());
    // Every stage is checked before the first one runs.
    orchestrator.check(&stages)?;

    if !config.quiet && !config.dry_run && console::Term::stderr().is_term() {
        orchestrator = orchestrator.with_observer(Arc::new(ProgressObserver::new()));
    }
    let presenter =
        StagePresenter::new(orchestrator.layout().root(), config.verbose, config.quiet);

    tracing::info!(
        points = orchestrator.grid().len(),
        card = %config.card,
        output = %orchestrator.layout().root().display(),
        "scan configured"
    );

    let mut reports = Vec::with_capacity(stages.len());
    for stage in stages {
        let report = orchestrator.run_stage(stage)?;
        presenter.present_report(&report);
        reports.push(report);
    }
    presenter.present_summary(&reports);

    Ok(reports_exit_code(&reports))
}
