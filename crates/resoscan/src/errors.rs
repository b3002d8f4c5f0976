//! Error handling and exit codes.

use resoscan_core::constants::exit_codes;
use resoscan_core::errors::ConfigError;
use resoscan_orchestration::errors::OrchestrationError;
use resoscan_orchestration::report::StageReport;

/// Exit code for an error that stopped the run.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return exit_codes::ERROR_CONFIG;
    }
    match err.downcast_ref::<OrchestrationError>() {
        Some(OrchestrationError::Config(_)) => exit_codes::ERROR_CONFIG,
        _ => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code once every requested stage ran.
#[must_use]
pub fn reports_exit_code(reports: &[StageReport]) -> i32 {
    if reports.iter().all(StageReport::is_success) {
        exit_codes::SUCCESS
    } else {
        exit_codes::ERROR_PARTIAL
    }
}
