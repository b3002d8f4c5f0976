//! resoscan: detector resolution parameter scans.

use resoscan_lib::{app, config, errors};

fn main() {
    let config = config::AppConfig::parse();

    let level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let code = match app::run(&config) {
        Ok(code) => code,
        Err(e) => {
            resoscan_cli::presenter::print_error(&format!("{e:#}"));
            errors::exit_code(&e)
        }
    };
    std::process::exit(code);
}
