//! lockfile-lint CLI binary entry point.
//! Resolves configuration, runs the engine, prints results and owns the exit code.

use clap::Parser;
use lockfile_lint::cli::Cli;
use lockfile_lint::config::{self, OutputFormat};
use lockfile_lint::{lint, output};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Used for error reporting until the configured format is known.
    let fallback_format = cli
        .format
        .as_deref()
        .and_then(|f| f.parse::<OutputFormat>().ok())
        .unwrap_or(OutputFormat::Pretty);

    let cwd = match std::env::current_dir() {
        Ok(d) => d,
        Err(e) => {
            output::print_fatal(
                &lockfile_lint::LintError::Config(format!("cannot determine working directory: {}", e)),
                fallback_format,
            );
            std::process::exit(output::EXIT_FATAL);
        }
    };

    let eff = match config::resolve_effective(cli.to_config(), &cwd) {
        Ok(eff) => eff,
        Err(e) => {
            output::print_fatal(&e, fallback_format);
            std::process::exit(output::EXIT_FATAL);
        }
    };
    if let Some(file) = eff.config_file.as_ref() {
        debug!(config = %file.display(), "loaded config file");
    }
    debug!(
        "parsed the following options: {}",
        serde_json::to_string(&eff).unwrap_or_default()
    );

    match lint::run_lint(&eff) {
        Ok(run) => {
            output::print_report(&run.summaries, run.fatal.as_ref(), eff.format, &cwd);
            std::process::exit(output::exit_code(&run.summaries, run.fatal.as_ref()));
        }
        Err(e) => {
            output::print_fatal(&e, eff.format);
            std::process::exit(output::EXIT_FATAL);
        }
    }
}
