//! Report rendering and exit status.
//!
//! Supports `pretty` (default, colored with status symbols), `plain` (no
//! decoration, for CI logs) and `json` outputs. Offense details and
//! failures go to stderr; the success verdict goes to stdout.

use crate::config::OutputFormat;
use crate::error::LintError;
use crate::models::RunSummary;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::{Path, PathBuf};

pub const EXIT_OK: i32 = 0;
pub const EXIT_ISSUES: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One rendered line and where it goes.
pub struct ReportLine {
    pub stream: Stream,
    pub text: String,
}

#[derive(Clone, Copy)]
enum Level {
    Info,
    Success,
    Error,
}

#[derive(Clone, Copy)]
struct Style {
    color: bool,
    symbols: bool,
}

impl Style {
    fn for_format(format: OutputFormat) -> Self {
        let pretty = format == OutputFormat::Pretty;
        Style {
            color: pretty && std::env::var_os("NO_COLOR").is_none(),
            symbols: pretty,
        }
    }
}

/// Unicode symbols need a capable terminal; legacy Windows consoles get ASCII.
fn unicode_supported() -> bool {
    !cfg!(windows)
        || std::env::var_os("CI").is_some()
        || std::env::var("TERM").map_or(false, |t| t == "xterm-256color")
}

fn decorate(level: Level, message: &str, style: Style) -> String {
    let symbol = match (level, unicode_supported()) {
        (Level::Info, true) => "ℹ",
        (Level::Success, true) => "✔",
        (Level::Error, true) => "✖",
        (Level::Info, false) => "i",
        (Level::Success, false) => "√",
        (Level::Error, false) => "×",
    };
    let text = if style.symbols {
        format!("{} {}", symbol, message)
    } else {
        message.to_string()
    };
    if !style.color {
        return text;
    }
    match level {
        Level::Info => text.yellow().to_string(),
        Level::Success => text.green().to_string(),
        Level::Error => text.red().to_string(),
    }
}

fn display_path(path: &Path, cwd: &Path) -> String {
    pathdiff::diff_paths(path, cwd)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

/// Compose the human-readable lines for one lockfile (pure).
pub fn compose_human(
    summary: &RunSummary,
    format: OutputFormat,
    cwd: &Path,
    with_header: bool,
) -> Vec<ReportLine> {
    let style = Style::for_format(format);
    let mut lines = Vec::new();
    if with_header {
        lines.push(ReportLine {
            stream: Stream::Out,
            text: format!(
                "\nlockfile-lint scanning: {}\n",
                display_path(&summary.path, cwd)
            ),
        });
    }
    for outcome in summary.outcomes.iter().filter(|o| !o.passed) {
        for offense in &outcome.offenses {
            lines.push(ReportLine {
                stream: Stream::Err,
                text: offense.message.clone(),
            });
        }
    }
    if summary.is_success() {
        lines.push(ReportLine {
            stream: Stream::Out,
            text: decorate(Level::Success, "No issues detected", style),
        });
    } else {
        lines.push(ReportLine {
            stream: Stream::Err,
            text: decorate(Level::Error, "Error: security issues detected!", style),
        });
    }
    lines
}

fn fatal_json(err: &LintError) -> JsonVal {
    json!({"kind": error_kind(err), "message": err.to_string()})
}

/// Compose the JSON report (pure) for testing/snapshot purposes.
///
/// `fatal` is the error that stopped the run after the listed lockfiles.
pub fn compose_report_json(
    summaries: &[RunSummary],
    fatal: Option<&LintError>,
    cwd: &Path,
) -> JsonVal {
    let results: Vec<_> = summaries
        .iter()
        .map(|s| {
            json!({
                "path": display_path(&s.path, cwd),
                "validatorCount": s.validator_count,
                "validatorSuccesses": s.validator_successes,
                "validatorFailures": s.validator_failures,
                "outcomes": s.outcomes,
            })
        })
        .collect();
    let failures: usize = summaries.iter().map(|s| s.validator_failures).sum();
    let mut out = json!({
        "results": results,
        "summary": {
            "lockfiles": summaries.len(),
            "validatorFailures": failures,
            "ok": failures == 0 && fatal.is_none(),
        }
    });
    if let Some(err) = fatal {
        out["error"] = fatal_json(err);
    }
    out
}

fn print_json(out: &JsonVal) {
    println!(
        "{}",
        serde_json::to_string_pretty(out).unwrap_or_else(|_| out.to_string())
    );
}

/// Print results for every processed lockfile, then the fatal error that
/// stopped the run, if any.
pub fn print_report(
    summaries: &[RunSummary],
    fatal: Option<&LintError>,
    format: OutputFormat,
    cwd: &Path,
) {
    if format == OutputFormat::Json {
        print_json(&compose_report_json(summaries, fatal, cwd));
        return;
    }
    let with_header = summaries.len() > 1 || fatal.is_some();
    for s in summaries {
        for line in compose_human(s, format, cwd, with_header) {
            match line.stream {
                Stream::Out => println!("{}", line.text),
                Stream::Err => eprintln!("{}", line.text),
            }
        }
    }
    if let Some(err) = fatal {
        print_fatal(err, format);
    }
}

fn error_kind(err: &LintError) -> &'static str {
    match err {
        LintError::Config(_) => "ConfigurationError",
        LintError::Io { .. } | LintError::Parse { .. } => "ParseError",
        LintError::InternalValidator { .. } => "InternalValidatorError",
    }
}

/// Print a fatal error that aborted the run.
pub fn print_fatal(err: &LintError, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(&json!({"error": fatal_json(err)}));
        return;
    }
    let style = Style::for_format(format);
    if !matches!(err, LintError::Config(_)) {
        eprintln!(
            "{}",
            decorate(
                Level::Info,
                "ABORTING lockfile lint process due to error exceptions",
                style
            )
        );
    }
    eprintln!("{}\n", err);
    eprintln!(
        "{}",
        decorate(
            Level::Error,
            &format!("Error: command failed with exit code {}", EXIT_FATAL),
            style
        )
    );
}

/// `2` after a fatal error, else `0` when no validator failed on any
/// lockfile and `1` otherwise.
pub fn exit_code(summaries: &[RunSummary], fatal: Option<&LintError>) -> i32 {
    if fatal.is_some() {
        EXIT_FATAL
    } else if summaries.iter().all(RunSummary::is_success) {
        EXIT_OK
    } else {
        EXIT_ISSUES
    }
}
