//! Run orchestration: lockfile discovery, parsing, and validator execution.
//!
//! Every lockfile is processed independently and sequentially so reports
//! are stable across runs. Validation failures are folded into each
//! `RunSummary`; parse errors and internal validator errors abort the run.

use crate::config::Effective;
use crate::error::{LintError, Result};
use crate::models::{LockfileType, RunSummary};
use crate::parser;
use crate::registry::build_validators;
use crate::validators::{run_validator, ValidatorSpec};
use glob::glob;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Run every spec against the lockfile at `path`, in the order given.
pub fn run_validators(
    path: &Path,
    lockfile_type: LockfileType,
    specs: &[ValidatorSpec],
) -> Result<RunSummary> {
    let doc = parser::parse(path, lockfile_type)?;
    let mut summary = RunSummary::new(path.to_path_buf());
    for spec in specs {
        let outcome = run_validator(&doc.records, spec)?;
        debug!(
            validator = %outcome.validator,
            passed = outcome.passed,
            offenses = outcome.offenses.len(),
            "validator finished"
        );
        summary.record(outcome);
    }
    debug!("total validators invoked: {}", summary.validator_count);
    debug!("total validator failures: {}", summary.validator_failures);
    debug!("total validator successes: {}", summary.validator_successes);
    Ok(summary)
}

/// Outcome of a batch: summaries of every lockfile processed before the
/// first fatal error, and that error if one stopped the batch.
#[derive(Debug)]
pub struct LintRun {
    pub summaries: Vec<RunSummary>,
    pub fatal: Option<LintError>,
}

/// Process each `(path, type)` target in turn. The first fatal error stops
/// the batch; summaries completed before it are kept.
pub fn run_all(targets: &[(PathBuf, LockfileType)], specs: &[ValidatorSpec]) -> LintRun {
    let mut run = LintRun {
        summaries: Vec::with_capacity(targets.len()),
        fatal: None,
    };
    for (path, kind) in targets {
        info!(path = %path.display(), %kind, "scanning lockfile");
        match run_validators(path, *kind, specs) {
            Ok(summary) => run.summaries.push(summary),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "aborting lint run");
                run.fatal = Some(e);
                break;
            }
        }
    }
    run
}

/// Expand `patterns` (relative to `base`) into existing files, keeping
/// pattern order and dropping duplicates.
pub fn discover_lockfiles(patterns: &[String], base: &Path) -> Result<Vec<PathBuf>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut found = Vec::new();
    for pat in patterns {
        let abs = if Path::new(pat).is_absolute() {
            PathBuf::from(pat)
        } else {
            base.join(pat)
        };
        let pattern = abs.to_string_lossy().to_string();
        let entries = glob(&pattern)
            .map_err(|e| LintError::Config(format!("invalid path pattern '{}': {}", pat, e)))?;
        for entry in entries.flatten() {
            if entry.is_file() && seen.insert(entry.clone()) {
                found.push(entry);
            }
        }
    }
    if found.is_empty() {
        return Err(LintError::Config(format!(
            "no lockfiles found matching: {}",
            patterns.join(", ")
        )));
    }
    Ok(found)
}

/// Pair each discovered path with its lockfile type.
///
/// The configured type applies to every path; without one the type is
/// inferred from the file name, and failing that the run is misconfigured.
pub fn plan(eff: &Effective) -> Result<Vec<(PathBuf, LockfileType)>> {
    discover_lockfiles(&eff.paths, &eff.base_dir)?
        .into_iter()
        .map(|path| {
            let kind = match eff.lockfile_type {
                Some(kind) => kind,
                None => LockfileType::from_file_name(&path).ok_or_else(|| {
                    LintError::Config(format!(
                        "cannot infer lockfile type of {}: pass --type npm|yarn",
                        path.display()
                    ))
                })?,
            };
            Ok((path, kind))
        })
        .collect()
}

/// Resolve targets and validators from `eff`, then lint every lockfile.
///
/// Configuration problems surface as `Err` before any lockfile is read;
/// later fatal errors are carried in [`LintRun::fatal`].
pub fn run_lint(eff: &Effective) -> Result<LintRun> {
    let targets = plan(eff)?;
    let specs = build_validators(eff);
    debug!(lockfiles = targets.len(), validators = specs.len(), "starting lint run");
    Ok(run_all(&targets, &specs))
}
