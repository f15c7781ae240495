//! Lockfile parsing into normalized `DependencyRecord` lists.
//!
//! Each supported ecosystem lives in its own submodule:
//! - `npm`: `package-lock.json` / `npm-shrinkwrap.json` (v1 tree and v2+ `packages` map).
//! - `yarn`: classic `yarn.lock` text format and berry YAML lockfiles.
//!
//! Missing optional fields are tolerated; syntax errors are fatal for the file.

mod npm;
mod yarn;

use crate::error::{LintError, Result};
use crate::models::{LockfileDocument, LockfileType};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and parse the lockfile at `path` as `kind`.
pub fn parse(path: &Path, kind: LockfileType) -> Result<LockfileDocument> {
    let content = fs::read_to_string(path).map_err(|source| LintError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content, path, kind)
}

/// Parse lockfile `content`; `path` is only used for error reporting.
pub fn parse_str(content: &str, path: &Path, kind: LockfileType) -> Result<LockfileDocument> {
    let records = match kind {
        LockfileType::Npm => npm::parse_npm(content, path)?,
        LockfileType::Yarn => yarn::parse_yarn(content, path)?,
    };
    debug!(path = %path.display(), %kind, records = records.len(), "parsed lockfile");
    Ok(LockfileDocument { kind, records })
}

/// Split a `name@range` specifier, keeping the leading `@` of scoped names.
pub(crate) fn split_spec(spec: &str) -> (&str, &str) {
    let from = usize::from(spec.starts_with('@'));
    match spec[from..].find('@') {
        Some(i) => (&spec[..from + i], &spec[from + i + 1..]),
        None => (spec, ""),
    }
}

/// Real package name behind an `npm:real@range` alias reference.
pub(crate) fn alias_target(range: &str) -> Option<&str> {
    let rest = range.strip_prefix("npm:")?;
    let (real, _) = split_spec(rest);
    if real.is_empty() {
        None
    } else {
        Some(real)
    }
}
