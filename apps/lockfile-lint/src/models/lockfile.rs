//! Normalized lockfile schema shared by every parser and validator.

use crate::error::LintError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Source ecosystem format of a lockfile.
pub enum LockfileType {
    Npm,
    Yarn,
}

impl LockfileType {
    /// Infer the type from well-known lockfile names.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        match path.file_name()?.to_str()? {
            "package-lock.json" | "npm-shrinkwrap.json" => Some(LockfileType::Npm),
            "yarn.lock" => Some(LockfileType::Yarn),
            _ => None,
        }
    }
}

impl FromStr for LockfileType {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(LockfileType::Npm),
            "yarn" => Ok(LockfileType::Yarn),
            other => Err(LintError::Config(format!(
                "unsupported lockfile type '{}' (expected npm or yarn)",
                other
            ))),
        }
    }
}

impl fmt::Display for LockfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockfileType::Npm => f.write_str("npm"),
            LockfileType::Yarn => f.write_str("yarn"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One resolved package entry extracted from a lockfile.
///
/// `name` is never empty. `resolved_url` and `integrity` are independently
/// optional since formats differ in what they record per entry.
pub struct DependencyRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    /// Real package name when `name` is an alias of it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>) -> Self {
        DependencyRecord {
            name: name.into(),
            version: None,
            resolved_url: None,
            integrity: None,
            alias_of: None,
        }
    }

    pub fn with_resolved(mut self, url: impl Into<String>) -> Self {
        self.resolved_url = Some(url.into());
        self
    }

    pub fn with_integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    pub fn with_alias_of(mut self, real: impl Into<String>) -> Self {
        self.alias_of = Some(real.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Package identity after alias normalization.
    pub fn real_name(&self) -> &str {
        self.alias_of.as_deref().unwrap_or(&self.name)
    }

    /// `name@version` when the version is known, used in report lines.
    pub fn label(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.name, v),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A parsed lockfile. Records keep file order.
pub struct LockfileDocument {
    pub kind: LockfileType,
    pub records: Vec<DependencyRecord>,
}
