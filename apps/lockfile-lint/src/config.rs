//! Configuration discovery and effective settings resolution.
//!
//! lockfile-lint reads its settings from the closest ancestor directory
//! containing one of:
//! - `.lockfile-lintrc` (JSON or YAML)
//! - `.lockfile-lintrc.json`, `.lockfile-lintrc.yaml|yml`, `.lockfile-lintrc.toml`
//! - a `"lockfile-lint"` object in `package.json`
//!
//! and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `format`: `pretty`
//! - `empty-hostname`: true
//! - every validator: disabled
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{LintError, Result};
use crate::models::LockfileType;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config files probed in each directory, in priority order.
const CONFIG_FILES: [&str; 5] = [
    ".lockfile-lintrc",
    ".lockfile-lintrc.json",
    ".lockfile-lintrc.yaml",
    ".lockfile-lintrc.yml",
    ".lockfile-lintrc.toml",
];
const PACKAGE_JSON_KEY: &str = "lockfile-lint";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
/// A single string or a list of strings.
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Raw options as written in a config file or given on the command line.
pub struct LintConfig {
    pub path: Option<OneOrMany>,
    #[serde(rename = "type")]
    pub lockfile_type: Option<String>,
    pub format: Option<String>,
    pub allowed_hosts: Option<OneOrMany>,
    pub validate_https: Option<bool>,
    pub allowed_schemes: Option<OneOrMany>,
    pub allowed_urls: Option<OneOrMany>,
    pub validate_package_names: Option<bool>,
    pub validate_integrity: Option<bool>,
    pub empty_hostname: Option<bool>,
    pub allowed_package_name_aliases: Option<OneOrMany>,
    pub integrity_exclude: Option<OneOrMany>,
}

impl LintConfig {
    /// Field-wise merge: values set on `self` win over `fallback`.
    pub fn merge(self, fallback: LintConfig) -> LintConfig {
        LintConfig {
            path: self.path.or(fallback.path),
            lockfile_type: self.lockfile_type.or(fallback.lockfile_type),
            format: self.format.or(fallback.format),
            allowed_hosts: self.allowed_hosts.or(fallback.allowed_hosts),
            validate_https: self.validate_https.or(fallback.validate_https),
            allowed_schemes: self.allowed_schemes.or(fallback.allowed_schemes),
            allowed_urls: self.allowed_urls.or(fallback.allowed_urls),
            validate_package_names: self
                .validate_package_names
                .or(fallback.validate_package_names),
            validate_integrity: self.validate_integrity.or(fallback.validate_integrity),
            empty_hostname: self.empty_hostname.or(fallback.empty_hostname),
            allowed_package_name_aliases: self
                .allowed_package_name_aliases
                .or(fallback.allowed_package_name_aliases),
            integrity_exclude: self.integrity_exclude.or(fallback.integrity_exclude),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Report rendering mode.
pub enum OutputFormat {
    Pretty,
    Plain,
    Json,
}

impl FromStr for OutputFormat {
    type Err = LintError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "plain" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            other => Err(LintError::Config(format!(
                "unsupported format '{}' (expected pretty, plain or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
/// Fully-resolved configuration consumed by the engine.
pub struct Effective {
    /// Directory that relative `path` patterns are resolved against.
    pub base_dir: PathBuf,
    /// Config file that contributed settings, if any.
    pub config_file: Option<PathBuf>,
    pub paths: Vec<String>,
    pub lockfile_type: Option<LockfileType>,
    pub format: OutputFormat,
    pub allowed_hosts: Vec<String>,
    pub validate_https: bool,
    pub allowed_schemes: Vec<String>,
    pub allowed_urls: Vec<String>,
    pub validate_package_names: bool,
    pub validate_integrity: bool,
    pub empty_hostname: bool,
    pub allowed_package_name_aliases: Vec<String>,
    pub integrity_exclude: Vec<String>,
}

impl Effective {
    /// Validate merged options and apply defaults.
    pub fn from_config(
        cfg: LintConfig,
        base_dir: PathBuf,
        config_file: Option<PathBuf>,
    ) -> Result<Effective> {
        let paths: Vec<String> = cfg
            .path
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if paths.is_empty() {
            return Err(LintError::Config(
                "no lockfile path given: pass --path or set `path` in the config file".into(),
            ));
        }
        let lockfile_type = cfg
            .lockfile_type
            .as_deref()
            .map(LockfileType::from_str)
            .transpose()?;
        let format = cfg
            .format
            .as_deref()
            .map(OutputFormat::from_str)
            .transpose()?
            .unwrap_or(OutputFormat::Pretty);
        let list = |v: Option<OneOrMany>| v.map(OneOrMany::into_vec).unwrap_or_default();

        let eff = Effective {
            base_dir,
            config_file,
            paths,
            lockfile_type,
            format,
            allowed_hosts: list(cfg.allowed_hosts),
            validate_https: cfg.validate_https.unwrap_or(false),
            allowed_schemes: list(cfg.allowed_schemes),
            allowed_urls: list(cfg.allowed_urls),
            validate_package_names: cfg.validate_package_names.unwrap_or(false),
            validate_integrity: cfg.validate_integrity.unwrap_or(false),
            empty_hostname: cfg.empty_hostname.unwrap_or(true),
            allowed_package_name_aliases: list(cfg.allowed_package_name_aliases),
            integrity_exclude: list(cfg.integrity_exclude),
        };
        if eff.validate_https && !eff.allowed_schemes.is_empty() {
            return Err(LintError::Config(
                "validate-https and allowed-schemes cannot be used together".into(),
            ));
        }
        Ok(eff)
    }
}

/// Walk upward from `start` to the directory holding a config file.
///
/// Stops at the first directory with a known config file, a `package.json`
/// carrying a `lockfile-lint` key, or a `.git` directory.
pub fn detect_config_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).is_file()) || has_package_json_config(cur) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

fn has_package_json_config(dir: &Path) -> bool {
    fs::read_to_string(dir.join("package.json"))
        .ok()
        .and_then(|s| serde_json::from_str::<Json>(&s).ok())
        .map_or(false, |v| v.get(PACKAGE_JSON_KEY).is_some())
}

/// Load `LintConfig` from the first config source present in `root`.
///
/// Returns the file it came from. A present but malformed file is an error.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, LintConfig)>> {
    for name in CONFIG_FILES {
        let p = root.join(name);
        if !p.is_file() {
            continue;
        }
        let s = fs::read_to_string(&p)
            .map_err(|e| LintError::Config(format!("cannot read {}: {}", p.display(), e)))?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<LintConfig>(&s).map_err(|e| e.to_string())
        } else if name.ends_with(".json") {
            serde_json::from_str::<LintConfig>(&s).map_err(|e| e.to_string())
        } else {
            // YAML is a superset of JSON, so this covers both rc flavors.
            serde_yaml::from_str::<LintConfig>(&s).map_err(|e| e.to_string())
        };
        let cfg = parsed
            .map_err(|e| LintError::Config(format!("invalid config file {}: {}", p.display(), e)))?;
        return Ok(Some((p, cfg)));
    }

    let pkg = root.join("package.json");
    if let Ok(s) = fs::read_to_string(&pkg) {
        if let Ok(Json::Object(mut obj)) = serde_json::from_str::<Json>(&s) {
            if let Some(section) = obj.remove(PACKAGE_JSON_KEY) {
                let cfg: LintConfig = serde_json::from_value(section).map_err(|e| {
                    LintError::Config(format!(
                        "invalid `{}` section in {}: {}",
                        PACKAGE_JSON_KEY,
                        pkg.display(),
                        e
                    ))
                })?;
                return Ok(Some((pkg, cfg)));
            }
        }
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI options, discovered config, and defaults.
///
/// `cwd` is where discovery starts and relative lockfile patterns resolve.
pub fn resolve_effective(cli: LintConfig, cwd: &Path) -> Result<Effective> {
    let root = detect_config_root(cwd);
    let (config_file, file_cfg) = match load_config(&root)? {
        Some((p, c)) => (Some(p), c),
        None => (None, LintConfig::default()),
    };
    Effective::from_config(cli.merge(file_cfg), cwd.to_path_buf(), config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_toml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join(".lockfile-lintrc.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
path = "yarn.lock"
type = "yarn"
allowed-hosts = ["npm", "yarn"]
validate-integrity = true
"#
        )
        .unwrap();

        let eff = resolve_effective(LintConfig::default(), root).unwrap();
        assert_eq!(eff.paths, vec!["yarn.lock"]);
        assert_eq!(eff.lockfile_type, Some(LockfileType::Yarn));
        assert_eq!(eff.allowed_hosts, vec!["npm", "yarn"]);
        assert!(eff.validate_integrity);
        assert!(!eff.validate_https);
        assert!(eff.empty_hostname);
        assert_eq!(eff.format, OutputFormat::Pretty);
        assert_eq!(eff.config_file, Some(root.join(".lockfile-lintrc.toml")));
    }

    #[test]
    fn test_rc_file_accepts_yaml_and_cli_wins() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join(".lockfile-lintrc")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
path: package-lock.json
format: plain
validate-https: true
empty-hostname: false
"#
        )
        .unwrap();

        let cli = LintConfig {
            format: Some("json".into()),
            validate_https: Some(false),
            ..LintConfig::default()
        };
        let eff = resolve_effective(cli, root).unwrap();
        assert_eq!(eff.format, OutputFormat::Json);
        assert!(!eff.validate_https);
        assert!(!eff.empty_hostname);
        assert_eq!(eff.paths, vec!["package-lock.json"]);
    }

    #[test]
    fn test_package_json_section_is_discovered_from_subdir() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("package.json"),
            r#"{"name": "app", "lockfile-lint": {"path": ["a.lock", "b.lock"], "allowed-schemes": "https:"}}"#,
        )
        .unwrap();
        let sub = root.join("packages/web");
        fs::create_dir_all(&sub).unwrap();

        assert_eq!(detect_config_root(&sub), root);
        let eff = resolve_effective(LintConfig::default(), &sub).unwrap();
        assert_eq!(eff.paths, vec!["a.lock", "b.lock"]);
        assert_eq!(eff.allowed_schemes, vec!["https:"]);
        assert_eq!(eff.base_dir, sub);
    }

    #[test]
    fn test_configuration_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();

        // no path anywhere
        assert!(matches!(
            resolve_effective(LintConfig::default(), root),
            Err(LintError::Config(_))
        ));

        let with_path = |extra: LintConfig| {
            LintConfig {
                path: Some(OneOrMany::One("yarn.lock".into())),
                ..LintConfig::default()
            }
            .merge(extra)
        };
        let conflicting = with_path(LintConfig {
            validate_https: Some(true),
            allowed_schemes: Some(OneOrMany::Many(vec!["https:".into()])),
            ..LintConfig::default()
        });
        assert!(matches!(
            resolve_effective(conflicting, root),
            Err(LintError::Config(_))
        ));

        let bad_type = with_path(LintConfig {
            lockfile_type: Some("pnpm".into()),
            ..LintConfig::default()
        });
        assert!(matches!(
            resolve_effective(bad_type, root),
            Err(LintError::Config(_))
        ));

        let bad_format = with_path(LintConfig {
            format: Some("xml".into()),
            ..LintConfig::default()
        });
        assert!(matches!(
            resolve_effective(bad_format, root),
            Err(LintError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_config_file_is_fatal() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".lockfile-lintrc.json"), "{ path: ").unwrap();
        assert!(matches!(
            resolve_effective(LintConfig::default(), root),
            Err(LintError::Config(_))
        ));
    }
}
