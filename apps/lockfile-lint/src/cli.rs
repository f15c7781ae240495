//! CLI argument parsing via `clap`.

use crate::config::{LintConfig, OneOrMany};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lockfile-lint",
    version,
    about = "Lint lockfiles for security policies",
    long_about = "lockfile-lint: audit npm and yarn lockfiles against host, protocol, URL, package name and integrity policies.\n\nConfiguration precedence: CLI > .lockfile-lintrc / package.json > defaults.",
    after_help = "Examples:\n  lockfile-lint --path yarn.lock --allowed-hosts npm yarn --validate-https\n  lockfile-lint --path 'packages/*/package-lock.json' --type npm --validate-integrity\n  lockfile-lint --path yarn.lock --allowed-schemes https: git+https: --format plain"
)]
/// Top-level CLI options. Every validator is enabled by its own flag.
pub struct Cli {
    #[arg(short, long, num_args = 1.., help = "Lockfile path(s) or glob pattern(s)")]
    pub path: Option<Vec<String>>,
    #[arg(short = 't', long = "type", help = "Lockfile type: npm|yarn (default: inferred from file name)")]
    pub lockfile_type: Option<String>,
    #[arg(short = 'a', long, num_args = 1.., help = "Allowed hosts; npm, yarn and verdaccio expand to their registries")]
    pub allowed_hosts: Option<Vec<String>>,
    #[arg(short = 's', long, action = clap::ArgAction::SetTrue, help = "Require https for every resolved URL")]
    pub validate_https: bool,
    #[arg(short = 'o', long, num_args = 1.., help = "Allowed URL schemes, e.g. https: git+https:")]
    pub allowed_schemes: Option<Vec<String>>,
    #[arg(short = 'u', long, num_args = 1.., help = "Allowed resolved URLs (ignored when --allowed-hosts is set)")]
    pub allowed_urls: Option<Vec<String>>,
    #[arg(short = 'n', long, action = clap::ArgAction::SetTrue, help = "Validate package names and aliases")]
    pub validate_package_names: bool,
    #[arg(short = 'i', long, action = clap::ArgAction::SetTrue, help = "Require sha512 integrity for downloaded packages")]
    pub validate_integrity: bool,
    #[arg(short = 'e', long, help = "Allow entries without a hostname (default: true)")]
    pub empty_hostname: Option<bool>,
    #[arg(long, num_args = 1.., help = "Allowed aliases as alias:package or package")]
    pub allowed_package_name_aliases: Option<Vec<String>>,
    #[arg(long, num_args = 1.., help = "Packages exempt from integrity validation")]
    pub integrity_exclude: Option<Vec<String>>,
    #[arg(short = 'f', long, help = "Output mode: pretty|plain|json (default: pretty)")]
    pub format: Option<String>,
    #[arg(long, env = "LOCKFILE_LINT_LOG", default_value = "warn", help = "Log filter directive")]
    pub log_level: String,
}

impl Cli {
    /// Options given on the command line; unset flags stay `None` so config
    /// file values can fill them.
    pub fn to_config(&self) -> LintConfig {
        let list = |v: &Option<Vec<String>>| v.clone().map(OneOrMany::Many);
        let flag = |b: bool| if b { Some(true) } else { None };
        LintConfig {
            path: list(&self.path),
            lockfile_type: self.lockfile_type.clone(),
            format: self.format.clone(),
            allowed_hosts: list(&self.allowed_hosts),
            validate_https: flag(self.validate_https),
            allowed_schemes: list(&self.allowed_schemes),
            allowed_urls: list(&self.allowed_urls),
            validate_package_names: flag(self.validate_package_names),
            validate_integrity: flag(self.validate_integrity),
            empty_hostname: self.empty_hostname,
            allowed_package_name_aliases: list(&self.allowed_package_name_aliases),
            integrity_exclude: list(&self.integrity_exclude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "lockfile-lint",
            "--path",
            "yarn.lock",
            "--type",
            "yarn",
            "-a",
            "npm",
            "yarn",
            "--validate-integrity",
            "--empty-hostname",
            "false",
            "--format",
            "plain",
        ])
        .unwrap();
        let cfg = cli.to_config();
        assert_eq!(cfg.path, Some(OneOrMany::Many(vec!["yarn.lock".into()])));
        assert_eq!(cfg.lockfile_type.as_deref(), Some("yarn"));
        assert_eq!(
            cfg.allowed_hosts,
            Some(OneOrMany::Many(vec!["npm".into(), "yarn".into()]))
        );
        assert_eq!(cfg.validate_integrity, Some(true));
        assert_eq!(cfg.validate_https, None);
        assert_eq!(cfg.empty_hostname, Some(false));
        assert_eq!(cfg.format.as_deref(), Some("plain"));
    }

    #[test]
    fn test_unset_flags_defer_to_config_file() {
        let cli = Cli::try_parse_from(["lockfile-lint"]).unwrap();
        let cfg = cli.to_config();
        assert!(cfg.path.is_none());
        assert!(cfg.validate_https.is_none());
        assert!(cfg.empty_hostname.is_none());
    }
}
