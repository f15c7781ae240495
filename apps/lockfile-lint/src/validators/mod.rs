//! Built-in lockfile policies.
//!
//! The policy set is closed: `Policy` enumerates every validator and
//! `run_validator` dispatches with a plain `match`. Validators are pure
//! functions over the parsed records; each returns at most one offense per
//! record so a record failing several policies shows up once per policy.

mod hosts;
mod integrity;
mod package_names;
mod scheme;
mod urls;

use crate::error::{LintError, Result};
use crate::models::{DependencyRecord, ValidationOutcome};
use serde::Serialize;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Identifies a built-in validator.
pub enum Policy {
    AllowedHosts,
    ValidateHttps,
    ValidatePackageNames,
    AllowedSchemes,
    AllowedUrls,
    ValidateIntegrity,
}

impl Policy {
    /// Every policy in registry iteration order.
    pub const ALL: [Policy; 6] = [
        Policy::AllowedHosts,
        Policy::ValidateHttps,
        Policy::ValidatePackageNames,
        Policy::AllowedSchemes,
        Policy::AllowedUrls,
        Policy::ValidateIntegrity,
    ];

    /// Configuration key / CLI flag enabling this policy.
    pub fn config_key(self) -> &'static str {
        match self {
            Policy::AllowedHosts => "allowed-hosts",
            Policy::ValidateHttps => "validate-https",
            Policy::ValidatePackageNames => "validate-package-names",
            Policy::AllowedSchemes => "allowed-schemes",
            Policy::AllowedUrls => "allowed-urls",
            Policy::ValidateIntegrity => "validate-integrity",
        }
    }

    /// Name reported in outcomes.
    pub fn validator_name(self) -> &'static str {
        match self {
            Policy::AllowedHosts => "validateHosts",
            Policy::ValidateHttps => "validateHttps",
            Policy::ValidatePackageNames => "ValidatePackageNames",
            Policy::AllowedSchemes => "validateSchemes",
            Policy::AllowedUrls => "validateUrls",
            Policy::ValidateIntegrity => "validateIntegrity",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.validator_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Configured value of a policy: a switch or an allow-list.
pub enum PolicyValues {
    Flag(bool),
    List(Vec<String>),
}

impl PolicyValues {
    /// Whether the value enables its policy.
    pub fn is_truthy(&self) -> bool {
        match self {
            PolicyValues::Flag(b) => *b,
            PolicyValues::List(l) => !l.is_empty(),
        }
    }

    fn as_list(&self, validator: &str) -> Result<&[String]> {
        match self {
            PolicyValues::List(l) => Ok(l),
            PolicyValues::Flag(_) => Err(LintError::internal(
                validator,
                "expected a list of values, got a flag",
            )),
        }
    }

    fn expect_flag(&self, validator: &str) -> Result<()> {
        match self {
            PolicyValues::Flag(_) => Ok(()),
            PolicyValues::List(_) => Err(LintError::internal(
                validator,
                "expected a flag, got a list of values",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Cross-cutting settings visible to every validator. Empty lists mean "not configured".
pub struct ValidatorOptions {
    pub empty_hostname: bool,
    pub allowed_hosts: Vec<String>,
    pub allowed_urls: Vec<String>,
    pub allowed_package_name_aliases: Vec<String>,
    pub integrity_exclude: Vec<String>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            empty_hostname: true,
            allowed_hosts: Vec::new(),
            allowed_urls: Vec::new(),
            allowed_package_name_aliases: Vec::new(),
            integrity_exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One configured validator run.
pub struct ValidatorSpec {
    pub policy: Policy,
    pub values: PolicyValues,
    pub options: ValidatorOptions,
}

/// Execute `spec` against `records`.
///
/// Policy failures land in the outcome; `Err` means the validator itself
/// could not run and the whole invocation must stop.
pub fn run_validator(records: &[DependencyRecord], spec: &ValidatorSpec) -> Result<ValidationOutcome> {
    let name = spec.policy.validator_name();
    let offenses = match spec.policy {
        Policy::AllowedHosts => {
            hosts::validate_hosts(records, spec.values.as_list(name)?, &spec.options)
        }
        Policy::ValidateHttps => {
            spec.values.expect_flag(name)?;
            scheme::validate_https(records)
        }
        Policy::AllowedSchemes => scheme::validate_schemes(records, spec.values.as_list(name)?),
        Policy::AllowedUrls => urls::validate_urls(records, spec.values.as_list(name)?),
        Policy::ValidatePackageNames => {
            spec.values.expect_flag(name)?;
            package_names::validate_package_names(records, &spec.options)?
        }
        Policy::ValidateIntegrity => {
            spec.values.expect_flag(name)?;
            integrity::validate_integrity(records, &spec.options)?
        }
    };
    Ok(ValidationOutcome::from_offenses(name, offenses))
}

/// What can be extracted from a record's resolved URL.
pub(crate) enum ResolvedUrl<'a> {
    Absent,
    Unparseable(&'a str),
    Parsed(&'a str, Url),
}

pub(crate) fn inspect_url(record: &DependencyRecord) -> ResolvedUrl<'_> {
    match record.resolved_url.as_deref() {
        None => ResolvedUrl::Absent,
        Some(raw) => match Url::parse(raw) {
            Ok(url) => ResolvedUrl::Parsed(raw, url),
            Err(_) => ResolvedUrl::Unparseable(raw),
        },
    }
}

/// Host with an explicit non-default port, `None` when the URL has no host.
pub(crate) fn host_of(url: &Url) -> Option<String> {
    // `url` lowercases hosts of special schemes only (not `git+ssh:`).
    let host = url.host_str().filter(|h| !h.is_empty())?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
