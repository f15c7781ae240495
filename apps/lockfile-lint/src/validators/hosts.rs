//! `allowed-hosts`: every resolved URL must point at an allowed host.

use super::{host_of, inspect_url, ResolvedUrl, ValidatorOptions};
use crate::models::{DependencyRecord, Offense};

/// Expand well-known registry shorthands (`npm`, `yarn`, `verdaccio`).
pub(crate) fn expand_registry_alias(host: &str) -> String {
    match host {
        "npm" => "registry.npmjs.org".to_string(),
        "yarn" => "registry.yarnpkg.com".to_string(),
        "verdaccio" => "registry.verdaccio.org".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

pub(super) fn validate_hosts(
    records: &[DependencyRecord],
    hosts: &[String],
    options: &ValidatorOptions,
) -> Vec<Offense> {
    let allowed: Vec<String> = hosts.iter().map(|h| expand_registry_alias(h)).collect();
    let expected = allowed.join(", ");
    let mut offenses = Vec::new();

    for rec in records {
        let message = match inspect_url(rec) {
            ResolvedUrl::Absent if options.empty_hostname => continue,
            ResolvedUrl::Absent => format!(
                "detected missing resolved URL for package: {}",
                rec.label()
            ),
            ResolvedUrl::Unparseable(raw) => format!(
                "detected invalid host(s) for package: {}\n    expected: {}\n    actual: unparseable URL '{}'",
                rec.label(),
                expected,
                raw
            ),
            ResolvedUrl::Parsed(raw, url) => {
                if options.allowed_urls.iter().any(|u| u == raw) {
                    continue;
                }
                match host_of(&url) {
                    None if options.empty_hostname => continue,
                    None => format!(
                        "detected empty hostname for package: {}\n    expected: {}\n    actual: '{}'",
                        rec.label(),
                        expected,
                        raw
                    ),
                    Some(host) if allowed.contains(&host) => continue,
                    Some(host) => format!(
                        "detected invalid host(s) for package: {}\n    expected: {}\n    actual: {}",
                        rec.label(),
                        expected,
                        host
                    ),
                }
            }
        };
        offenses.push(Offense {
            record: rec.clone(),
            message,
        });
    }
    offenses
}
