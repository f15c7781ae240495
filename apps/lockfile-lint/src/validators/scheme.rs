//! `validate-https` and `allowed-schemes`: protocol checks on resolved URLs.
//!
//! A record without a resolved URL has nothing to check and passes. A URL
//! that cannot be parsed has no extractable scheme and fails.

use super::{inspect_url, ResolvedUrl};
use crate::models::{DependencyRecord, Offense};

/// `https:` and `https` are the same scheme.
fn normalize_scheme(s: &str) -> String {
    s.trim().trim_end_matches(':').to_ascii_lowercase()
}

fn check_schemes(records: &[DependencyRecord], allowed: &[String], expected: &str) -> Vec<Offense> {
    let mut offenses = Vec::new();
    for rec in records {
        let actual = match inspect_url(rec) {
            ResolvedUrl::Absent => continue,
            ResolvedUrl::Unparseable(raw) => format!("unparseable URL '{}'", raw),
            ResolvedUrl::Parsed(_, url) if allowed.iter().any(|s| s == url.scheme()) => continue,
            ResolvedUrl::Parsed(_, url) => format!("{}:", url.scheme()),
        };
        offenses.push(Offense {
            record: rec.clone(),
            message: format!(
                "detected invalid protocol for package: {}\n    expected: {}\n    actual: {}",
                rec.label(),
                expected,
                actual
            ),
        });
    }
    offenses
}

pub(super) fn validate_https(records: &[DependencyRecord]) -> Vec<Offense> {
    check_schemes(records, &["https".to_string()], "https:")
}

pub(super) fn validate_schemes(records: &[DependencyRecord], schemes: &[String]) -> Vec<Offense> {
    let allowed: Vec<String> = schemes.iter().map(|s| normalize_scheme(s)).collect();
    let expected = allowed
        .iter()
        .map(|s| format!("{}:", s))
        .collect::<Vec<_>>()
        .join(", ");
    check_schemes(records, &allowed, &expected)
}
