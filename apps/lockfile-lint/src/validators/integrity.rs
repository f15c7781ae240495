//! `validate-integrity`: downloaded packages must declare a sha512 integrity.
//!
//! Only the declared value is checked; nothing is fetched or hashed.

use super::ValidatorOptions;
use crate::error::{LintError, Result};
use crate::models::{DependencyRecord, Offense};
use regex::Regex;

const VALIDATOR: &str = "validateIntegrity";
const SRI_SHA512: &str = r"^sha512-[A-Za-z0-9+/]+={0,2}$";

pub(super) fn validate_integrity(
    records: &[DependencyRecord],
    options: &ValidatorOptions,
) -> Result<Vec<Offense>> {
    let sri = Regex::new(SRI_SHA512).map_err(|e| LintError::internal(VALIDATOR, e.to_string()))?;
    let mut offenses = Vec::new();

    for rec in records {
        if rec.resolved_url.is_none() {
            continue;
        }
        if options
            .integrity_exclude
            .iter()
            .any(|n| n == &rec.name || n == rec.real_name())
        {
            continue;
        }
        let integrity = rec.integrity.as_deref().unwrap_or("");
        if is_valid_integrity(&sri, integrity) {
            continue;
        }
        let actual = if integrity.is_empty() {
            "<missing>".to_string()
        } else {
            integrity.to_string()
        };
        offenses.push(Offense {
            record: rec.clone(),
            message: format!(
                "detected invalid integrity hash type for package: {}\n    expected: sha512\n    actual: {}",
                rec.label(),
                actual
            ),
        });
    }
    Ok(offenses)
}

/// One or more whitespace-separated `sha512-<base64>` tokens.
fn is_valid_integrity(sri: &Regex, integrity: &str) -> bool {
    let mut tokens = integrity.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| sri.is_match(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(recs: &[DependencyRecord]) -> Vec<Offense> {
        validate_integrity(recs, &ValidatorOptions::default()).unwrap()
    }

    #[test]
    fn empty_integrity_fails_and_sha512_passes() {
        let base = DependencyRecord::new("pkg").with_resolved("https://example.com/pkg.tgz");
        let out = run(&[base.clone().with_integrity("")]);
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("<missing>"));
        assert!(run(&[base.with_integrity("sha512-abc123==")]).is_empty());
    }

    #[test]
    fn records_without_url_are_exempt() {
        assert!(run(&[DependencyRecord::new("local")]).is_empty());
    }

    #[test]
    fn weaker_or_malformed_hashes_fail() {
        let base = DependencyRecord::new("pkg").with_resolved("https://example.com/pkg.tgz");
        let recs = vec![
            base.clone(),
            base.clone().with_integrity("sha1-Hz1wUBxxH2bGCOqnn8eqHPBBAwk="),
            base.clone().with_integrity("abc123=="),
            base.clone().with_integrity("sha512-"),
            base.clone().with_integrity("sha512-abc sha1-def"),
        ];
        assert_eq!(run(&recs).len(), recs.len());
        assert!(run(&[base.with_integrity("sha512-abc== sha512-def")]).is_empty());
    }

    #[test]
    fn excluded_packages_are_skipped() {
        let recs = vec![DependencyRecord::new("legacy").with_resolved("https://example.com/legacy.tgz")];
        let options = ValidatorOptions {
            integrity_exclude: vec!["legacy".into()],
            ..ValidatorOptions::default()
        };
        assert!(validate_integrity(&recs, &options).unwrap().is_empty());
    }
}
