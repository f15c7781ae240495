//! `validate-package-names`: package identity checks.
//!
//! A record fails when:
//! - its name (or alias target) is not a legal npm package name,
//! - it is an alias not listed in `allowed_package_name_aliases`
//!   (entries are either `alias:real` or just `real`),
//! - it resolves to a registry tarball published under another name.

use super::{inspect_url, ResolvedUrl, ValidatorOptions};
use crate::error::{LintError, Result};
use crate::models::{DependencyRecord, Offense};
use regex::Regex;

const VALIDATOR: &str = "ValidatePackageNames";
const MAX_NAME_LEN: usize = 214;
// Grammar for existing packages: uppercase stays legal (`JSONStream`).
const NAME_PATTERN: &str =
    r"^(?:@[A-Za-z0-9\-*~][A-Za-z0-9\-*._~]*/)?[A-Za-z0-9\-~][A-Za-z0-9\-._~]*$";

pub(super) fn validate_package_names(
    records: &[DependencyRecord],
    options: &ValidatorOptions,
) -> Result<Vec<Offense>> {
    let grammar = Regex::new(NAME_PATTERN).map_err(|e| LintError::internal(VALIDATOR, e.to_string()))?;
    let mut offenses = Vec::new();

    for rec in records {
        let mut problems: Vec<String> = Vec::new();
        if !is_legal_name(&grammar, &rec.name) {
            problems.push(format!("'{}' is not a valid package name", rec.name));
        }
        if let Some(real) = rec.alias_of.as_deref() {
            if !is_legal_name(&grammar, real) {
                problems.push(format!("alias target '{}' is not a valid package name", real));
            }
            if !alias_allowed(&rec.name, real, &options.allowed_package_name_aliases) {
                problems.push(format!(
                    "'{}' is an alias of '{}' which is not in the allowed package name aliases",
                    rec.name, real
                ));
            }
        }
        if let Some(published) = tarball_package_name(rec) {
            if published != rec.real_name() {
                problems.push(format!(
                    "resolved tarball belongs to '{}', not '{}'",
                    published,
                    rec.real_name()
                ));
            }
        }
        if !problems.is_empty() {
            offenses.push(Offense {
                record: rec.clone(),
                message: format!(
                    "detected invalid package name for package: {}\n    {}",
                    rec.label(),
                    problems.join("\n    ")
                ),
            });
        }
    }
    Ok(offenses)
}

fn is_legal_name(grammar: &Regex, name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LEN && grammar.is_match(name)
}

fn alias_allowed(alias: &str, real: &str, allowed: &[String]) -> bool {
    let pair = format!("{}:{}", alias, real);
    allowed.iter().any(|a| a == &pair || a == real)
}

/// Package name embedded in a registry tarball URL (`/<name>/-/<file>.tgz`).
fn tarball_package_name(rec: &DependencyRecord) -> Option<String> {
    let ResolvedUrl::Parsed(_, url) = inspect_url(rec) else {
        return None;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let path = url.path();
    let (prefix, _) = path.split_once("/-/")?;
    // Registries may mount under a sub-path; the name is the last one or two segments.
    let segments: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();
    let decoded: Vec<String> = segments
        .iter()
        .map(|s| s.replace("%40", "@").replace("%2f", "/").replace("%2F", "/"))
        .collect();
    let last = decoded.last()?;
    if last.starts_with('@') && last.contains('/') {
        return Some(last.clone());
    }
    if decoded.len() >= 2 && decoded[decoded.len() - 2].starts_with('@') {
        return Some(format!("{}/{}", decoded[decoded.len() - 2], last));
    }
    Some(last.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(recs: &[DependencyRecord], aliases: &[&str]) -> Vec<Offense> {
        let options = ValidatorOptions {
            allowed_package_name_aliases: aliases.iter().map(|s| s.to_string()).collect(),
            ..ValidatorOptions::default()
        };
        validate_package_names(recs, &options).unwrap()
    }

    #[test]
    fn grammar_accepts_common_names() {
        let recs = vec![
            DependencyRecord::new("lodash"),
            DependencyRecord::new("@babel/core"),
            DependencyRecord::new("left-pad.js"),
            DependencyRecord::new("a~b_c"),
        ];
        assert!(run(&recs, &[]).is_empty());
    }

    #[test]
    fn grammar_rejects_illegal_names() {
        let recs = vec![
            DependencyRecord::new(".hidden"),
            DependencyRecord::new("_private"),
            DependencyRecord::new("has space"),
            DependencyRecord::new("café"),
            DependencyRecord::new("a/b"),
            DependencyRecord::new("@scope"),
            DependencyRecord::new("x".repeat(215)),
        ];
        assert_eq!(run(&recs, &[]).len(), recs.len());
    }

    #[test]
    fn legacy_uppercase_names_are_accepted() {
        let recs = vec![DependencyRecord::new("JSONStream")
            .with_version("1.3.5")
            .with_resolved("https://registry.npmjs.org/JSONStream/-/JSONStream-1.3.5.tgz")];
        assert!(run(&recs, &[]).is_empty());
    }

    #[test]
    fn aliases_need_allow_listing() {
        let recs = vec![DependencyRecord::new("string-width-cjs")
            .with_alias_of("string-width")
            .with_resolved("https://registry.npmjs.org/string-width/-/string-width-4.2.3.tgz")];
        assert_eq!(run(&recs, &[]).len(), 1);
        assert_eq!(run(&recs, &["other"]).len(), 1);
        assert!(run(&recs, &["string-width-cjs:string-width"]).is_empty());
        assert!(run(&recs, &["string-width"]).is_empty());
    }

    #[test]
    fn yarn_alias_listed_after_its_target_is_still_checked() {
        let doc = crate::parser::parse_str(
            "foo@^1.0.0, \"zzz@npm:foo@^1.0.0\":\n  version \"1.0.0\"\n  resolved \"https://registry.yarnpkg.com/foo/-/foo-1.0.0.tgz\"\n",
            std::path::Path::new("yarn.lock"),
            crate::models::LockfileType::Yarn,
        )
        .unwrap();
        let out = run(&doc.records, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.name, "zzz");
        assert!(out[0].message.contains("is an alias of 'foo'"));
        assert!(run(&doc.records, &["zzz:foo"]).is_empty());
    }

    #[test]
    fn tarball_name_must_match_package() {
        let recs = vec![
            DependencyRecord::new("lodash")
                .with_resolved("https://registry.npmjs.org/lodash/-/lodash-4.17.21.tgz"),
            DependencyRecord::new("@scope/a")
                .with_resolved("https://registry.npmjs.org/@scope/a/-/a-1.0.0.tgz"),
            DependencyRecord::new("@scope/b")
                .with_resolved("https://registry.example.com/@scope%2fb/-/b-1.0.0.tgz"),
            DependencyRecord::new("typosquat")
                .with_resolved("https://registry.npmjs.org/evil/-/evil-1.0.0.tgz"),
            DependencyRecord::new("gitdep").with_resolved("git+ssh://git@github.com/o/r.git"),
        ];
        let out = run(&recs, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.name, "typosquat");
        assert!(out[0].message.contains("belongs to 'evil'"));
    }
}
