//! npm lockfile parser (`package-lock.json`, `npm-shrinkwrap.json`).
//!
//! lockfileVersion 2/3 files carry a flat `packages` map keyed by install
//! path; when present it is authoritative. Older files only have the nested
//! `dependencies` tree, walked depth-first with parents before children.

use super::split_spec;
use crate::error::{LintError, Result};
use crate::models::DependencyRecord;
use serde_json::{Map, Value as Json};
use std::path::Path;

const NODE_MODULES: &str = "node_modules/";

pub(super) fn parse_npm(content: &str, path: &Path) -> Result<Vec<DependencyRecord>> {
    let json: Json = serde_json::from_str(content)
        .map_err(|e| LintError::parse(path, format!("invalid JSON: {}", e)))?;
    let root = json
        .as_object()
        .ok_or_else(|| LintError::parse(path, "top-level value must be an object"))?;

    let mut records = Vec::new();
    if let Some(packages) = root.get("packages") {
        let packages = packages
            .as_object()
            .ok_or_else(|| LintError::parse(path, "`packages` must be an object"))?;
        parse_packages(packages, path, &mut records)?;
    } else if let Some(deps) = root.get("dependencies") {
        let deps = deps
            .as_object()
            .ok_or_else(|| LintError::parse(path, "`dependencies` must be an object"))?;
        walk_dependencies(deps, path, &mut records)?;
    }
    Ok(records)
}

/// Name of the package installed at a `packages` key, if it is a
/// `node_modules` install (the root and workspace folders are skipped).
fn install_path_name(key: &str) -> Option<&str> {
    let idx = key.rfind(NODE_MODULES)?;
    let name = &key[idx + NODE_MODULES.len()..];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn parse_packages(
    packages: &Map<String, Json>,
    path: &Path,
    out: &mut Vec<DependencyRecord>,
) -> Result<()> {
    for (key, entry) in packages {
        let meta = entry
            .as_object()
            .ok_or_else(|| LintError::parse(path, format!("entry '{}' must be an object", key)))?;
        let Some(name) = install_path_name(key) else {
            continue;
        };
        let mut rec = DependencyRecord::new(name);
        if let Some(real) = opt_str(meta, "name", key, path)? {
            if real != name {
                rec.alias_of = Some(real);
            }
        }
        rec.version = opt_str(meta, "version", key, path)?;
        // Linked entries point at a local folder, not a download.
        let is_link = meta.get("link").and_then(Json::as_bool).unwrap_or(false);
        if !is_link {
            rec.resolved_url = opt_str(meta, "resolved", key, path)?;
        }
        rec.integrity = opt_str(meta, "integrity", key, path)?;
        out.push(rec);
    }
    Ok(())
}

fn walk_dependencies(
    deps: &Map<String, Json>,
    path: &Path,
    out: &mut Vec<DependencyRecord>,
) -> Result<()> {
    for (name, entry) in deps {
        if name.is_empty() {
            return Err(LintError::parse(path, "dependency with an empty name"));
        }
        let meta = entry
            .as_object()
            .ok_or_else(|| LintError::parse(path, format!("entry '{}' must be an object", name)))?;
        let mut rec = DependencyRecord::new(name.as_str());
        if let Some(version) = opt_str(meta, "version", name, path)? {
            // v1 aliases: "version": "npm:real-name@1.2.3"
            match version.strip_prefix("npm:") {
                Some(rest) => {
                    let (real, ver) = split_spec(rest);
                    if !real.is_empty() && real != name.as_str() {
                        rec.alias_of = Some(real.to_string());
                    }
                    if !ver.is_empty() {
                        rec.version = Some(ver.to_string());
                    }
                }
                None => rec.version = Some(version),
            }
        }
        rec.resolved_url = opt_str(meta, "resolved", name, path)?;
        rec.integrity = opt_str(meta, "integrity", name, path)?;
        out.push(rec);

        if let Some(nested) = meta.get("dependencies") {
            let nested = nested.as_object().ok_or_else(|| {
                LintError::parse(path, format!("`dependencies` of '{}' must be an object", name))
            })?;
            walk_dependencies(nested, path, out)?;
        }
    }
    Ok(())
}

fn opt_str(meta: &Map<String, Json>, field: &str, entry: &str, path: &Path) -> Result<Option<String>> {
    match meta.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(LintError::parse(
            path,
            format!("field '{}' of '{}' must be a string", field, entry),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Vec<DependencyRecord>> {
        parse_npm(s, Path::new("package-lock.json"))
    }

    #[test]
    fn v1_tree_is_flattened_parent_first() {
        let recs = parse(
            r#"{
  "name": "app",
  "lockfileVersion": 1,
  "dependencies": {
    "debug": {
      "version": "4.3.4",
      "resolved": "https://registry.npmjs.org/debug/-/debug-4.3.4.tgz",
      "integrity": "sha512-PRWFHuSU3eDtQJPvnNY7Jcket1j0t5OuOsFzPPzsekD52Zl8qUfFIPEiswXqIvHWGVHOgX+7G/vCNNhehwxfkQ==",
      "dependencies": {
        "ms": {
          "version": "2.1.2",
          "resolved": "https://registry.npmjs.org/ms/-/ms-2.1.2.tgz"
        }
      }
    },
    "local-thing": { "version": "file:../local-thing" }
  }
}"#,
        )
        .unwrap();
        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["debug", "ms", "local-thing"]);
        assert!(recs[1].integrity.is_none());
        assert!(recs[2].resolved_url.is_none());
        assert_eq!(recs[2].version.as_deref(), Some("file:../local-thing"));
    }

    #[test]
    fn v1_alias_version_sets_alias_of() {
        let recs = parse(
            r#"{"dependencies": {"string-width-cjs": {
                "version": "npm:string-width@4.2.3",
                "resolved": "https://registry.npmjs.org/string-width/-/string-width-4.2.3.tgz"
            }}}"#,
        )
        .unwrap();
        assert_eq!(recs[0].name, "string-width-cjs");
        assert_eq!(recs[0].alias_of.as_deref(), Some("string-width"));
        assert_eq!(recs[0].version.as_deref(), Some("4.2.3"));
    }

    #[test]
    fn v2_packages_map_wins_and_skips_root_and_workspaces() {
        let recs = parse(
            r#"{
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "app", "version": "1.0.0" },
    "packages/ui": { "name": "ui", "version": "0.1.0" },
    "node_modules/ui": { "resolved": "packages/ui", "link": true },
    "node_modules/@scope/a": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/@scope/a/-/a-1.0.0.tgz",
      "integrity": "sha512-AAAA"
    },
    "node_modules/@scope/a/node_modules/b": { "version": "2.0.0" },
    "node_modules/sw-cjs": { "name": "string-width", "version": "4.2.3" }
  },
  "dependencies": { "ignored": { "version": "1.0.0" } }
}"#,
        )
        .unwrap();
        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ui", "@scope/a", "b", "sw-cjs"]);
        assert!(recs[0].resolved_url.is_none());
        assert_eq!(recs[3].alias_of.as_deref(), Some("string-width"));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(parse("{ not json"), Err(LintError::Parse { .. })));
        assert!(matches!(parse("[]"), Err(LintError::Parse { .. })));
        assert!(matches!(
            parse(r#"{"dependencies": {"a": "1.0.0"}}"#),
            Err(LintError::Parse { .. })
        ));
        assert!(matches!(
            parse(r#"{"dependencies": {"a": {"resolved": 7}}}"#),
            Err(LintError::Parse { .. })
        ));
    }

    #[test]
    fn empty_lockfile_has_no_records() {
        assert!(parse(r#"{"name": "app", "lockfileVersion": 2}"#)
            .unwrap()
            .is_empty());
    }
}
