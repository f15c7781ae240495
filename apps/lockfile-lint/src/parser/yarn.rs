//! yarn lockfile parser.
//!
//! Classic (v1) lockfiles use a line-oriented format:
//!
//! ```text
//! "@babel/core@^7.0.0", "@babel/core@^7.12.3":
//!   version "7.12.3"
//!   resolved "https://registry.yarnpkg.com/@babel/core/-/core-7.12.3.tgz#..."
//!   integrity sha512-...
//!   dependencies:
//!     "@babel/code-frame" "^7.10.4"
//! ```
//!
//! Berry (v2+) lockfiles are YAML and start with a `__metadata` entry.

use super::{alias_target, split_spec};
use crate::error::{LintError, Result};
use crate::models::DependencyRecord;
use serde_yaml::Value as Yaml;
use std::path::Path;

pub(super) fn parse_yarn(content: &str, path: &Path) -> Result<Vec<DependencyRecord>> {
    if is_berry(content) {
        parse_berry(content, path)
    } else {
        parse_classic(content, path)
    }
}

fn is_berry(content: &str) -> bool {
    content
        .lines()
        .any(|l| l.starts_with("__metadata:") || l.starts_with("\"__metadata\":"))
}

fn line_error(path: &Path, line: usize, message: impl std::fmt::Display) -> LintError {
    LintError::parse(path, format!("line {}: {}", line, message))
}

/// One `(name, range)` pair per distinct declared name in an entry header,
/// in header order. yarn sorts specifiers, so an alias may follow the
/// specifier of the package it points to.
fn declared_names<'a>(
    specs: impl IntoIterator<Item = &'a str>,
) -> std::result::Result<Vec<(&'a str, &'a str)>, &'static str> {
    let mut names: Vec<(&str, &str)> = Vec::new();
    for spec in specs {
        let (name, range) = split_spec(spec.trim());
        if name.is_empty() {
            return Err("entry with an empty package name");
        }
        if !names.iter().any(|(seen, _)| *seen == name) {
            names.push((name, range));
        }
    }
    if names.is_empty() {
        return Err("entry header without specifiers");
    }
    Ok(names)
}

fn parse_classic(content: &str, path: &Path) -> Result<Vec<DependencyRecord>> {
    let mut records = Vec::new();
    // Every declared name of the entry being read shares its fields.
    let mut block: Vec<DependencyRecord> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        let body = line.trim_start();
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        let indent = line.len() - body.len();

        if indent == 0 {
            let header = line
                .strip_suffix(':')
                .ok_or_else(|| line_error(path, line_no, "expected an entry header ending with ':'"))?;
            records.append(&mut block);
            let specs = split_specifiers(header).map_err(|m| line_error(path, line_no, m))?;
            let names = declared_names(specs.iter().map(String::as_str))
                .map_err(|m| line_error(path, line_no, m))?;
            for (name, range) in names {
                let mut rec = DependencyRecord::new(name);
                if let Some(real) = alias_target(range) {
                    if real != name {
                        rec.alias_of = Some(real.to_string());
                    }
                }
                block.push(rec);
            }
            continue;
        }

        if block.is_empty() {
            return Err(line_error(path, line_no, "field outside of an entry"));
        }
        // Nested blocks (dependencies, optionalDependencies, ...) carry no resolution data.
        if indent > 2 || body.ends_with(':') {
            continue;
        }
        let (key, value) = split_field(body).map_err(|m| line_error(path, line_no, m))?;
        for rec in block.iter_mut() {
            match key.as_str() {
                "version" => rec.version = Some(value.clone()),
                "resolved" => rec.resolved_url = Some(value.clone()),
                "integrity" => rec.integrity = Some(value.clone()),
                _ => {}
            }
        }
    }
    records.append(&mut block);
    Ok(records)
}

/// Split a header like `"a@^1", a@^1.2` into unquoted specifiers.
fn split_specifiers(header: &str) -> std::result::Result<Vec<String>, String> {
    header
        .split(',')
        .map(|part| unquote(part.trim()))
        .filter(|spec| !matches!(spec, Ok(s) if s.is_empty()))
        .collect()
}

/// Split an indented `key value` line.
fn split_field(body: &str) -> std::result::Result<(String, String), String> {
    let (key, rest) = if let Some(stripped) = body.strip_prefix('"') {
        let end = stripped
            .find('"')
            .ok_or_else(|| "unterminated quoted key".to_string())?;
        (stripped[..end].to_string(), &stripped[end + 1..])
    } else {
        match body.split_once(char::is_whitespace) {
            Some((k, v)) => (k.to_string(), v),
            None => return Err(format!("field '{}' has no value", body)),
        }
    };
    let value = unquote(rest.trim())?;
    Ok((key, value))
}

fn unquote(s: &str) -> std::result::Result<String, String> {
    if let Some(inner) = s.strip_prefix('"') {
        let inner = inner
            .strip_suffix('"')
            .ok_or_else(|| format!("unterminated quote in '{}'", s))?;
        Ok(inner.replace("\\\"", "\""))
    } else if s.contains('"') {
        Err(format!("unexpected quote in '{}'", s))
    } else {
        Ok(s.to_string())
    }
}

fn parse_berry(content: &str, path: &Path) -> Result<Vec<DependencyRecord>> {
    let doc: Yaml = serde_yaml::from_str(content)
        .map_err(|e| LintError::parse(path, format!("invalid YAML: {}", e)))?;
    let map = doc
        .as_mapping()
        .ok_or_else(|| LintError::parse(path, "top-level value must be a mapping"))?;

    let mut records = Vec::new();
    for (key, entry) in map {
        let key = key
            .as_str()
            .ok_or_else(|| LintError::parse(path, "entry keys must be strings"))?;
        if key == "__metadata" {
            continue;
        }
        let meta = entry
            .as_mapping()
            .ok_or_else(|| LintError::parse(path, format!("entry '{}' must be a mapping", key)))?;
        let field = |name: &str| -> Option<String> {
            meta.get(name).and_then(|v| match v {
                Yaml::String(s) => Some(s.clone()),
                Yaml::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        let real = field("resolution").map(|r| split_spec(&r).0.to_string());
        let names = declared_names(key.split(','))
            .map_err(|m| LintError::parse(path, format!("entry '{}': {}", key, m)))?;
        for (declared, _) in names {
            let mut rec = DependencyRecord::new(declared);
            if let Some(real) = real.as_deref() {
                if !real.is_empty() && real != declared {
                    rec.alias_of = Some(real.to_string());
                }
            }
            rec.version = field("version");
            rec.integrity = field("checksum");
            records.push(rec);
        }
    }
    Ok(records)
}
