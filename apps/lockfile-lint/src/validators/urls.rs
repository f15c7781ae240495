//! `allowed-urls`: resolved URLs must appear verbatim in the allow-list.

use crate::models::{DependencyRecord, Offense};

pub(super) fn validate_urls(records: &[DependencyRecord], urls: &[String]) -> Vec<Offense> {
    records
        .iter()
        .filter_map(|rec| {
            let resolved = rec.resolved_url.as_deref()?;
            if urls.iter().any(|u| u == resolved) {
                return None;
            }
            Some(Offense {
                record: rec.clone(),
                message: format!(
                    "detected invalid url(s) for package: {}\n    expected: {}\n    actual: {}",
                    rec.label(),
                    urls.join(", "),
                    resolved
                ),
            })
        })
        .collect()
}
