//! Validator registry: turns the effective configuration into the ordered
//! list of validators to run.

use crate::config::Effective;
use crate::validators::{Policy, PolicyValues, ValidatorOptions, ValidatorSpec};
use tracing::debug;

/// The URL allow-list is already honored by the host validator, so running
/// the URL validator next to it would report nothing new.
pub fn allowed_urls_subsumed_by_hosts(eff: &Effective) -> bool {
    !eff.allowed_hosts.is_empty()
}

fn configured_value(eff: &Effective, policy: Policy) -> PolicyValues {
    match policy {
        Policy::AllowedHosts => PolicyValues::List(eff.allowed_hosts.clone()),
        Policy::ValidateHttps => PolicyValues::Flag(eff.validate_https),
        Policy::ValidatePackageNames => PolicyValues::Flag(eff.validate_package_names),
        Policy::AllowedSchemes => PolicyValues::List(eff.allowed_schemes.clone()),
        Policy::AllowedUrls => PolicyValues::List(eff.allowed_urls.clone()),
        Policy::ValidateIntegrity => PolicyValues::Flag(eff.validate_integrity),
    }
}

pub fn validator_options(eff: &Effective) -> ValidatorOptions {
    ValidatorOptions {
        empty_hostname: eff.empty_hostname,
        allowed_hosts: eff.allowed_hosts.clone(),
        allowed_urls: eff.allowed_urls.clone(),
        allowed_package_name_aliases: eff.allowed_package_name_aliases.clone(),
        integrity_exclude: eff.integrity_exclude.clone(),
    }
}

/// Build the active validators in registry order.
pub fn build_validators(eff: &Effective) -> Vec<ValidatorSpec> {
    let options = validator_options(eff);
    let mut specs = Vec::new();
    for policy in Policy::ALL {
        if policy == Policy::AllowedUrls && allowed_urls_subsumed_by_hosts(eff) {
            debug!("skipping {} since allowed-hosts is configured", policy.config_key());
            continue;
        }
        let values = configured_value(eff, policy);
        if !values.is_truthy() {
            continue;
        }
        specs.push(ValidatorSpec {
            policy,
            values,
            options: options.clone(),
        });
    }
    debug!(
        validators = ?specs.iter().map(|s| s.policy.validator_name()).collect::<Vec<_>>(),
        "active validators"
    );
    specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LintConfig, OneOrMany};
    use std::path::PathBuf;

    fn effective(cfg: LintConfig) -> Effective {
        let cfg = LintConfig {
            path: Some(OneOrMany::One("yarn.lock".into())),
            ..LintConfig::default()
        }
        .merge(cfg);
        Effective::from_config(cfg, PathBuf::from("."), None).unwrap()
    }

    fn policies(specs: &[ValidatorSpec]) -> Vec<Policy> {
        specs.iter().map(|s| s.policy).collect()
    }

    #[test]
    fn nothing_enabled_means_no_validators() {
        assert!(build_validators(&effective(LintConfig::default())).is_empty());
    }

    #[test]
    fn urls_are_dropped_when_hosts_are_configured() {
        let eff = effective(LintConfig {
            allowed_hosts: Some(OneOrMany::Many(vec!["npm".into()])),
            allowed_urls: Some(OneOrMany::Many(vec!["https://x/y.tgz".into()])),
            ..LintConfig::default()
        });
        let specs = build_validators(&eff);
        assert_eq!(policies(&specs), vec![Policy::AllowedHosts]);
        // The host validator still sees the URL allow-list.
        assert_eq!(specs[0].options.allowed_urls, vec!["https://x/y.tgz"]);
    }

    #[test]
    fn urls_run_alone_without_hosts() {
        let eff = effective(LintConfig {
            allowed_urls: Some(OneOrMany::One("https://x/y.tgz".into())),
            ..LintConfig::default()
        });
        assert_eq!(policies(&build_validators(&eff)), vec![Policy::AllowedUrls]);
    }

    #[test]
    fn registry_order_is_fixed_and_falsy_values_skipped() {
        let eff = effective(LintConfig {
            validate_integrity: Some(true),
            allowed_schemes: Some(OneOrMany::Many(vec!["https:".into()])),
            validate_package_names: Some(true),
            allowed_hosts: Some(OneOrMany::Many(vec![])),
            validate_https: Some(false),
            ..LintConfig::default()
        });
        assert_eq!(
            policies(&build_validators(&eff)),
            vec![
                Policy::ValidatePackageNames,
                Policy::AllowedSchemes,
                Policy::ValidateIntegrity
            ]
        );
    }

    #[test]
    fn shared_options_reach_every_validator() {
        let eff = effective(LintConfig {
            validate_https: Some(true),
            validate_integrity: Some(true),
            empty_hostname: Some(false),
            allowed_package_name_aliases: Some(OneOrMany::One("a:b".into())),
            ..LintConfig::default()
        });
        for spec in build_validators(&eff) {
            assert!(!spec.options.empty_hostname);
            assert_eq!(spec.options.allowed_package_name_aliases, vec!["a:b"]);
        }
    }
}
