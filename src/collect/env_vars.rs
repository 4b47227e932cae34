//! Environment variable collector.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::fragment::Fragment;

use super::Collector;

// high-churn variables that would make every diff noisy
const EXCLUDED_VARS: &[&str] = &[
    "PATH",
    "PWD",
    "OLDPWD",
    "SHLVL",
    "_",
    "PS1",
    "PS2",
    "HISTFILE",
    "SSH_CLIENT",
    "SSH_CONNECTION",
    "SSH_TTY",
];

// variables whose name suggests a credential are kept but redacted, so
// their appearance/disappearance still shows up in diffs
const SENSITIVE_MARKERS: &[&str] = &["password", "secret", "token", "key", "auth"];

const MAX_VALUE_LEN: usize = 500;

pub struct EnvVarsCollector;

impl Collector for EnvVarsCollector {
    fn name(&self) -> &'static str {
        "env_vars"
    }

    fn available(&self, _config: &Config) -> bool {
        true
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        let mut vars = BTreeMap::new();

        for (key, value) in std::env::vars_os() {
            let key = key.to_string_lossy().to_string();
            let value = value.to_string_lossy().to_string();

            if EXCLUDED_VARS.contains(&key.as_str()) {
                continue;
            }

            vars.insert(key.clone(), Fragment::from(sanitize(&key, value)));
        }

        Ok(Fragment::Mapping(vars))
    }
}

fn sanitize(key: &str, value: String) -> String {
    let lower = key.to_lowercase();
    if SENSITIVE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return "[REDACTED]".to_string();
    }

    if value.chars().count() > MAX_VALUE_LEN {
        let truncated: String = value.chars().take(MAX_VALUE_LEN - 3).collect();
        return format!("{truncated}...");
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_shaped_names_are_redacted() {
        assert_eq!(sanitize("API_TOKEN", "abc123".into()), "[REDACTED]");
        assert_eq!(sanitize("DbPassword", "hunter2".into()), "[REDACTED]");
        assert_eq!(sanitize("AWS_SECRET_ACCESS_KEY", "x".into()), "[REDACTED]");
        assert_eq!(sanitize("EDITOR", "vim".into()), "vim");
    }

    #[test]
    fn long_values_are_truncated_with_ellipsis() {
        let long = "x".repeat(600);
        let sanitized = sanitize("LS_COLORS", long);
        assert_eq!(sanitized.chars().count(), MAX_VALUE_LEN);
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn collected_fragment_is_a_mapping_without_excluded_vars() {
        let config = Config::default();
        let fragment = EnvVarsCollector.collect(&config).unwrap();

        let Fragment::Mapping(vars) = fragment else {
            panic!("expected a mapping");
        };
        for excluded in EXCLUDED_VARS {
            assert!(!vars.contains_key(*excluded));
        }
    }
}
