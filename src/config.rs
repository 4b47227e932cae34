//! Runtime configuration.
//!
//! Merged from the optional config file (~/.config/driftwatch/config.toml
//! or platform equivalent) and command-line flags; flags win.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::platform::{self, Platform};

const DEFAULT_MAX_FILES: usize = 1000;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

pub struct Config {
    /// Database path override; None means the platform data dir.
    pub storage: Option<PathBuf>,
    /// Directories the files collector walks.
    pub watch_dirs: Vec<PathBuf>,
    /// Cap on files recorded per capture, across all watch dirs.
    pub max_files: usize,
    /// Default watch-loop interval; the --interval flag overrides it.
    pub interval: Duration,
    /// Collector names to leave out of captures.
    pub skip: Vec<String>,
    pub verbose: bool,
    pub platform: Platform,
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    storage: Option<PathBuf>,
    watch_dirs: Option<Vec<PathBuf>>,
    max_files: Option<usize>,
    interval: Option<String>,
    skip: Option<Vec<String>>,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let file = read_config_file()?;

        let interval = match &file.interval {
            Some(text) => humantime::parse_duration(text)
                .map_err(|e| format!("invalid interval '{text}' in config file: {e}"))?,
            None => DEFAULT_INTERVAL,
        };

        let watch_dirs = match file.watch_dirs {
            Some(dirs) if !dirs.is_empty() => dirs,
            _ => vec![std::env::current_dir()?],
        };

        let mut skip = file.skip.unwrap_or_default();
        skip.extend(cli.skip.iter().cloned());

        Ok(Config {
            storage: cli.storage.clone().or(file.storage),
            watch_dirs,
            max_files: file.max_files.unwrap_or(DEFAULT_MAX_FILES),
            interval,
            skip,
            verbose: cli.verbose,
            platform: platform::detect(),
        })
    }

    pub fn is_skipped(&self, collector: &str) -> bool {
        self.skip.iter().any(|name| name == collector)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: None,
            watch_dirs: std::env::current_dir().map(|d| vec![d]).unwrap_or_default(),
            max_files: DEFAULT_MAX_FILES,
            interval: DEFAULT_INTERVAL,
            skip: Vec::new(),
            verbose: false,
            platform: platform::detect(),
        }
    }
}

fn read_config_file() -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let Some(dirs) = directories::ProjectDirs::from("", "", "driftwatch") else {
        return Ok(ConfigFile::default());
    };

    let path = dirs.config_dir().join("config.toml");
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let text = std::fs::read_to_string(&path)?;
    let file: ConfigFile = toml::from_str(&text)
        .map_err(|e| format!("invalid config file {}: {e}", path.display()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_list_matches_exact_collector_names() {
        let config = Config {
            skip: vec!["processes".to_string(), "files".to_string()],
            ..Config::default()
        };

        assert!(config.is_skipped("processes"));
        assert!(config.is_skipped("files"));
        assert!(!config.is_skipped("proc"));
        assert!(!config.is_skipped("env_vars"));
    }

    #[test]
    fn config_file_parses_all_fields() {
        let file: ConfigFile = toml::from_str(
            r#"
            storage = "/tmp/custom.db"
            watch_dirs = ["/etc", "/opt/app"]
            max_files = 250
            interval = "5m"
            skip = ["network"]
            "#,
        )
        .unwrap();

        assert_eq!(file.storage, Some(PathBuf::from("/tmp/custom.db")));
        assert_eq!(file.watch_dirs.as_ref().map(|d| d.len()), Some(2));
        assert_eq!(file.max_files, Some(250));
        assert_eq!(
            humantime::parse_duration(file.interval.as_deref().unwrap()).unwrap(),
            Duration::from_secs(300)
        );
        assert_eq!(file.skip, Some(vec!["network".to_string()]));
    }
}
