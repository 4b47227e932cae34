//! Installed package collector (pip, npm, homebrew).
//!
//! Queries each package manager for its installed set:
//! - pip: `pip3 list --format=json`
//! - npm: `npm list -g --depth=0 --json`
//! - brew: `brew list --versions`
//!
//! A failing manager yields a nested error marker for that manager only;
//! the others still report.

use std::collections::BTreeMap;
use std::process::Command;

use serde::Deserialize;

use crate::config::Config;
use crate::fragment::Fragment;

use super::Collector;

pub struct PackagesCollector;

impl Collector for PackagesCollector {
    fn name(&self) -> &'static str {
        "packages"
    }

    fn available(&self, _config: &Config) -> bool {
        true
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        Ok(Fragment::mapping([
            ("pip", manager_fragment(pip_packages())),
            ("npm", manager_fragment(npm_packages())),
            ("brew", manager_fragment(brew_packages())),
        ]))
    }
}

fn manager_fragment(result: Result<BTreeMap<String, String>, String>) -> Fragment {
    match result {
        Ok(packages) => Fragment::Mapping(
            packages
                .into_iter()
                .map(|(name, version)| (name, Fragment::from(version)))
                .collect(),
        ),
        Err(message) => Fragment::error_marker(&message),
    }
}

fn run_tool(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("{program} collection failed: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{program} collection failed: {}", stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[derive(Deserialize)]
struct PipPackage {
    name: String,
    version: String,
}

fn pip_packages() -> Result<BTreeMap<String, String>, String> {
    let stdout = run_tool("pip3", &["list", "--format=json"])?;

    let packages: Vec<PipPackage> = serde_json::from_str(&stdout)
        .map_err(|e| format!("pip collection failed: unexpected output: {e}"))?;

    Ok(packages
        .into_iter()
        .map(|p| (p.name, p.version))
        .collect())
}

#[derive(Deserialize)]
struct NpmListing {
    #[serde(default)]
    dependencies: BTreeMap<String, NpmPackage>,
}

#[derive(Deserialize)]
struct NpmPackage {
    version: Option<String>,
}

fn npm_packages() -> Result<BTreeMap<String, String>, String> {
    let stdout = run_tool("npm", &["list", "-g", "--depth=0", "--json"])?;

    let listing: NpmListing = serde_json::from_str(&stdout)
        .map_err(|e| format!("npm collection failed: unexpected output: {e}"))?;

    Ok(listing
        .dependencies
        .into_iter()
        .filter_map(|(name, package)| package.version.map(|v| (name, v)))
        .collect())
}

fn brew_packages() -> Result<BTreeMap<String, String>, String> {
    let stdout = run_tool("brew", &["list", "--versions"])?;

    let mut packages = BTreeMap::new();
    for line in stdout.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // "name v1 v2" lists every installed version, keep the last
        if fields.len() >= 2 {
            packages.insert(fields[0].to_string(), fields[fields.len() - 1].to_string());
        }
    }

    Ok(packages)
}
