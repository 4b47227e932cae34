//! Data collectors.
//!
//! Each collector produces one fragment per capture: processes, network
//! sockets, environment variables, installed packages, watched files and
//! system resource usage. Collectors are failure-isolated; see
//! [`crate::snapshot::capture`] for how failures become error markers.

pub mod env_vars;
pub mod files;
pub mod network;
pub mod packages;
pub mod processes;
pub mod system;

use crate::config::Config;
use crate::fragment::Fragment;

/// One data source feeding a snapshot category.
///
/// A failure is an ordinary `Err(message)` return; collectors never panic
/// and never abort the capture of other categories.
pub trait Collector {
    fn name(&self) -> &'static str;
    fn available(&self, config: &Config) -> bool;
    fn collect(&self, config: &Config) -> Result<Fragment, String>;
}

/// The standard collector set, in capture order. There is no global
/// registry; callers wanting a different set build their own vector.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(processes::ProcessCollector),
        Box::new(network::NetworkCollector),
        Box::new(env_vars::EnvVarsCollector),
        Box::new(packages::PackagesCollector),
        Box::new(files::FilesCollector),
        Box::new(system::SystemCollector),
    ]
}
