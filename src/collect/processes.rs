//! Running process collector.
//!
//! Shells out to `ps` and records pid, name, cpu and resident memory per
//! process. Sorted by memory descending and capped, so the cap keeps the
//! interesting entries.

use std::process::Command;

use crate::config::Config;
use crate::fragment::Fragment;

use super::Collector;

const MAX_PROCESSES: usize = 100;

pub struct ProcessCollector;

struct ProcessInfo {
    pid: i64,
    name: String,
    cpu: f64,
    mem_mb: f64,
}

impl Collector for ProcessCollector {
    fn name(&self) -> &'static str {
        "processes"
    }

    fn available(&self, _config: &Config) -> bool {
        true
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        let output = Command::new("ps")
            .args(["-eo", "pid=,pcpu=,rss=,comm="])
            .output()
            .map_err(|e| format!("failed to run ps: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("ps failed: {}", stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut processes: Vec<ProcessInfo> =
            stdout.lines().filter_map(parse_ps_line).collect();

        processes.sort_by(|a, b| {
            b.mem_mb
                .partial_cmp(&a.mem_mb)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        processes.truncate(MAX_PROCESSES);

        Ok(Fragment::Sequence(
            processes.into_iter().map(to_fragment).collect(),
        ))
    }
}

fn parse_ps_line(line: &str) -> Option<ProcessInfo> {
    let mut parts = line.split_whitespace();
    let pid = parts.next()?.parse().ok()?;
    let cpu = parts.next()?.parse().ok()?;
    let rss_kb: f64 = parts.next()?.parse().ok()?;
    // comm is last and may contain spaces
    let name = parts.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return None;
    }

    Some(ProcessInfo {
        pid,
        cpu,
        mem_mb: (rss_kb / 1024.0 * 10.0).round() / 10.0,
        name,
    })
}

fn to_fragment(process: ProcessInfo) -> Fragment {
    Fragment::mapping([
        ("pid", Fragment::from(process.pid)),
        ("name", Fragment::from(process.name)),
        ("cpu", Fragment::from(process.cpu)),
        ("mem_mb", Fragment::from(process.mem_mb)),
    ])
}
