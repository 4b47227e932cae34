//! System resource collector.
//!
//! Reads /proc for cpu and memory figures and asks `df` for disk usage.
//! Linux-only; other platforms simply omit the category.

use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::fragment::Fragment;
use crate::platform::Platform;

use super::Collector;

const CPU_SAMPLE_GAP: Duration = Duration::from_millis(200);

pub struct SystemCollector;

impl Collector for SystemCollector {
    fn name(&self) -> &'static str {
        "system"
    }

    fn available(&self, config: &Config) -> bool {
        config.platform == Platform::Linux
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        let cpu_percent = cpu_percent()?;
        let memory = read_meminfo()?;
        let disk = read_disk_usage()?;
        let boot_time = read_boot_time()?;

        let cpu_count = thread::available_parallelism()
            .map(|n| n.get() as i64)
            .unwrap_or(1);

        Ok(Fragment::mapping([
            ("cpu_percent", Fragment::from(round1(cpu_percent))),
            ("mem_percent", Fragment::from(round1(memory.used_percent))),
            ("disk_percent", Fragment::from(round1(disk.used_percent))),
            ("cpu_count", Fragment::from(cpu_count)),
            ("boot_time", Fragment::from(boot_time)),
            ("total_memory_gb", Fragment::from(round2(memory.total_gb))),
            (
                "available_memory_gb",
                Fragment::from(round2(memory.available_gb)),
            ),
            ("total_disk_gb", Fragment::from(round2(disk.total_gb))),
            (
                "available_disk_gb",
                Fragment::from(round2(disk.available_gb)),
            ),
        ]))
    }
}

struct MemoryUsage {
    used_percent: f64,
    total_gb: f64,
    available_gb: f64,
}

struct DiskUsage {
    used_percent: f64,
    total_gb: f64,
    available_gb: f64,
}

/// Aggregate cpu busy time across two /proc/stat samples.
fn cpu_percent() -> Result<f64, String> {
    let (busy_a, total_a) = read_cpu_times()?;
    thread::sleep(CPU_SAMPLE_GAP);
    let (busy_b, total_b) = read_cpu_times()?;

    let total = total_b.saturating_sub(total_a);
    if total == 0 {
        return Ok(0.0);
    }

    Ok(busy_b.saturating_sub(busy_a) as f64 / total as f64 * 100.0)
}

fn read_cpu_times() -> Result<(u64, u64), String> {
    let stat = std::fs::read_to_string("/proc/stat")
        .map_err(|e| format!("failed to read /proc/stat: {e}"))?;

    let line = stat
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or("no aggregate cpu line in /proc/stat")?;

    // cpu user nice system idle iowait irq softirq steal ...
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|f| f.parse().ok())
        .collect();
    if fields.len() < 4 {
        return Err("short cpu line in /proc/stat".to_string());
    }

    let total: u64 = fields.iter().sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Ok((total.saturating_sub(idle), total))
}

fn read_meminfo() -> Result<MemoryUsage, String> {
    let meminfo = std::fs::read_to_string("/proc/meminfo")
        .map_err(|e| format!("failed to read /proc/meminfo: {e}"))?;

    let total_kb = meminfo_field(&meminfo, "MemTotal:")?;
    let available_kb = meminfo_field(&meminfo, "MemAvailable:")?;
    if total_kb == 0 {
        return Err("MemTotal is zero".to_string());
    }

    Ok(MemoryUsage {
        used_percent: (1.0 - available_kb as f64 / total_kb as f64) * 100.0,
        total_gb: total_kb as f64 / (1024.0 * 1024.0),
        available_gb: available_kb as f64 / (1024.0 * 1024.0),
    })
}

fn meminfo_field(meminfo: &str, field: &str) -> Result<u64, String> {
    meminfo
        .lines()
        .find(|l| l.starts_with(field))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("missing {field} in /proc/meminfo"))
}

fn read_boot_time() -> Result<i64, String> {
    let stat = std::fs::read_to_string("/proc/stat")
        .map_err(|e| format!("failed to read /proc/stat: {e}"))?;

    stat.lines()
        .find(|l| l.starts_with("btime "))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| "missing btime in /proc/stat".to_string())
}

fn read_disk_usage() -> Result<DiskUsage, String> {
    let output = Command::new("df")
        .args(["-Pk", "/"])
        .output()
        .map_err(|e| format!("failed to run df: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("df failed: {}", stderr.trim()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_df_output(&stdout).ok_or_else(|| "unexpected df output".to_string())
}

fn parse_df_output(stdout: &str) -> Option<DiskUsage> {
    // Filesystem 1024-blocks Used Available Capacity Mounted-on
    let line = stdout.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return None;
    }

    let total_kb: f64 = fields[1].parse().ok()?;
    let used_kb: f64 = fields[2].parse().ok()?;
    let available_kb: f64 = fields[3].parse().ok()?;
    if total_kb == 0.0 {
        return None;
    }

    Some(DiskUsage {
        used_percent: used_kb / total_kb * 100.0,
        total_gb: total_kb / (1024.0 * 1024.0),
        available_gb: available_kb / (1024.0 * 1024.0),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn df_output_parses_into_percentages() {
        let stdout = "Filesystem 1024-blocks Used Available Capacity Mounted on\n\
                      /dev/sda1 102400 51200 51200 50% /\n";
        let disk = parse_df_output(stdout).unwrap();
        assert_eq!(disk.used_percent, 50.0);
        assert!((disk.total_gb - 0.0977).abs() < 0.001);
    }

    #[test]
    fn garbage_df_output_is_rejected() {
        assert!(parse_df_output("").is_none());
        assert!(parse_df_output("header only\n").is_none());
    }

    #[test]
    fn meminfo_field_extracts_kilobytes() {
        let meminfo = "MemTotal: 16384256 kB\nMemAvailable: 8192128 kB\n";
        assert_eq!(meminfo_field(meminfo, "MemTotal:").unwrap(), 16384256);
        assert_eq!(meminfo_field(meminfo, "MemAvailable:").unwrap(), 8192128);
        assert!(meminfo_field(meminfo, "SwapTotal:").is_err());
    }

    #[test]
    fn rounding_helpers_keep_one_and_two_decimals() {
        assert_eq!(round1(10.04), 10.0);
        assert_eq!(round1(10.06), 10.1);
        assert_eq!(round2(1.006), 1.01);
    }
}
