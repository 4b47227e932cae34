//! Network socket collector.
//!
//! Parses `ss -tuna` output into per-socket mappings. Sorted by local
//! address then state, capped to keep snapshots bounded.

use std::process::Command;

use crate::config::Config;
use crate::fragment::Fragment;
use crate::platform::Platform;

use super::Collector;

const MAX_CONNECTIONS: usize = 200;

pub struct NetworkCollector;

struct SocketInfo {
    proto: String,
    local: String,
    remote: String,
    status: String,
}

impl Collector for NetworkCollector {
    fn name(&self) -> &'static str {
        "network"
    }

    fn available(&self, config: &Config) -> bool {
        // ss ships with iproute2
        config.platform == Platform::Linux
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        let output = Command::new("ss")
            .arg("-tuna")
            .output()
            .map_err(|e| format!("failed to run ss: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("ss failed: {}", stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut sockets: Vec<SocketInfo> = stdout
            .lines()
            .skip(1) // column header
            .filter_map(parse_ss_line)
            .collect();

        sockets.sort_by(|a, b| (&a.local, &a.status).cmp(&(&b.local, &b.status)));
        sockets.truncate(MAX_CONNECTIONS);

        Ok(Fragment::Sequence(
            sockets.into_iter().map(to_fragment).collect(),
        ))
    }
}

fn parse_ss_line(line: &str) -> Option<SocketInfo> {
    // Netid State Recv-Q Send-Q Local-Address:Port Peer-Address:Port
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return None;
    }

    Some(SocketInfo {
        proto: fields[0].to_string(),
        status: fields[1].to_string(),
        local: fields[4].to_string(),
        remote: fields[5].to_string(),
    })
}

fn to_fragment(socket: SocketInfo) -> Fragment {
    Fragment::mapping([
        ("proto", Fragment::from(socket.proto)),
        ("local", Fragment::from(socket.local)),
        ("remote", Fragment::from(socket.remote)),
        ("status", Fragment::from(socket.status)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ss_line_parses_into_fields() {
        let socket =
            parse_ss_line("tcp   LISTEN  0  128  0.0.0.0:22  0.0.0.0:*").unwrap();
        assert_eq!(socket.proto, "tcp");
        assert_eq!(socket.status, "LISTEN");
        assert_eq!(socket.local, "0.0.0.0:22");
        assert_eq!(socket.remote, "0.0.0.0:*");
    }

    #[test]
    fn short_lines_are_skipped() {
        assert!(parse_ss_line("").is_none());
        assert!(parse_ss_line("tcp LISTEN 0").is_none());
    }
}
