//! Snapshot records and capture orchestration.
//!
//! A capture invokes every collector in turn and assembles their fragments
//! into one immutable, timestamped record. A failing collector is recorded
//! as an in-band error marker for its category; it never aborts the others.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::collect::Collector;
use crate::config::Config;
use crate::fragment::Fragment;

/// Immutable capture of machine state at one point in time. Identity is the
/// id; uniqueness is enforced by the store, not the record.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub name: String,
    pub timestamp: i64,
    pub categories: BTreeMap<String, Fragment>,
}

/// Generate a snapshot id: a user-supplied name is used verbatim, otherwise
/// a timestamp-based id like `snapshot-20260806-142501`.
pub fn generate_id(name: Option<&str>) -> String {
    match name {
        Some(n) => n.to_string(),
        None => format!("snapshot-{}", chrono::Local::now().format("%Y%m%d-%H%M%S")),
    }
}

/// Capture a snapshot using an explicit collector set. Collectors that are
/// skipped or unavailable leave their category absent; collectors that fail
/// contribute an error-marker fragment instead.
pub fn capture(
    collectors: &[Box<dyn Collector>],
    config: &Config,
    name: Option<&str>,
) -> SnapshotRecord {
    let mut categories = BTreeMap::new();

    for collector in collectors {
        if config.is_skipped(collector.name()) {
            if config.verbose {
                eprintln!("{}: skipped (configured)", collector.name());
            }
            continue;
        }

        if !collector.available(config) {
            if config.verbose {
                eprintln!(
                    "{}: skipped (not available on this platform)",
                    collector.name()
                );
            }
            continue;
        }

        if config.verbose {
            eprintln!("collecting {}...", collector.name());
        }

        let fragment = match collector.collect(config) {
            Ok(fragment) => fragment,
            Err(message) => {
                if config.verbose {
                    eprintln!("{}: collection failed: {message}", collector.name());
                }
                Fragment::error_marker(&format!("collection failed: {message}"))
            }
        };

        categories.insert(collector.name().to_string(), fragment);
    }

    let id = generate_id(name);
    SnapshotRecord {
        name: id.clone(),
        id,
        timestamp: chrono::Utc::now().timestamp(),
        categories,
    }
}
