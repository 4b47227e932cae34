//! Table rendering for snapshot listings and capture summaries.

use crate::fragment::Fragment;
use crate::snapshot::SnapshotRecord;
use crate::store::SnapshotMeta;
use crate::util::{format_timestamp, truncate};

pub fn render_list(snapshots: &[SnapshotMeta]) -> String {
    if snapshots.is_empty() {
        return String::from("No snapshots found. Run 'driftwatch snap' to create one.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<28} {:<28} {:<20}\n",
        "ID", "Name", "Created"
    ));
    output.push_str(&"-".repeat(76));
    output.push('\n');

    for snapshot in snapshots {
        output.push_str(&format!(
            "{:<28} {:<28} {:<20}\n",
            truncate(&snapshot.id, 28),
            truncate(&snapshot.name, 28),
            format_timestamp(snapshot.timestamp)
        ));
    }

    output
}

pub fn render_summary(record: &SnapshotRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "snapshot: {} ({})\n",
        record.id,
        format_timestamp(record.timestamp)
    ));

    for (category, fragment) in &record.categories {
        output.push_str(&format!(
            "  {:<12} {}\n",
            category,
            describe(fragment)
        ));
    }

    output
}

fn describe(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Mapping(map) => match map.get("error") {
            Some(Fragment::String(message)) => format!("error: {message}"),
            _ => format!("{} keys", map.len()),
        },
        Fragment::Sequence(items) => format!("{} items", items.len()),
        Fragment::String(value) => truncate(value, 40),
        other => serde_json::to_string(other).unwrap_or_else(|_| "?".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record_with(categories: &[(&str, &str)]) -> SnapshotRecord {
        SnapshotRecord {
            id: "snap-1".to_string(),
            name: "snap-1".to_string(),
            timestamp: 0,
            categories: categories
                .iter()
                .map(|(name, json)| {
                    (name.to_string(), serde_json::from_str(json).unwrap())
                })
                .collect(),
        }
    }

    #[test]
    fn empty_list_suggests_creating_a_snapshot() {
        assert!(render_list(&[]).contains("driftwatch snap"));
    }

    #[test]
    fn list_shows_one_row_per_snapshot() {
        let snapshots = vec![
            SnapshotMeta {
                id: "a".to_string(),
                name: "baseline".to_string(),
                timestamp: 0,
            },
            SnapshotMeta {
                id: "b".to_string(),
                name: "after-upgrade".to_string(),
                timestamp: 60,
            },
        ];

        let output = render_list(&snapshots);
        assert!(output.contains("baseline"));
        assert!(output.contains("after-upgrade"));
        assert!(output.contains("1970-01-01 00:00:00"));
    }

    #[test]
    fn summary_counts_keys_items_and_surfaces_errors() {
        let record = record_with(&[
            ("env_vars", r#"{"A": "1", "B": "2"}"#),
            ("processes", r#"[{"pid": 1}, {"pid": 2}, {"pid": 3}]"#),
            ("network", r#"{"error": "collection failed: boom"}"#),
        ]);

        let output = render_summary(&record);
        assert!(output.contains("env_vars"));
        assert!(output.contains("2 keys"));
        assert!(output.contains("3 items"));
        assert!(output.contains("error: collection failed: boom"));
    }

    #[test]
    fn summary_of_empty_record_is_just_the_header() {
        let record = SnapshotRecord {
            id: "empty".to_string(),
            name: "empty".to_string(),
            timestamp: 0,
            categories: BTreeMap::new(),
        };

        assert_eq!(render_summary(&record).lines().count(), 1);
    }
}
