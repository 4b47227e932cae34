use std::time::Duration;

use driftwatch::collect::Collector;
use driftwatch::config::Config;
use driftwatch::fragment::Fragment;
use driftwatch::platform;
use driftwatch::snapshot;
use driftwatch::store::{diff, Store};
use tempfile::TempDir;

/// Collector returning a fixed JSON fragment.
struct StaticCollector {
    name: &'static str,
    value: &'static str,
}

impl Collector for StaticCollector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn available(&self, _config: &Config) -> bool {
        true
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        serde_json::from_str(self.value).map_err(|e| e.to_string())
    }
}

struct FailingCollector;

impl Collector for FailingCollector {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn available(&self, _config: &Config) -> bool {
        true
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        Err("probe exploded".to_string())
    }
}

struct UnavailableCollector;

impl Collector for UnavailableCollector {
    fn name(&self) -> &'static str {
        "elsewhere"
    }

    fn available(&self, _config: &Config) -> bool {
        false
    }

    fn collect(&self, _config: &Config) -> Result<Fragment, String> {
        panic!("collect must not run when unavailable");
    }
}

fn test_config() -> Config {
    Config {
        storage: None,
        watch_dirs: Vec::new(),
        max_files: 1000,
        interval: Duration::from_secs(60),
        skip: Vec::new(),
        verbose: false,
        platform: platform::detect(),
    }
}

fn collectors(value: &'static str) -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(StaticCollector {
            name: "env_vars",
            value,
        }),
        Box::new(FailingCollector),
        Box::new(UnavailableCollector),
    ]
}

#[test]
fn capture_isolates_collector_failure() {
    let config = test_config();
    let record = snapshot::capture(&collectors(r#"{"VAR1": "value1"}"#), &config, None);

    // the healthy collector reported, the failing one became an in-band
    // error marker, the unavailable one is absent
    assert_eq!(
        record.categories["env_vars"],
        serde_json::from_str::<Fragment>(r#"{"VAR1": "value1"}"#).unwrap()
    );
    assert_eq!(
        record.categories["broken"],
        Fragment::error_marker("collection failed: probe exploded")
    );
    assert!(!record.categories.contains_key("elsewhere"));
}

#[test]
fn skipped_collectors_are_left_out() {
    let mut config = test_config();
    config.skip.push("env_vars".to_string());

    let record = snapshot::capture(&collectors("{}"), &config, None);
    assert!(!record.categories.contains_key("env_vars"));
    assert!(record.categories.contains_key("broken"));
}

#[test]
fn named_capture_uses_the_name_as_id() {
    let config = test_config();
    let record = snapshot::capture(&collectors("{}"), &config, Some("baseline"));
    assert_eq!(record.id, "baseline");
    assert_eq!(record.name, "baseline");
    assert!(record.timestamp > 0);
}

#[test]
fn capture_save_load_diff_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(Some(dir.path().join("e2e.db").as_path())).unwrap();
    let config = test_config();

    let before = snapshot::capture(
        &collectors(r#"{"VAR1": "value1"}"#),
        &config,
        Some("before"),
    );
    let after = snapshot::capture(
        &collectors(r#"{"VAR1": "value1", "VAR2": "value2"}"#),
        &config,
        Some("after"),
    );

    store.save(&before).unwrap();
    store.save(&after).unwrap();

    let before = store.get("before").unwrap().unwrap();
    let after = store.get("after").unwrap().unwrap();

    let changes = diff::diff_records(&before, &after);
    assert!(diff::has_changes(&changes));

    // only env_vars changed; the error marker is identical on both sides
    assert_eq!(changes.len(), 1);
    let env_diff = &changes["env_vars"];
    assert_eq!(env_diff.added.len(), 1);
    assert!(env_diff.removed.is_empty());
    assert!(env_diff.changed.is_empty());
}

#[test]
fn stored_error_markers_round_trip_and_diff_cleanly() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(Some(dir.path().join("markers.db").as_path())).unwrap();
    let config = test_config();

    let record = snapshot::capture(&collectors("{}"), &config, Some("marked"));
    store.save(&record).unwrap();

    let loaded = store.get("marked").unwrap().unwrap();
    assert_eq!(loaded.categories, record.categories);
    assert!(!diff::has_changes(&diff::diff_records(&record, &loaded)));
}

#[test]
fn identical_captures_compare_clean() {
    let config = test_config();
    let a = snapshot::capture(&collectors(r#"{"VAR1": "value1"}"#), &config, Some("a"));
    let b = snapshot::capture(&collectors(r#"{"VAR1": "value1"}"#), &config, Some("b"));

    assert!(!diff::has_changes(&diff::diff_records(&a, &b)));
}
