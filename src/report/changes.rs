//! Text rendering for change sets.
//!
//! One block per category with +/-/~ markers, in the style of line-oriented
//! diff tools.

use crate::fragment::Fragment;
use crate::store::diff::{CategoryDiff, ChangeSet, KeyPath, SequenceChange};
use crate::util::truncate;

const ITEM_WIDTH: usize = 100;

pub fn render(changes: &ChangeSet, from: &str, to: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Comparing {from} -> {to}\n"));

    if changes.is_empty() {
        output.push_str("No differences found.\n");
        return output;
    }

    for (category, diff) in changes {
        output.push('\n');
        output.push_str(&format!("{category}:\n"));
        render_category(diff, &mut output);
    }

    output
}

fn render_category(diff: &CategoryDiff, output: &mut String) {
    for (path, value) in &diff.added {
        output.push_str(&format!("  + {path}: {}\n", format_value(value)));
    }

    for (path, value) in &diff.removed {
        output.push_str(&format!("  - {path}: {}\n", format_value(value)));
    }

    for (path, change) in &diff.changed {
        output.push_str(&format!(
            "  ~ {}: {} -> {}\n",
            display_path(path),
            format_value(&change.old),
            format_value(&change.new)
        ));
    }

    for (path, change) in &diff.type_changed {
        output.push_str(&format!(
            "  ~ {}: {} {} -> {} {}\n",
            display_path(path),
            change.old_type,
            format_value(&change.old_value),
            change.new_type,
            format_value(&change.new_value)
        ));
    }

    for item in &diff.items_added {
        output.push_str(&format!("  + {}\n", format_item(item)));
    }

    for item in &diff.items_removed {
        output.push_str(&format!("  - {}\n", format_item(item)));
    }
}

fn display_path(path: &KeyPath) -> String {
    if path.is_root() {
        "(category)".to_string()
    } else {
        path.to_string()
    }
}

fn format_item(item: &SequenceChange) -> String {
    if item.path.is_root() {
        format_value(&item.value)
    } else {
        format!("{}: {}", item.path, format_value(&item.value))
    }
}

fn format_value(fragment: &Fragment) -> String {
    let rendered = match fragment {
        Fragment::String(value) => value.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| "?".to_string()),
    };
    truncate(&rendered, ITEM_WIDTH)
}
