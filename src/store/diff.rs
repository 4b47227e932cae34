//! Snapshot comparison engine.
//!
//! Compares two snapshot records (or any two fragments) and reports changes
//! grouped per category:
//! - added / removed: keys present on only one side
//! - changed: scalar values that differ at matching keys
//! - type_changed: structural kind differs at matching keys
//! - items_added / items_removed: multiset differences between sequences
//!
//! All mapping iteration is ordered, so the same pair of inputs always
//! yields the same output.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::fragment::Fragment;
use crate::snapshot::SnapshotRecord;

/// Location of a change inside a category fragment: an ordered list of
/// mapping keys from the category root down. Sequence comparison is
/// positionless, so no index segments ever appear.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChange {
    pub old: Fragment,
    pub new: Fragment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeChange {
    pub old_type: &'static str,
    pub new_type: &'static str,
    pub old_value: Fragment,
    pub new_value: Fragment,
}

/// A whole sequence element that appeared or disappeared, tagged with the
/// path of the sequence it belongs to (empty at the category root).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceChange {
    #[serde(skip_serializing_if = "KeyPath::is_root")]
    pub path: KeyPath,
    pub value: Fragment,
}

/// The per-category portion of a change set. Every member is empty when no
/// changes of that kind were detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryDiff {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub added: BTreeMap<KeyPath, Fragment>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub removed: BTreeMap<KeyPath, Fragment>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub changed: BTreeMap<KeyPath, ValueChange>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub type_changed: BTreeMap<KeyPath, TypeChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items_added: Vec<SequenceChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items_removed: Vec<SequenceChange>,
}

impl CategoryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.type_changed.is_empty()
            && self.items_added.is_empty()
            && self.items_removed.is_empty()
    }
}

/// Categorized result of diffing two records. Categories with no detected
/// change are omitted entirely.
pub type ChangeSet = BTreeMap<String, CategoryDiff>;

pub fn diff_records(old: &SnapshotRecord, new: &SnapshotRecord) -> ChangeSet {
    diff_categories(&old.categories, &new.categories)
}

pub fn diff_categories(
    old: &BTreeMap<String, Fragment>,
    new: &BTreeMap<String, Fragment>,
) -> ChangeSet {
    let mut changes = ChangeSet::new();

    let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for name in names {
        let left = old.get(name.as_str());
        let right = new.get(name.as_str());

        // a category absent on one side is compared against an empty value
        // of the present side's structural kind, so it surfaces as wholesale
        // added/removed keys or items rather than a category-level flag
        let filler;
        let (left, right) = match (left, right) {
            (Some(l), Some(r)) => (l, r),
            (Some(l), None) => {
                filler = l.empty_like();
                (l, &filler)
            }
            (None, Some(r)) => {
                filler = r.empty_like();
                (&filler, r)
            }
            (None, None) => continue,
        };

        let diff = diff_fragments(left, right);
        if !diff.is_empty() {
            changes.insert(name.to_string(), diff);
        }
    }

    changes
}

pub fn diff_fragments(old: &Fragment, new: &Fragment) -> CategoryDiff {
    let mut diff = CategoryDiff::default();
    diff_at(&KeyPath::root(), old, new, &mut diff);
    diff
}

/// True iff at least one category has at least one non-empty member.
pub fn has_changes(changes: &ChangeSet) -> bool {
    changes.values().any(|diff| !diff.is_empty())
}

fn diff_at(path: &KeyPath, old: &Fragment, new: &Fragment, out: &mut CategoryDiff) {
    // numbers share one kind, so an int/float representation flip is never a
    // type change; every other kind mismatch is
    if !old.same_kind(new) {
        out.type_changed.insert(
            path.clone(),
            TypeChange {
                old_type: old.kind(),
                new_type: new.kind(),
                old_value: old.clone(),
                new_value: new.clone(),
            },
        );
        return;
    }

    match (old, new) {
        (Fragment::Mapping(old_map), Fragment::Mapping(new_map)) => {
            let keys: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();
            for key in keys {
                let child = path.child(key);
                match (old_map.get(key.as_str()), new_map.get(key.as_str())) {
                    (None, Some(value)) => {
                        out.added.insert(child, value.clone());
                    }
                    (Some(value), None) => {
                        out.removed.insert(child, value.clone());
                    }
                    (Some(old_value), Some(new_value)) => {
                        diff_at(&child, old_value, new_value, out);
                    }
                    (None, None) => {}
                }
            }
        }
        (Fragment::Sequence(old_items), Fragment::Sequence(new_items)) => {
            diff_sequences(path, old_items, new_items, out);
        }
        _ => {
            if old != new {
                out.changed.insert(
                    path.clone(),
                    ValueChange {
                        old: old.clone(),
                        new: new.clone(),
                    },
                );
            }
        }
    }
}

/// Order-insensitive multiset comparison of whole elements. There is no
/// stable per-item key (pids get reused, paths move), so a modified element
/// is reported as one removed item plus one added item.
fn diff_sequences(path: &KeyPath, old: &[Fragment], new: &[Fragment], out: &mut CategoryDiff) {
    let mut matched = vec![false; old.len()];

    for item in new {
        let mut found = None;
        for (i, candidate) in old.iter().enumerate() {
            if !matched[i] && candidate == item {
                found = Some(i);
                break;
            }
        }
        match found {
            Some(i) => matched[i] = true,
            None => out.items_added.push(SequenceChange {
                path: path.clone(),
                value: item.clone(),
            }),
        }
    }

    for (i, item) in old.iter().enumerate() {
        if !matched[i] {
            out.items_removed.push(SequenceChange {
                path: path.clone(),
                value: item.clone(),
            });
        }
    }
}
