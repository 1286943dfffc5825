//! # Path Map
//!
//! Rename records produced when a stored entry, matched by identity, was
//! saved under a path that no longer matches the node's position.
//!
//! The engine only collects renames. Applying them to persisted
//! configuration is the caller's job; `to_nested` and `apply` build new
//! values and never touch the caller's data.

use crate::primitives::{CHILDREN_SEGMENT, PATH_KEY, PATH_SEPARATOR};
use crate::{MenuId, StoredItems, types::StoredItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One rename: the entry saved at `old_path` now lives at `new_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRename {
    pub old_path: String,
    pub new_path: String,
}

/// Ordered set of renames, keyed by the old path expressed as a nested
/// configuration key (see [`PathMap::nested_key`]).
///
/// Serializes as `nested key -> new path`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "BTreeMap<String, String>")]
pub struct PathMap {
    renames: BTreeMap<String, PathRename>,
}

impl From<PathMap> for BTreeMap<String, String> {
    fn from(map: PathMap) -> Self {
        map.renames
            .into_iter()
            .map(|(key, rename)| (key, rename.new_path))
            .collect()
    }
}

impl PathMap {
    /// Create an empty path map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the entry saved at `old_path` now lives at `new_path`.
    pub fn record(&mut self, old_path: impl Into<String>, new_path: impl Into<String>) {
        let old_path = old_path.into();
        self.renames.insert(
            Self::nested_key(&old_path),
            PathRename {
                old_path,
                new_path: new_path.into(),
            },
        );
    }

    /// New path recorded under a nested key such as `about/children/team/path`.
    #[must_use]
    pub fn get(&self, nested_key: &str) -> Option<&str> {
        self.renames
            .get(nested_key)
            .map(|rename| rename.new_path.as_str())
    }

    /// `(nested key, new path)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renames
            .iter()
            .map(|(key, rename)| (key.as_str(), rename.new_path.as_str()))
    }

    /// The raw renames in key order.
    pub fn renames(&self) -> impl Iterator<Item = &PathRename> {
        self.renames.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.renames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Key of a rename in a nested configuration tree.
    ///
    /// Each separator between segments becomes a `children` connector and a
    /// terminal `path` key is appended: `about/team` becomes
    /// `about/children/team/path`. A leading separator is kept as is, so
    /// `/old-slug` becomes `/old-slug/path`.
    #[must_use]
    pub fn nested_key(old_path: &str) -> String {
        let rooted = old_path.starts_with(PATH_SEPARATOR);
        let connector = format!("{PATH_SEPARATOR}{CHILDREN_SEGMENT}{PATH_SEPARATOR}");
        let body = old_path
            .split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(&connector);

        let mut key = String::with_capacity(old_path.len() + PATH_KEY.len() + 2);
        if rooted {
            key.push(PATH_SEPARATOR);
        }
        key.push_str(&body);
        if !body.is_empty() {
            key.push(PATH_SEPARATOR);
        }
        key.push_str(PATH_KEY);
        key
    }

    /// Render the renames as a nested JSON object, ready to be merged into a
    /// nested configuration tree.
    #[must_use]
    pub fn to_nested(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();

        for (key, rename) in &self.renames {
            let segments: Vec<&str> = key
                .split(PATH_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .collect();
            insert_nested(&mut root, &segments, rename.new_path.clone());
        }

        serde_json::Value::Object(root)
    }

    /// Build a copy of `stored` with every renamed entry moved to its new
    /// path.
    ///
    /// A positional entry (no identity hint) already saved at the new path
    /// is replaced by the renamed one. An entry there that carries its own
    /// hint for another node stays put, the rename is skipped, and the pair
    /// is reported as a collision.
    #[must_use]
    pub fn apply(&self, stored: &StoredItems) -> AppliedRenames {
        let mut targets: BTreeMap<&str, &PathRename> = BTreeMap::new();
        let mut collisions = Vec::new();

        for rename in self.renames.values() {
            let mover = stored.get(&rename.old_path).and_then(|item| item.id);
            let occupant = stored
                .get(&rename.new_path)
                .and_then(|item| item.id)
                .filter(|id| Some(*id) != mover);
            let vacated = self
                .renames
                .values()
                .any(|other| other.old_path == rename.new_path);

            match occupant {
                Some(occupant) if !vacated => collisions.push(RenameCollision {
                    rename: rename.clone(),
                    occupant,
                }),
                _ => {
                    targets.insert(rename.old_path.as_str(), rename);
                }
            }
        }

        let mut moved: BTreeMap<String, StoredItem> = BTreeMap::new();
        let mut kept: BTreeMap<String, StoredItem> = BTreeMap::new();

        for (path, item) in stored.iter() {
            match targets.get(path.as_str()) {
                Some(rename) => {
                    moved.insert(rename.new_path.clone(), item.clone());
                }
                None => {
                    kept.insert(path.clone(), item.clone());
                }
            }
        }

        kept.extend(moved);
        AppliedRenames {
            stored: StoredItems(kept),
            collisions,
        }
    }
}

/// A rename left unapplied because its new path holds another node's entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameCollision {
    pub rename: PathRename,
    /// Identity hint of the entry that kept the path.
    pub occupant: MenuId,
}

/// Result of [`PathMap::apply`].
#[derive(Debug, Clone, Default)]
pub struct AppliedRenames {
    pub stored: StoredItems,
    pub collisions: Vec<RenameCollision>,
}

fn insert_nested(
    node: &mut serde_json::Map<String, serde_json::Value>,
    segments: &[&str],
    value: String,
) {
    match segments {
        [] => {}
        [leaf] => {
            node.insert((*leaf).to_string(), serde_json::Value::String(value));
        }
        [head, rest @ ..] => {
            let child = node
                .entry((*head).to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            if !child.is_object() {
                *child = serde_json::Value::Object(serde_json::Map::new());
            }
            if let serde_json::Value::Object(map) = child {
                insert_nested(map, rest, value);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
