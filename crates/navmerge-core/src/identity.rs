//! # Identity Index
//!
//! Derived, read-only index from identity hint to stored entry.
//!
//! Built once per render from the caller's stored items. The caller's map is
//! never annotated or mutated; the saved path of each entry is carried by
//! the index instead.

use crate::{MenuId, StoredItem, StoredItems};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored entry found through its identity hint.
#[derive(Debug, Clone, Copy)]
pub struct IdentityMatch<'a> {
    /// Path the entry was saved under.
    pub path: &'a str,
    pub item: &'a StoredItem,
}

/// A second path claiming an identity hint that was already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConflict {
    pub id: MenuId,
    /// Path that keeps the hint.
    pub kept: String,
    /// Path whose claim was ignored.
    pub ignored: String,
}

/// `identity hint -> stored entry` lookup.
///
/// At most one entry may claim a hint. When several do, the first path in
/// key order keeps it and the others are reported as conflicts.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex<'a> {
    by_id: BTreeMap<MenuId, IdentityMatch<'a>>,
    conflicts: Vec<IdentityConflict>,
}

impl<'a> IdentityIndex<'a> {
    /// Index every stored entry that carries a numeric identity hint.
    #[must_use]
    pub fn build(stored: &'a StoredItems) -> Self {
        let mut index = Self::default();

        for (path, item) in stored.iter() {
            let Some(id) = item.id else {
                continue;
            };

            match index.by_id.get(&id) {
                Some(existing) => index.conflicts.push(IdentityConflict {
                    id,
                    kept: existing.path.to_string(),
                    ignored: path.clone(),
                }),
                None => {
                    index.by_id.insert(
                        id,
                        IdentityMatch {
                            path: path.as_str(),
                            item,
                        },
                    );
                }
            }
        }

        index
    }

    /// The stored entry claiming `id`, if any.
    #[must_use]
    pub fn get(&self, id: MenuId) -> Option<IdentityMatch<'a>> {
        self.by_id.get(&id).copied()
    }

    /// Claims that were ignored because the hint was already taken.
    #[must_use]
    pub fn conflicts(&self) -> &[IdentityConflict] {
        &self.conflicts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
