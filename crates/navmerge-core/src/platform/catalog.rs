//! # Menu Catalog
//!
//! Caller-owned memo of the platform's menu list, and the grouped option
//! lists configuration editors pick items from.
//!
//! The memo is never shared implicitly. Whoever replaces the platform
//! snapshot must call [`MenuCatalog::invalidate`].

use super::{FetchOptions, MenuDescriptor, MenuPlatform};
use crate::{MenuError, MenuId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lazily loaded menu list.
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    menus: Option<Vec<MenuDescriptor>>,
}

impl MenuCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform's menus, loaded on first use.
    pub fn menus<P: MenuPlatform + ?Sized>(&mut self, platform: &P) -> &[MenuDescriptor] {
        self.menus.get_or_insert_with(|| platform.menus())
    }

    /// Forget the memo. The next call to [`MenuCatalog::menus`] reloads.
    pub fn invalidate(&mut self) {
        self.menus = None;
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.menus.is_some()
    }
}

/// One selectable item of a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedOption {
    pub id: MenuId,
    /// Nesting depth, the node level.
    pub depth: usize,
    pub label: String,
}

/// Every menu's items as flat option lists, keyed by menu name.
///
/// Reads the unfiltered view so editors see restricted items too.
pub fn grouped_items<P: MenuPlatform + ?Sized>(
    platform: &P,
    catalog: &mut MenuCatalog,
) -> Result<BTreeMap<String, Vec<GroupedOption>>, MenuError> {
    let options = FetchOptions::unfiltered();
    let mut groups = BTreeMap::new();

    for menu in catalog.menus(platform) {
        let items = platform
            .fetch_nodes(&menu.name, &options)?
            .into_iter()
            .map(|node| GroupedOption {
                id: node.id,
                depth: node.level,
                label: node.title,
            })
            .collect();
        groups.insert(menu.name.clone(), items);
    }

    Ok(groups)
}

// =============================================================================
// TESTS
// =============================================================================
