//! # Flat Menu Source
//!
//! Adapter for platforms that hand out menus as ordered flat lists, each
//! record already carrying its ancestor chain and level.

use super::{FetchOptions, MenuDescriptor, MenuPlatform};
use crate::primitives::{ALL_LANGUAGES, MAX_MENU_NODES};
use crate::{MenuError, MenuId, NativeMenuNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const fn default_true() -> bool {
    true
}

fn all_languages() -> String {
    ALL_LANGUAGES.to_string()
}

/// One platform record: a node plus the platform's visibility rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(flatten)]
    pub node: NativeMenuNode,
    /// Required access level. `None` is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<u32>,
    /// Language tag, `*` for all languages.
    #[serde(default = "all_languages")]
    pub language: String,
    #[serde(default = "default_true")]
    pub published: bool,
}

impl FlatRecord {
    /// A public, published record for every language.
    #[must_use]
    pub fn public(node: NativeMenuNode) -> Self {
        Self {
            node,
            access: None,
            language: all_languages(),
            published: true,
        }
    }

    fn visible_to(&self, options: &FetchOptions) -> bool {
        if !self.published {
            return false;
        }
        if options.unfiltered {
            return true;
        }

        let access_ok = self
            .access
            .is_none_or(|level| options.access_levels.contains(&level));
        let language_ok = self.language == ALL_LANGUAGES
            || options
                .language
                .as_deref()
                .is_none_or(|language| language == self.language);

        access_ok && language_ok
    }
}

/// One menu of the flat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatMenu {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<FlatRecord>,
}

/// Serialized state of a flat platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatSnapshot {
    #[serde(default)]
    pub menus: BTreeMap<String, FlatMenu>,
    #[serde(default)]
    pub active: Option<MenuId>,
    #[serde(default)]
    pub default: Option<MenuId>,
}

/// In-memory flat platform.
#[derive(Debug, Clone, Default)]
pub struct FlatMenuSource {
    menus: BTreeMap<String, FlatMenu>,
    active: Option<MenuId>,
    default: Option<MenuId>,
}

impl FlatMenuSource {
    /// Create an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a menu, validating its records.
    ///
    /// Every ancestor must appear earlier in the same menu, otherwise the
    /// menu is rejected with [`MenuError::Configuration`]. Levels are taken
    /// from the ancestor chains.
    pub fn with_menu(
        mut self,
        name: impl Into<String>,
        mut menu: FlatMenu,
    ) -> Result<Self, MenuError> {
        let name = name.into();
        validate_menu(&name, &mut menu)?;
        self.menus.insert(name, menu);
        Ok(self)
    }

    #[must_use]
    pub fn with_active(mut self, id: MenuId) -> Self {
        self.active = Some(id);
        self
    }

    #[must_use]
    pub fn with_default(mut self, id: MenuId) -> Self {
        self.default = Some(id);
        self
    }

    /// Build from a decoded snapshot.
    pub fn from_snapshot(snapshot: FlatSnapshot) -> Result<Self, MenuError> {
        let mut source = Self {
            menus: BTreeMap::new(),
            active: snapshot.active,
            default: snapshot.default,
        };
        for (name, menu) in snapshot.menus {
            source = source.with_menu(name, menu)?;
        }
        Ok(source)
    }

    fn record(&self, id: MenuId) -> Option<&FlatRecord> {
        self.menus
            .values()
            .flat_map(|menu| menu.items.iter())
            .find(|record| record.node.id == id)
    }
}

fn validate_menu(name: &str, menu: &mut FlatMenu) -> Result<(), MenuError> {
    if menu.items.len() > MAX_MENU_NODES {
        return Err(MenuError::InvalidRequest(format!(
            "menu '{}' has {} items, maximum is {}",
            name,
            menu.items.len(),
            MAX_MENU_NODES
        )));
    }

    let mut seen = BTreeSet::new();
    for record in &mut menu.items {
        if let Some(missing) = record
            .node
            .ancestors
            .iter()
            .find(|ancestor| !seen.contains(*ancestor))
        {
            return Err(MenuError::Configuration { missing: *missing });
        }
        if !seen.insert(record.node.id) {
            return Err(MenuError::InvalidRequest(format!(
                "menu '{}' lists item {} twice",
                name, record.node.id
            )));
        }
        record.node.level = record.node.ancestors.len();
    }
    Ok(())
}

impl MenuPlatform for FlatMenuSource {
    fn fetch_nodes(
        &self,
        menu: &str,
        options: &FetchOptions,
    ) -> Result<Vec<NativeMenuNode>, MenuError> {
        let Some(menu) = self.menus.get(menu) else {
            return Ok(Vec::new());
        };
        Ok(menu
            .items
            .iter()
            .filter(|record| record.visible_to(options))
            .map(|record| record.node.clone())
            .collect())
    }

    fn node(&self, id: MenuId) -> Option<NativeMenuNode> {
        self.record(id).map(|record| record.node.clone())
    }

    fn active(&self) -> Option<NativeMenuNode> {
        self.active.and_then(|id| self.node(id))
    }

    fn default_node(&self) -> Option<NativeMenuNode> {
        self.default.and_then(|id| self.node(id))
    }

    fn menus(&self) -> Vec<MenuDescriptor> {
        self.menus
            .iter()
            .map(|(name, menu)| MenuDescriptor {
                name: name.clone(),
                title: menu.title.clone(),
                description: menu.description.clone(),
            })
            .collect()
    }

    fn menu_of(&self, id: MenuId) -> Option<String> {
        self.menus
            .iter()
            .find(|(_, menu)| menu.items.iter().any(|record| record.node.id == id))
            .map(|(name, _)| name.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
