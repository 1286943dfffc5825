//! # Platform Module
//!
//! Data access to the content platform that owns the native menus.
//!
//! ## The Contract
//!
//! A platform adapter only supplies data: node lists per menu, single node
//! lookup, the active and default nodes, the menu list and which menu
//! holds a node. The merge is
//! done once, by [`crate::MenuTreeBuilder`], for every adapter.
//!
//! ## Adapters
//!
//! - [`FlatMenuSource`] - ordered records already carrying ancestor chains
//! - [`LinkedMenuSource`] - records carrying only parent pointers
//!
//! Both decode from one JSON [`PlatformSnapshot`].

pub mod catalog;
pub mod flat;
pub mod linked;

pub use catalog::{GroupedOption, MenuCatalog, grouped_items};
pub use flat::{FlatMenu, FlatMenuSource, FlatRecord};
pub use linked::{LinkedMenu, LinkedMenuSource, LinkedRecord, RecordStatus};

use crate::request::RequestContext;
use crate::{MenuError, MenuId, NativeMenuNode};
use serde::{Deserialize, Serialize};

// =============================================================================
// FETCH OPTIONS
// =============================================================================

/// Filtering applied by the platform when fetching nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Skip access and language filtering (administrative view).
    #[serde(default)]
    pub unfiltered: bool,
    #[serde(default)]
    pub access_levels: Vec<u32>,
    #[serde(default)]
    pub language: Option<String>,
}

impl FetchOptions {
    /// The unfiltered view.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self {
            unfiltered: true,
            ..Self::default()
        }
    }

    /// Options matching a request: privileged callers see everything.
    #[must_use]
    pub fn for_context(ctx: &RequestContext) -> Self {
        Self {
            unfiltered: ctx.privileged,
            access_levels: ctx.access_levels.clone(),
            language: ctx.language.clone(),
        }
    }
}

/// A menu known to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDescriptor {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// PLATFORM TRAIT
// =============================================================================

/// Capability interface of a content platform.
pub trait MenuPlatform: Send + Sync {
    /// Ordered nodes of `menu`, parents before children.
    ///
    /// An unknown menu yields an empty list.
    fn fetch_nodes(
        &self,
        menu: &str,
        options: &FetchOptions,
    ) -> Result<Vec<NativeMenuNode>, MenuError>;

    /// Any node by id, across all menus.
    fn node(&self, id: MenuId) -> Option<NativeMenuNode>;

    /// The node of the displayed page.
    fn active(&self) -> Option<NativeMenuNode>;

    /// The configured default (home) node.
    fn default_node(&self) -> Option<NativeMenuNode>;

    /// Menus in a stable order.
    fn menus(&self) -> Vec<MenuDescriptor>;

    /// Name of the menu holding node `id`.
    fn menu_of(&self, id: MenuId) -> Option<String>;

    /// Menu holding the active node.
    fn active_menu(&self) -> Option<String> {
        self.active().and_then(|node| self.menu_of(node.id))
    }

    /// Menu holding the default node.
    fn default_menu(&self) -> Option<String> {
        self.default_node().and_then(|node| self.menu_of(node.id))
    }

    /// The menu a render targets: `requested` when named, otherwise the
    /// active menu, then the default one.
    fn resolve_menu(&self, requested: &str) -> Option<String> {
        let requested = requested.trim();
        if !requested.is_empty() {
            return Some(requested.to_string());
        }
        self.active_menu().or_else(|| self.default_menu())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Serialized platform state, tagged by adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformSnapshot {
    Flat(flat::FlatSnapshot),
    Linked(linked::LinkedSnapshot),
}

impl PlatformSnapshot {
    /// Decode a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, MenuError> {
        serde_json::from_str(json).map_err(|e| MenuError::SerializationError(e.to_string()))
    }

    /// Validate the snapshot and build its adapter.
    pub fn into_platform(self) -> Result<Box<dyn MenuPlatform>, MenuError> {
        Ok(match self {
            Self::Flat(snapshot) => Box::new(FlatMenuSource::from_snapshot(snapshot)?),
            Self::Linked(snapshot) => Box::new(LinkedMenuSource::from_snapshot(snapshot)?),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
