//! # Core Type Definitions
//!
//! This module contains all core types for the navmerge reconciliation engine:
//! - Menu identifiers (`MenuId`)
//! - Platform input (`NativeMenuNode`, `ItemType`, `BrowserNav`, `DisplayParams`)
//! - Persisted configuration (`StoredItem`, `StoredItems`)
//! - Output structures (`Item`)
//! - Error types (`MenuError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use `BTreeMap` for every keyed collection so iteration order is stable
//! - Implement `Ord` where they are used as keys
//! - Carry no interior mutability; the engine builds fresh values per call

use crate::primitives::{TARGET_BLANK, TARGET_SELF};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// MENU IDENTIFIERS
// =============================================================================

/// Identity of a menu node within one platform menu.
///
/// Stored configuration refers back to platform nodes through this id
/// (the "identity hint"), so it must be stable across renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuId(pub u64);

impl MenuId {
    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ITEM TYPE
// =============================================================================

/// Kind of a menu entry, decided by the platform and optionally overridden
/// by stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    /// Plain internal link to a platform page.
    Component,
    /// External or custom link, passed through as written.
    Url,
    /// Redirect to another menu node's identity.
    Alias,
    /// Visual separator without a target.
    Separator,
    /// Group heading without a target.
    Heading,
    /// Embedded widget entry without a target.
    Particle,
    /// Anything the engine does not recognise. Resolves like `Component`.
    Other(String),
}

impl ItemType {
    /// The wire name of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Component => "component",
            Self::Url => "url",
            Self::Alias => "alias",
            Self::Separator => "separator",
            Self::Heading => "heading",
            Self::Particle => "particle",
            Self::Other(name) => name,
        }
    }

    /// True for types that never carry a navigable target.
    #[must_use]
    pub fn is_linkless(&self) -> bool {
        matches!(self, Self::Separator | Self::Heading | Self::Particle)
    }
}

impl From<String> for ItemType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "component" | "link" => Self::Component,
            "url" | "custom" => Self::Url,
            "alias" => Self::Alias,
            "separator" => Self::Separator,
            "heading" => Self::Heading,
            "particle" => Self::Particle,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for ItemType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<ItemType> for String {
    fn from(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NAVIGATION TARGET
// =============================================================================

/// The platform's navigation-target field.
///
/// `0` opens in the parent window, `1` and `2` open a new window (with and
/// without browser navigation). Unknown values decode as `Parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum BrowserNav {
    #[default]
    Parent,
    NewWindow,
    Popup,
}

impl BrowserNav {
    /// The anchor target this field maps to.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Parent => TARGET_SELF,
            Self::NewWindow | Self::Popup => TARGET_BLANK,
        }
    }
}

impl From<u8> for BrowserNav {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::NewWindow,
            2 => Self::Popup,
            _ => Self::Parent,
        }
    }
}

impl From<BrowserNav> for u8 {
    fn from(nav: BrowserNav) -> Self {
        match nav {
            BrowserNav::Parent => 0,
            BrowserNav::NewWindow => 1,
            BrowserNav::Popup => 2,
        }
    }
}

// =============================================================================
// NATIVE MENU NODE
// =============================================================================

const fn default_true() -> bool {
    true
}

/// Display defaults supplied by the platform for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayParams {
    #[serde(default)]
    pub anchor_title: String,
    #[serde(default)]
    pub anchor_rel: String,
    #[serde(default)]
    pub anchor_css: String,
    #[serde(default)]
    pub image: String,
    /// Show the title next to the image. `false` means icon only.
    #[serde(default = "default_true")]
    pub show_text: bool,
    /// Whether the platform shows this node in menus at all.
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            anchor_title: String::new(),
            anchor_rel: String::new(),
            anchor_css: String::new(),
            image: String::new(),
            show_text: true,
            visible: true,
        }
    }
}

/// A navigation entry as produced by the content platform.
///
/// Read-only for the engine. Levels count from the root at `0`, and
/// `ancestors` lists ancestor ids from the root down to the parent, so
/// `ancestors.len() == level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeMenuNode {
    pub id: MenuId,
    #[serde(default)]
    pub ancestors: Vec<MenuId>,
    #[serde(default)]
    pub level: usize,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Hierarchical route, the fallback key into stored configuration.
    pub route: String,
    /// The node's own slug.
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
    /// Target of an alias node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<MenuId>,
    #[serde(default)]
    pub browser_nav: BrowserNav,
    /// Parsed query of the raw link.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub display: DisplayParams,
}

impl NativeMenuNode {
    /// Create a node with platform defaults for everything but identity.
    #[must_use]
    pub fn new(id: MenuId, item_type: ItemType, route: impl Into<String>) -> Self {
        Self {
            id,
            ancestors: Vec::new(),
            level: 0,
            item_type,
            route: route.into(),
            alias: String::new(),
            link: String::new(),
            title: String::new(),
            alias_target: None,
            browser_nav: BrowserNav::default(),
            query: BTreeMap::new(),
            display: DisplayParams::default(),
        }
    }

    /// Place the node under the given ancestor chain. The level follows the chain.
    #[must_use]
    pub fn with_ancestors(mut self, ancestors: Vec<MenuId>) -> Self {
        self.level = ancestors.len();
        self.ancestors = ancestors;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    #[must_use]
    pub fn with_alias_target(mut self, target: MenuId) -> Self {
        self.alias_target = Some(target);
        self
    }

    /// The trail from the root to this node, the node included.
    #[must_use]
    pub fn trail(&self) -> Vec<MenuId> {
        let mut trail = Vec::with_capacity(self.ancestors.len() + 1);
        trail.extend_from_slice(&self.ancestors);
        trail.push(self.id);
        trail
    }

    /// The direct parent, if this is not a root node.
    #[must_use]
    pub fn parent(&self) -> Option<MenuId> {
        self.ancestors.last().copied()
    }
}

// =============================================================================
// STORED CONFIGURATION
// =============================================================================

/// Read an identity hint. Numbers and numeric strings count; anything else
/// is treated as "no hint" rather than an error.
fn deserialize_identity_hint<'de, D>(deserializer: D) -> Result<Option<MenuId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| match value {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
        .map(MenuId))
}

/// A previously persisted configuration entry.
///
/// Every field except the identity hint overrides the platform's value when
/// the entry is matched to a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredItem {
    /// Identity hint: the node id this entry belonged to when last saved.
    #[serde(
        default,
        alias = "object_id",
        deserialize_with = "deserialize_identity_hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<MenuId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Layout options and anything else the editor saved.
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl StoredItem {
    /// Create an entry claiming the given node id.
    #[must_use]
    pub fn with_id(id: MenuId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    #[must_use]
    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }
}

/// Persisted configuration, keyed by hierarchical path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredItems(pub BTreeMap<String, StoredItem>);

impl StoredItems {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry at the given path, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<String>, item: StoredItem) {
        self.0.insert(path.into(), item);
    }

    /// Look up an entry by path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&StoredItem> {
        self.0.get(path)
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoredItem)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, StoredItem)> for StoredItems {
    fn from_iter<T: IntoIterator<Item = (String, StoredItem)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// ITEM (OUTPUT)
// =============================================================================

/// The merged output unit consumed by rendering.
///
/// Built once per node per render and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: MenuId,
    /// Path of the node in the current tree.
    pub path: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub alias: String,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<MenuId>,
    pub title: String,
    /// Merged raw link before resolution.
    pub link: String,
    pub link_title: String,
    pub rel: String,
    pub enabled: bool,
    pub anchor_class: String,
    pub image: String,
    pub icon_only: bool,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<MenuId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
    /// Resolved navigable link, `None` when the entry has no target.
    pub url: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in navmerge.
///
/// Absence of a match is never an error; only integrity violations that
/// would silently corrupt the output tree are surfaced.
#[derive(Debug, Error)]
pub enum MenuError {
    /// An ancestor reference points at a node missing from the working set.
    #[error("Menu item parent ({missing}) cannot be found")]
    Configuration { missing: MenuId },

    /// Parent pointers loop back on themselves.
    #[error("Menu item ({id}) is part of a parent cycle")]
    Cycle { id: MenuId },

    /// Request parameters are out of range or inconsistent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
